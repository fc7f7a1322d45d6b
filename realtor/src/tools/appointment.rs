//! Viewing appointments: an in-memory calendar and the five tools the appointment agent uses.
//!
//! `get_availability` and `list_appointments` only read; `book_appointment`,
//! `cancel_appointment` and `reschedule_appointment` change the calendar and are declared
//! sensitive in their YAML.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::tools::{str_arg, Tool, ToolCatalog, ToolDefinition, ToolError, ToolRegistry, ToolSafety, ToolSpec};

pub const TOOL_GET_AVAILABILITY: &str = "get_availability";
pub const TOOL_LIST_APPOINTMENTS: &str = "list_appointments";
pub const TOOL_BOOK_APPOINTMENT: &str = "book_appointment";
pub const TOOL_CANCEL_APPOINTMENT: &str = "cancel_appointment";
pub const TOOL_RESCHEDULE_APPOINTMENT: &str = "reschedule_appointment";

/// Bookable slot start times, every day.
pub const SLOTS: [&str; 4] = ["09:00", "11:00", "14:00", "16:00"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    pub id: String,
    pub listing_id: String,
    pub date: NaiveDate,
    pub time: String,
}

impl std::fmt::Display for Appointment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} on {} at {}", self.id, self.listing_id, self.date, self.time)
    }
}

#[derive(Default)]
struct Calendar {
    next_id: u64,
    by_id: BTreeMap<String, Appointment>,
}

impl Calendar {
    fn taken(&self, date: NaiveDate, time: &str, except: Option<&str>) -> bool {
        self.by_id
            .values()
            .any(|a| a.date == date && a.time == time && Some(a.id.as_str()) != except)
    }
}

/// One calendar of viewings shared by every conversation of the process.
#[derive(Default)]
pub struct AppointmentBook {
    inner: Mutex<Calendar>,
}

fn parse_date(s: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ToolError::InvalidInput(format!("date `{}` is not YYYY-MM-DD", s)))
}

fn check_slot(time: &str) -> Result<(), ToolError> {
    if SLOTS.iter().any(|s| *s == time) {
        Ok(())
    } else {
        Err(ToolError::InvalidInput(format!(
            "time `{}` is not a slot (slots: {})",
            time,
            SLOTS.join(", ")
        )))
    }
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Calendar> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Free slots on `date`, in day order.
    pub fn availability(&self, date: NaiveDate) -> Vec<&'static str> {
        let cal = self.lock();
        SLOTS
            .iter()
            .copied()
            .filter(|t| !cal.taken(date, t, None))
            .collect()
    }

    /// All appointments, ordered by date, time, then id.
    pub fn list(&self) -> Vec<Appointment> {
        let mut all: Vec<Appointment> = self.lock().by_id.values().cloned().collect();
        all.sort_by(|a, b| (a.date, &a.time, &a.id).cmp(&(b.date, &b.time, &b.id)));
        all
    }

    pub fn book(&self, listing_id: &str, date: NaiveDate, time: &str) -> Result<Appointment, ToolError> {
        check_slot(time)?;
        let mut cal = self.lock();
        if cal.taken(date, time, None) {
            return Err(ToolError::Execution(format!("{} at {} is already booked", date, time)));
        }
        cal.next_id += 1;
        let appointment = Appointment {
            id: format!("apt-{}", cal.next_id),
            listing_id: listing_id.to_string(),
            date,
            time: time.to_string(),
        };
        cal.by_id.insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    pub fn cancel(&self, id: &str) -> Result<Appointment, ToolError> {
        self.lock()
            .by_id
            .remove(id)
            .ok_or_else(|| ToolError::Execution(format!("no appointment with id {}", id)))
    }

    pub fn reschedule(&self, id: &str, date: NaiveDate, time: &str) -> Result<Appointment, ToolError> {
        check_slot(time)?;
        let mut cal = self.lock();
        if !cal.by_id.contains_key(id) {
            return Err(ToolError::Execution(format!("no appointment with id {}", id)));
        }
        if cal.taken(date, time, Some(id)) {
            return Err(ToolError::Execution(format!("{} at {} is already booked", date, time)));
        }
        let appointment = cal
            .by_id
            .get_mut(id)
            .ok_or_else(|| ToolError::Execution(format!("no appointment with id {}", id)))?;
        appointment.date = date;
        appointment.time = time.to_string();
        Ok(appointment.clone())
    }
}

macro_rules! tool_meta {
    ($name:expr) => {
        fn name(&self) -> &str {
            $name
        }

        fn spec(&self) -> ToolSpec {
            self.def.spec.clone()
        }

        fn safety(&self) -> ToolSafety {
            self.def.safety
        }
    };
}

macro_rules! appointment_tool {
    ($(#[$doc:meta])* $ty:ident, $name:expr) => {
        $(#[$doc])*
        pub struct $ty {
            def: ToolDefinition,
            book: Arc<AppointmentBook>,
        }

        impl $ty {
            pub fn new(catalog: &ToolCatalog, book: Arc<AppointmentBook>) -> Result<Self, ToolError> {
                Ok(Self {
                    def: catalog.definition($name)?,
                    book,
                })
            }
        }
    };
}

appointment_tool!(
    /// Free slots on a date.
    GetAvailabilityTool,
    TOOL_GET_AVAILABILITY
);
appointment_tool!(ListAppointmentsTool, TOOL_LIST_APPOINTMENTS);
appointment_tool!(BookAppointmentTool, TOOL_BOOK_APPOINTMENT);
appointment_tool!(CancelAppointmentTool, TOOL_CANCEL_APPOINTMENT);
appointment_tool!(
    /// Moves an existing appointment; the old slot is released.
    RescheduleAppointmentTool,
    TOOL_RESCHEDULE_APPOINTMENT
);

#[async_trait]
impl Tool for GetAvailabilityTool {
    tool_meta!(TOOL_GET_AVAILABILITY);

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let date = parse_date(str_arg(&args, "date")?)?;
        let free = self.book.availability(date);
        Ok(if free.is_empty() {
            format!("No free slots on {}.", date)
        } else {
            format!("Free slots on {}: {}", date, free.join(", "))
        })
    }
}

#[async_trait]
impl Tool for ListAppointmentsTool {
    tool_meta!(TOOL_LIST_APPOINTMENTS);

    async fn call(&self, _args: Value) -> Result<String, ToolError> {
        let all = self.book.list();
        if all.is_empty() {
            return Ok("No appointments booked.".to_string());
        }
        Ok(all.iter().map(|a| a.to_string()).collect::<Vec<_>>().join("\n"))
    }
}

#[async_trait]
impl Tool for BookAppointmentTool {
    tool_meta!(TOOL_BOOK_APPOINTMENT);

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let listing_id = str_arg(&args, "listing_id")?;
        let date = parse_date(str_arg(&args, "date")?)?;
        let a = self.book.book(listing_id, date, str_arg(&args, "time")?)?;
        tracing::info!(appointment = %a, "appointment booked");
        Ok(format!("Booked {}", a))
    }
}

#[async_trait]
impl Tool for CancelAppointmentTool {
    tool_meta!(TOOL_CANCEL_APPOINTMENT);

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let a = self.book.cancel(str_arg(&args, "appointment_id")?)?;
        tracing::info!(appointment = %a, "appointment cancelled");
        Ok(format!("Cancelled {}", a))
    }
}

#[async_trait]
impl Tool for RescheduleAppointmentTool {
    tool_meta!(TOOL_RESCHEDULE_APPOINTMENT);

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let id = str_arg(&args, "appointment_id")?;
        let date = parse_date(str_arg(&args, "date")?)?;
        let a = self.book.reschedule(id, date, str_arg(&args, "time")?)?;
        tracing::info!(appointment = %a, "appointment rescheduled");
        Ok(format!("Rescheduled {}", a))
    }
}

/// Registry holding all five appointment tools over `book`.
pub fn appointment_tools(catalog: &ToolCatalog, book: Arc<AppointmentBook>) -> Result<ToolRegistry, ToolError> {
    Ok(ToolRegistry::new()
        .with(Arc::new(GetAvailabilityTool::new(catalog, book.clone())?))
        .with(Arc::new(ListAppointmentsTool::new(catalog, book.clone())?))
        .with(Arc::new(BookAppointmentTool::new(catalog, book.clone())?))
        .with(Arc::new(CancelAppointmentTool::new(catalog, book.clone())?))
        .with(Arc::new(RescheduleAppointmentTool::new(catalog, book)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> (Arc<AppointmentBook>, ToolRegistry) {
        let book = Arc::new(AppointmentBook::new());
        let tools = appointment_tools(&ToolCatalog::load().unwrap(), book.clone()).unwrap();
        (book, tools)
    }

    /// **Scenario**: Classification comes from YAML: two safe readers, three sensitive writers.
    #[test]
    fn safety_split() {
        let (_, tools) = registry();
        assert_eq!(tools.len(), 5);
        assert_eq!(tools.subset(ToolSafety::Safe).len(), 2);
        for name in [TOOL_BOOK_APPOINTMENT, TOOL_CANCEL_APPOINTMENT, TOOL_RESCHEDULE_APPOINTMENT] {
            assert!(tools.is_sensitive(name), "{}", name);
        }
    }

    /// **Scenario**: Booking takes the slot; cancelling frees it again.
    #[tokio::test]
    async fn book_then_cancel_frees_slot() {
        let (book, tools) = registry();
        let out = tools
            .call(
                TOOL_BOOK_APPOINTMENT,
                json!({"listing_id": "L-1001", "date": "2024-06-01", "time": "09:00"}),
            )
            .await
            .unwrap();
        assert_eq!(out, "Booked apt-1: L-1001 on 2024-06-01 at 09:00");

        let avail = tools
            .call(TOOL_GET_AVAILABILITY, json!({"date": "2024-06-01"}))
            .await
            .unwrap();
        assert_eq!(avail, "Free slots on 2024-06-01: 11:00, 14:00, 16:00");

        tools
            .call(TOOL_CANCEL_APPOINTMENT, json!({"appointment_id": "apt-1"}))
            .await
            .unwrap();
        assert!(book.list().is_empty());
        assert_eq!(
            tools.call(TOOL_LIST_APPOINTMENTS, json!({})).await.unwrap(),
            "No appointments booked."
        );
    }

    /// **Scenario**: Double booking, bad dates, bad slots and unknown ids are tool errors.
    #[tokio::test]
    async fn invalid_requests_fail() {
        let (book, tools) = registry();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        book.book("L-1", date, "11:00").unwrap();

        assert!(matches!(book.book("L-2", date, "11:00"), Err(ToolError::Execution(_))));
        assert!(matches!(book.book("L-2", date, "10:30"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(
            tools.call(TOOL_GET_AVAILABILITY, json!({"date": "June 1st"})).await,
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            tools.call(TOOL_CANCEL_APPOINTMENT, json!({"appointment_id": "apt-9"})).await,
            Err(ToolError::Execution(_))
        ));
    }

    /// **Scenario**: Rescheduling into its own slot is allowed; into a taken one is not.
    #[test]
    fn reschedule_checks_conflicts() {
        let book = AppointmentBook::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let a = book.book("L-1", date, "09:00").unwrap();
        let b = book.book("L-2", date, "11:00").unwrap();

        assert!(book.reschedule(&a.id, date, "09:00").is_ok());
        assert!(matches!(book.reschedule(&a.id, date, "11:00"), Err(ToolError::Execution(_))));
        let moved = book.reschedule(&b.id, date, "16:00").unwrap();
        assert_eq!(moved.time, "16:00");
        assert_eq!(book.availability(date), vec!["11:00", "14:00"]);
    }
}
