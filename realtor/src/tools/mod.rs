//! Tools the agents may call: specs, safety classification, registry and implementations.
//!
//! Specs are declared once in YAML ([`ToolCatalog`]); Rust implementations look their
//! definition up by name at construction.

mod appointment;
mod catalog;
mod delegation;
mod listing;
mod registry;
mod r#trait;

pub use appointment::{
    appointment_tools, Appointment, AppointmentBook, BookAppointmentTool, CancelAppointmentTool,
    GetAvailabilityTool, ListAppointmentsTool, RescheduleAppointmentTool, SLOTS,
    TOOL_BOOK_APPOINTMENT, TOOL_CANCEL_APPOINTMENT, TOOL_GET_AVAILABILITY,
    TOOL_LIST_APPOINTMENTS, TOOL_RESCHEDULE_APPOINTMENT,
};
pub use catalog::{ToolCatalog, ToolDefinition};
pub use delegation::{delegation_specs, Delegation, TOOL_TO_APPOINTMENT_AGENT, TOOL_TO_SEARCH_CRITERIA_AGENT};
pub use listing::{GetListingDetailsTool, TOOL_GET_LISTING_DETAILS};
pub use r#trait::Tool;
pub use registry::ToolRegistry;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tool specification as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    /// Human-readable description for the model.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema for the arguments.
    pub input_schema: Value,
}

/// Safety class, declared once per tool.
///
/// Sensitive tools mutate external state and only run after the conversation's interrupt
/// has been cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSafety {
    #[default]
    Safe,
    Sensitive,
}

/// Tool failure. Never fatal: the tool node turns it into an error tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("tool failed: {0}")]
    Execution(String),
}

/// Reads a required string argument.
pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidInput(format!("missing string argument `{}`", key)))
}
