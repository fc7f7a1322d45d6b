//! Delegation tools: the main agent hands a request to a specialized agent by calling one.
//!
//! They are never executed by a tool node; the main-agent router sees the call and moves the
//! conversation to the specialized agent, which answers the call itself.

use crate::tools::{ToolCatalog, ToolError, ToolSpec};

pub const TOOL_TO_SEARCH_CRITERIA_AGENT: &str = "to_search_criteria_agent";
pub const TOOL_TO_APPOINTMENT_AGENT: &str = "to_appointment_agent";

/// Which specialized agent a delegation call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegation {
    SearchCriteria,
    Appointment,
}

impl Delegation {
    pub fn from_tool_name(name: &str) -> Option<Self> {
        match name {
            TOOL_TO_SEARCH_CRITERIA_AGENT => Some(Self::SearchCriteria),
            TOOL_TO_APPOINTMENT_AGENT => Some(Self::Appointment),
            _ => None,
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::SearchCriteria => TOOL_TO_SEARCH_CRITERIA_AGENT,
            Self::Appointment => TOOL_TO_APPOINTMENT_AGENT,
        }
    }
}

/// Specs of both delegation tools, as advertised to the main agent.
pub fn delegation_specs(catalog: &ToolCatalog) -> Result<Vec<ToolSpec>, ToolError> {
    [Delegation::SearchCriteria, Delegation::Appointment]
        .iter()
        .map(|d| catalog.spec(d.tool_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_and_specs_load() {
        for d in [Delegation::SearchCriteria, Delegation::Appointment] {
            assert_eq!(Delegation::from_tool_name(d.tool_name()), Some(d));
        }
        assert_eq!(Delegation::from_tool_name("get_listing_details"), None);
        let specs = delegation_specs(&ToolCatalog::load().unwrap()).unwrap();
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| s.input_schema["required"][0] == "request"));
    }
}
