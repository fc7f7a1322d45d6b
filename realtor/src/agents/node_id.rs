//! Closed set of node identifiers of the realtor graph.

use std::fmt;
use std::str::FromStr;

use crate::error::AgentError;
use crate::graph::END;

/// Nodes of the realtor graph, plus `End` (yield to the user).
///
/// Routers return a `NodeId`; the graph engine itself is keyed by [`NodeId::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    MainAgent,
    LeaveSpecializedAgent,
    SearchCriteriaAgent,
    QueryDatabase,
    AppointmentAgent,
    SafeAppointmentTools,
    SensitiveAppointmentTools,
    /// Runs the main agent's own (non-delegation) tools.
    MainAgentTools,
    End,
}

impl NodeId {
    pub const ALL: [NodeId; 9] = [
        NodeId::MainAgent,
        NodeId::LeaveSpecializedAgent,
        NodeId::SearchCriteriaAgent,
        NodeId::QueryDatabase,
        NodeId::AppointmentAgent,
        NodeId::SafeAppointmentTools,
        NodeId::SensitiveAppointmentTools,
        NodeId::MainAgentTools,
        NodeId::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainAgent => "main_agent",
            Self::LeaveSpecializedAgent => "leave_specialized_agent",
            Self::SearchCriteriaAgent => "search_criteria_agent",
            Self::QueryDatabase => "query_database",
            Self::AppointmentAgent => "appointment_agent",
            Self::SafeAppointmentTools => "safe_appointment_tools",
            Self::SensitiveAppointmentTools => "sensitive_appointment_tools",
            Self::MainAgentTools => "main_agent_tools",
            Self::End => END,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeId {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| AgentError::NodeNotFound(s.to_string()))
    }
}
