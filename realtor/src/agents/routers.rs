//! Routers: pure functions of the conversation state that pick the next node.

use crate::agents::NodeId;
use crate::state::ConversationState;
use crate::tools::{Delegation, ToolRegistry};

/// After `main_agent`: no tool calls yields to the user; a delegation call moves to that
/// specialized agent (first delegation in request order wins); anything else runs the main
/// agent's tool node.
pub fn route_main_agent(state: &ConversationState) -> NodeId {
    let calls = state.last_assistant_tool_calls();
    if calls.is_empty() {
        return NodeId::End;
    }
    match calls
        .iter()
        .find_map(|c| Delegation::from_tool_name(&c.name))
    {
        Some(Delegation::SearchCriteria) => NodeId::SearchCriteriaAgent,
        Some(Delegation::Appointment) => NodeId::AppointmentAgent,
        None => NodeId::MainAgentTools,
    }
}

/// After `appointment_agent`: no tool calls hands back to the main agent; one sensitive call
/// sends the whole batch to the sensitive (gated) node; otherwise the safe node.
///
/// `tools` holds the appointment tools and is only read for their safety class.
pub fn route_appointment_agent(state: &ConversationState, tools: &ToolRegistry) -> NodeId {
    let calls = state.last_assistant_tool_calls();
    if calls.is_empty() {
        NodeId::LeaveSpecializedAgent
    } else if calls.iter().any(|c| tools.is_sensitive(&c.name)) {
        NodeId::SensitiveAppointmentTools
    } else {
        NodeId::SafeAppointmentTools
    }
}
