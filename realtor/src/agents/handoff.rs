//! Entering a specialized agent: closing the main agent's delegation call.

use crate::message::{Message, ToolCall};
use crate::state::ConversationState;
use crate::tools::Delegation;

/// What a specialized agent found on entry.
pub(crate) struct Handoff {
    /// The delegation call addressed to this agent, if it is still open.
    pub call: Option<ToolCall>,
    /// Results closing every open call of the delegating message.
    pub closing: Vec<Message>,
}

impl Handoff {
    /// The `request` argument of the delegation call.
    pub fn request(&self) -> Option<&str> {
        self.call
            .as_ref()
            .and_then(|c| c.arguments.get("request"))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Looks for an open delegation call to `target`. When found, it is answered with
/// `entering` and every other open call of the same message with a "skipped" error, so no
/// call is left unanswered once the specialized agent takes over.
pub(crate) fn accept(state: &ConversationState, target: Delegation, entering: &str) -> Handoff {
    let open = state.unanswered_tool_calls();
    let Some(call) = open.iter().find(|c| c.name == target.tool_name()) else {
        return Handoff {
            call: None,
            closing: Vec::new(),
        };
    };
    let call = (*call).clone();
    let closing = open
        .iter()
        .map(|c| {
            if c.id == call.id {
                Message::tool_result(c, entering)
            } else {
                Message::tool_error(c, format!("skipped: delegated to {}", target.tool_name()))
            }
        })
        .collect();
    Handoff {
        call: Some(call),
        closing,
    }
}
