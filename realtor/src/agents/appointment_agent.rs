//! Appointment agent: schedules viewings through the appointment tools.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::agents::handoff;
use crate::agents::NodeId;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{LlmClient, LlmRequest};
use crate::message::Message;
use crate::state::{ConversationState, ConversationUpdate};
use crate::tools::{Delegation, ToolSpec, SLOTS};

pub(crate) const ENTERING: &str = "Entering appointment agent.";

const SYSTEM_PROMPT: &str = "You schedule property viewings for a real estate agency.

- Use get_availability to find free slots on a date and list_appointments to see what is booked.
- Use book_appointment, cancel_appointment or reschedule_appointment to change the calendar. These need the user's confirmation; the system asks for it, so just call the tool.
- Dates are YYYY-MM-DD. If a request is missing a date, time or listing id, ask for it instead of guessing.
- When you are done, reply with a short summary and no tool calls to hand the conversation back.";

/// Scheduling specialist. On entry it closes the main agent's delegation call; afterwards it
/// is re-entered after each tool batch.
pub struct AppointmentAgent {
    llm: Arc<dyn LlmClient>,
    tools: Vec<ToolSpec>,
}

impl AppointmentAgent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Vec<ToolSpec>) -> Self {
        Self { llm, tools }
    }

    fn system_prompt() -> String {
        format!(
            "{}\n\nToday is {}. Bookable slots every day: {}.",
            SYSTEM_PROMPT,
            chrono::Utc::now().date_naive(),
            SLOTS.join(", ")
        )
    }
}

#[async_trait]
impl Node<ConversationState> for AppointmentAgent {
    fn id(&self) -> &str {
        NodeId::AppointmentAgent.as_str()
    }

    async fn run(
        &self,
        state: &ConversationState,
    ) -> Result<(ConversationUpdate, Next), AgentError> {
        let handoff = handoff::accept(state, Delegation::Appointment, ENTERING);
        let mut history = state.messages.clone();
        history.extend(handoff.closing.iter().cloned());

        let request = LlmRequest::new(Self::system_prompt())
            .with_messages(history)
            .with_tools(self.tools.clone());
        let reply = match self.llm.invoke(&request).await {
            Ok(r) => Message::assistant_with_tool_calls(r.content, r.tool_calls),
            Err(e) => {
                warn!(error = %e, "appointment agent model call failed");
                Message::assistant(format!(
                    "Sorry, I couldn't handle the appointment request. Error: {}",
                    e
                ))
            }
        };
        let update = ConversationUpdate::new()
            .messages(handoff.closing)
            .message(reply);
        Ok((update, Next::Continue))
    }
}
