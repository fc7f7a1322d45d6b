//! Main agent: the top-level dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::agents::NodeId;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{LlmClient, LlmRequest};
use crate::message::Message;
use crate::state::{ConversationState, ConversationUpdate};
use crate::tools::ToolSpec;

const SYSTEM_PROMPT: &str = "You are a friendly assistant for a real estate agency. You help users find homes for sale and arrange viewings.

- When the user wants to find, filter or refine property listings, call to_search_criteria_agent with their request in their own words.
- When the user wants to check availability, book, cancel, reschedule or list viewing appointments, call to_appointment_agent with their request.
- When the user asks about one specific listing id, call get_listing_details.
- Otherwise answer directly and keep it short.

After a search, present the listings you were given; never invent listings.";

/// Answers directly, calls its own tools, or delegates by calling a delegation tool.
///
/// Sees the full history and the current search criteria. A failed model call becomes an
/// assistant message without tool calls, which yields to the user.
pub struct MainAgent {
    llm: Arc<dyn LlmClient>,
    tools: Vec<ToolSpec>,
}

impl MainAgent {
    /// `tools`: delegation specs plus the main agent's own tools.
    pub fn new(llm: Arc<dyn LlmClient>, tools: Vec<ToolSpec>) -> Self {
        Self { llm, tools }
    }

    fn system_prompt(state: &ConversationState) -> String {
        format!(
            "{}\n\nCurrent search criteria:\n{}",
            SYSTEM_PROMPT,
            state.search_criteria.to_pretty_json()
        )
    }
}

#[async_trait]
impl Node<ConversationState> for MainAgent {
    fn id(&self) -> &str {
        NodeId::MainAgent.as_str()
    }

    async fn run(
        &self,
        state: &ConversationState,
    ) -> Result<(ConversationUpdate, Next), AgentError> {
        let request = LlmRequest::new(Self::system_prompt(state))
            .with_messages(state.messages.clone())
            .with_tools(self.tools.clone());
        let reply = match self.llm.invoke(&request).await {
            Ok(r) => Message::assistant_with_tool_calls(r.content, r.tool_calls),
            Err(e) => {
                warn!(error = %e, "main agent model call failed");
                Message::assistant(format!(
                    "Sorry, I couldn't process that request. Error: {}",
                    e
                ))
            }
        };
        Ok((ConversationUpdate::new().message(reply), Next::Continue))
    }
}
