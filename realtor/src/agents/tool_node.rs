//! Tool node: runs the pending tool calls of the latest assistant message.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agents::NodeId;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::state::{ConversationState, ConversationUpdate};
use crate::tools::ToolRegistry;

/// Executes every unanswered call of the latest assistant message, in request order, and
/// answers each with exactly one tool result carrying its call id.
///
/// Unknown tools, bad arguments and tool failures become `is_error` results; the run goes on.
pub struct ToolNode {
    id: NodeId,
    tools: ToolRegistry,
}

impl ToolNode {
    pub fn new(id: NodeId, tools: ToolRegistry) -> Self {
        Self { id, tools }
    }
}

#[async_trait]
impl Node<ConversationState> for ToolNode {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    async fn run(
        &self,
        state: &ConversationState,
    ) -> Result<(ConversationUpdate, Next), AgentError> {
        let mut results = Vec::new();
        for call in state.unanswered_tool_calls() {
            debug!(node = %self.id, tool = %call.name, call_id = %call.id, "calling tool");
            let message = match self.tools.call(&call.name, call.arguments.clone()).await {
                Ok(text) => Message::tool_result(call, text),
                Err(e) => {
                    warn!(node = %self.id, tool = %call.name, call_id = %call.id, error = %e, "tool failed");
                    Message::tool_error(call, e.to_string())
                }
            };
            results.push(message);
        }
        Ok((ConversationUpdate::new().messages(results), Next::Continue))
    }
}
