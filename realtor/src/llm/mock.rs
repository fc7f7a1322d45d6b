//! Scripted LLM for tests and offline runs.
//!
//! Replies are consumed in order, one per `invoke`; every request is recorded so tests can
//! assert on prompts, tools and output format.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmRequest, LlmResponse};
use crate::message::ToolCall;

/// One scripted reply.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Assistant text with optional tool calls.
    Message {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    /// Call failure carrying this description.
    Fail(String),
}

impl MockReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Message {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Serialized JSON object as content (structured replies).
    pub fn json(value: Value) -> Self {
        Self::text(value.to_string())
    }

    /// One tool call with no text.
    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self::tool_calls(vec![ToolCall::new(id, name, arguments)])
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self::Message {
            content: String::new(),
            tool_calls,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self::Fail(error.into())
    }
}

/// Mock LLM: returns scripted replies in order and records each request.
///
/// When the script is exhausted, `invoke` fails with `ExecutionFailed("mock script
/// exhausted")`, which agents report like any other model failure.
///
/// **Interaction**: Implements `LlmClient`; injected into agents in tests and examples.
#[derive(Default)]
pub struct MockLlm {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Appends a reply to the end of the script.
    pub fn push(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse, AgentError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match reply {
            Some(MockReply::Message {
                content,
                tool_calls,
            }) => Ok(LlmResponse {
                content,
                tool_calls,
                usage: None,
            }),
            Some(MockReply::Fail(e)) => Err(AgentError::ExecutionFailed(e)),
            None => Err(AgentError::ExecutionFailed("mock script exhausted".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: Replies come back in order, then the exhausted script fails.
    #[tokio::test]
    async fn replies_in_order_then_exhausted() {
        let llm = MockLlm::new(vec![
            MockReply::tool_call("c1", "to_appointment_agent", json!({"request": "book"})),
            MockReply::fail("timeout"),
        ]);
        let req = LlmRequest::new("sys");

        let first = llm.invoke(&req).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "to_appointment_agent");
        assert!(matches!(
            llm.invoke(&req).await,
            Err(AgentError::ExecutionFailed(e)) if e == "timeout"
        ));
        assert!(matches!(
            llm.invoke(&req).await,
            Err(AgentError::ExecutionFailed(e)) if e.contains("exhausted")
        ));
        assert_eq!(llm.requests().len(), 3);
    }
}
