//! Model-call boundary used by the agent nodes.
//!
//! A request carries the system instruction, the ordered prior messages, the tools the model
//! may call and an optional output-format constraint. The response is either free text, text
//! plus tool calls, or (for structured requests) a JSON object. Failures surface as
//! `AgentError::ExecutionFailed`; agents turn them into visible messages.

mod mock;
mod openai;

pub use mock::{MockLlm, MockReply};
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::tools::ToolSpec;

/// Output-format constraint for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormat {
    /// The reply content must be a single JSON object.
    JsonObject,
}

/// One model call.
#[derive(Clone, Debug, Default)]
pub struct LlmRequest {
    /// System instruction, sent before `messages`.
    pub system: String,
    pub messages: Vec<Message>,
    /// Tools the model may call; empty disables tool calling.
    pub tools: Vec<ToolSpec>,
    pub response_format: Option<ResponseFormat>,
}

impl LlmRequest {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            ..Default::default()
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

/// Token usage for one call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Assistant text and the tool calls it requested (empty when none).
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<LlmUsage>,
}

/// Model client: one request in, one assistant reply out.
///
/// Implementations: [`MockLlm`] (scripted), [`ChatOpenAI`] (Chat Completions API). Clients
/// are constructed once and injected into agents as `Arc<dyn LlmClient>`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse, AgentError>;
}

/// Runs `request` with JSON-object output forced and parses the reply into `T`.
///
/// Content that is not valid JSON for `T` is a schema violation and returned as
/// `ExecutionFailed`.
pub async fn invoke_structured<T: DeserializeOwned>(
    client: &dyn LlmClient,
    request: LlmRequest,
) -> Result<T, AgentError> {
    let request = request.with_response_format(ResponseFormat::JsonObject);
    let response = client.invoke(&request).await?;
    let raw = strip_code_fence(response.content.trim());
    serde_json::from_str(raw).map_err(|e| {
        tracing::debug!(error = %e, content = %response.content, "structured output rejected");
        AgentError::ExecutionFailed(format!("invalid structured output: {}", e))
    })
}

/// Some models wrap JSON in a ```json fence even in JSON mode.
fn strip_code_fence(s: &str) -> &str {
    s.strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pick {
        city: String,
    }

    /// **Scenario**: Structured calls force JSON mode and parse the reply.
    #[tokio::test]
    async fn invoke_structured_parses_and_sets_format() {
        let llm = MockLlm::new(vec![MockReply::text(r#"{"city": "Austin"}"#)]);
        let pick: Pick = invoke_structured(&llm, LlmRequest::new("sys")).await.unwrap();
        assert_eq!(pick.city, "Austin");
        assert_eq!(
            llm.requests()[0].response_format,
            Some(ResponseFormat::JsonObject)
        );
    }

    /// **Scenario**: Fenced JSON is accepted; prose is a schema violation.
    #[tokio::test]
    async fn invoke_structured_fence_and_garbage() {
        let llm = MockLlm::new(vec![
            MockReply::text("```json\n{\"city\": \"Reno\"}\n```"),
            MockReply::text("Sure! Austin it is."),
        ]);
        let pick: Pick = invoke_structured(&llm, LlmRequest::new("sys")).await.unwrap();
        assert_eq!(pick.city, "Reno");
        let err = invoke_structured::<Pick>(&llm, LlmRequest::new("sys"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ExecutionFailed(m) if m.contains("structured")));
    }
}
