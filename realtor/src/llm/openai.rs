//! OpenAI Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Requires `OPENAI_API_KEY` (or explicit config). Tool specs from the request are sent as
//! function tools; assistant tool calls and tool results in the history are mapped to their
//! wire form so multi-step tool conversations replay correctly. JSON-object requests set
//! `response_format`.
//!
//! **Interaction**: Implements `LlmClient`; injected into agents like `MockLlm`.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
        ResponseFormat as WireResponseFormat, ToolChoiceOptions,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage, ResponseFormat};
use crate::message::{Message, ToolCall};

fn build_failed(e: impl std::fmt::Display) -> AgentError {
    AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
}

/// OpenAI Chat Completions client.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl ChatOpenAI {
    /// Default config: API key from `OPENAI_API_KEY`, base URL from `OPENAI_BASE_URL` or the
    /// public endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    /// Custom config (explicit API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    /// Builds the config from optional overrides; unset values fall back to the environment.
    pub fn from_parts(
        model: impl Into<String>,
        api_key: Option<&str>,
        base_url: Option<&str>,
    ) -> Self {
        let mut config = OpenAIConfig::new();
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        if let Some(base) = base_url {
            config = config.with_api_base(base.trim_end_matches('/'));
        }
        Self::with_config(config, model)
    }

    /// Temperature (0–2). Lower is more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn wire_tool_call(call: &ToolCall) -> ChatCompletionMessageToolCalls {
        ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
            id: call.id.clone(),
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        })
    }

    fn message_to_request(m: &Message) -> Result<ChatCompletionRequestMessage, AgentError> {
        Ok(match m {
            Message::System { content } => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(content.as_str()),
            ),
            Message::User { content } => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(content.as_str()),
            ),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                if !content.is_empty() {
                    args.content(content.as_str());
                }
                if !tool_calls.is_empty() {
                    args.tool_calls(
                        tool_calls
                            .iter()
                            .map(Self::wire_tool_call)
                            .collect::<Vec<_>>(),
                    );
                }
                ChatCompletionRequestMessage::Assistant(args.build().map_err(build_failed)?)
            }
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => ChatCompletionRequestMessage::Tool(
                ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(tool_call_id.as_str())
                    .content(content.as_str())
                    .build()
                    .map_err(build_failed)?,
            ),
        })
    }

    fn request_messages(
        request: &LlmRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let system = (!request.system.is_empty()).then(|| Message::system(request.system.as_str()));
        system
            .iter()
            .chain(request.messages.iter())
            .map(Self::message_to_request)
            .collect()
    }

    /// Arguments that are not valid JSON are kept as a string so the tool reports them.
    fn parse_arguments(raw: String) -> serde_json::Value {
        if raw.trim().is_empty() {
            return serde_json::Value::Object(Default::default());
        }
        serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse, AgentError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::request_messages(request)?);

        if !request.tools.is_empty() {
            let chat_tools: Vec<ChatCompletionTools> = request
                .tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Auto));
        }

        if let Some(ResponseFormat::JsonObject) = request.response_format {
            args.response_format(WireResponseFormat::JsonObject);
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        let wire = args.build().map_err(build_failed)?;
        debug!(
            trace_id = %trace_id,
            model = %self.model,
            message_count = request.messages.len(),
            tools_count = request.tools.len(),
            json_mode = request.response_format.is_some(),
            temperature = ?self.temperature,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&wire) {
            trace!(trace_id = %trace_id, request = %js, "OpenAI request body");
        }

        let response = self
            .client
            .chat()
            .create(wire)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, response = %js, "OpenAI response body");
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
        })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall::new(
                    f.id,
                    f.function.name,
                    Self::parse_arguments(f.function.arguments),
                )),
                _ => None,
            })
            .collect();

        let usage = response.usage.map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        if let Some(ref u) = usage {
            debug!(trace_id = %trace_id, total_tokens = u.total_tokens, "OpenAI usage");
        }
        Ok(LlmResponse {
            content,
            tool_calls,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: The system instruction leads; assistant tool calls and tool results map
    /// to their wire roles.
    #[test]
    fn history_maps_to_wire_roles() {
        let call = ToolCall::new("c1", "get_availability", json!({"date": "2024-06-01"}));
        let request = LlmRequest::new("be brief").with_messages(vec![
            Message::user("when can I visit?"),
            Message::assistant_with_tool_calls("", vec![call.clone()]),
            Message::tool_result(&call, "10:00, 14:00"),
        ]);
        let wire = ChatOpenAI::request_messages(&request).unwrap();
        assert_eq!(wire.len(), 4);
        assert!(matches!(wire[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(wire[1], ChatCompletionRequestMessage::User(_)));
        match &wire[2] {
            ChatCompletionRequestMessage::Assistant(a) => {
                assert!(a.content.is_none());
                assert_eq!(a.tool_calls.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("expected assistant, got {:?}", other),
        }
        match &wire[3] {
            ChatCompletionRequestMessage::Tool(t) => assert_eq!(t.tool_call_id, "c1"),
            other => panic!("expected tool, got {:?}", other),
        }
    }

    #[test]
    fn arguments_fall_back_to_string() {
        assert_eq!(ChatOpenAI::parse_arguments("{\"a\":1}".into()), json!({"a": 1}));
        assert_eq!(ChatOpenAI::parse_arguments("".into()), json!({}));
        assert_eq!(ChatOpenAI::parse_arguments("{oops".into()), json!("{oops"));
    }
}
