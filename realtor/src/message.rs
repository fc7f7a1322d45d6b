//! Conversation messages: user, assistant (optionally requesting tool calls), tool results.
//!
//! Serialized with a `role` tag so checkpoints stay readable.

use serde::{Deserialize, Serialize};

/// One tool invocation requested by an assistant message.
///
/// `id` is unique within the conversation and is echoed back by the matching
/// [`Message::Tool`] result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A single entry in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// System prompt. Agents build their own; stored history normally has none.
    System { content: String },
    /// User input.
    User { content: String },
    /// Model reply; may request tool calls.
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool call, tagged with the originating call id.
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Assistant reply without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Successful tool result for `call`.
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Failed tool result for `call`; the error text is what the model sees.
    pub fn tool_error(call: &ToolCall, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: true,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content,
        }
    }

    /// Tool calls requested by an assistant message; empty for every other role.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Call id answered by a tool result.
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: Messages serialize with a `role` tag and omit empty tool_calls.
    #[test]
    fn serializes_with_role_tag() {
        let v = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(v, json!({"role": "assistant", "content": "hi"}));

        let call = ToolCall::new("call_1", "cancel_appointment", json!({"appointment_id": "a-1"}));
        let v = serde_json::to_value(Message::tool_error(&call, "denied")).unwrap();
        assert_eq!(v["role"], "tool");
        assert_eq!(v["tool_call_id"], "call_1");
        assert_eq!(v["is_error"], true);
    }

    /// **Scenario**: tool_result copies the call id and name of the originating call.
    #[test]
    fn tool_result_is_tagged_with_call_id() {
        let call = ToolCall::new("call_9", "get_availability", json!({}));
        let msg = Message::tool_result(&call, "10:00, 14:00");
        assert_eq!(msg.tool_call_id(), Some("call_9"));
        assert_eq!(msg.role(), "tool");
        assert_eq!(msg.content(), "10:00, 14:00");
        assert!(msg.tool_calls().is_empty());
    }

    /// **Scenario**: A stored assistant message without tool_calls deserializes with an empty list.
    #[test]
    fn deserializes_assistant_without_tool_calls() {
        let msg: Message =
            serde_json::from_value(json!({"role": "assistant", "content": "done"})).unwrap();
        assert_eq!(msg, Message::assistant("done"));
    }
}
