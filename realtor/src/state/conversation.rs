use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::GraphState;
use crate::message::{Message, ToolCall};
use crate::state::SearchCriteria;

/// Shared record for one conversation: message history plus structured search criteria.
///
/// Which sub-agent owns the conversation is not stored; it follows from the graph position
/// kept in the checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub search_criteria: SearchCriteria,
}

/// Delta returned by a node. Empty by default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationUpdate {
    /// Appended to the history in order.
    pub messages: Vec<Message>,
    /// When `Some`, replaces the stored criteria entirely.
    pub search_criteria: Option<SearchCriteria>,
}

impl ConversationUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn search_criteria(mut self, criteria: SearchCriteria) -> Self {
        self.search_criteria = Some(criteria);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.search_criteria.is_none()
    }
}

impl GraphState for ConversationState {
    type Update = ConversationUpdate;

    fn apply(&mut self, update: ConversationUpdate) {
        self.messages.extend(update.messages);
        if let Some(criteria) = update.search_criteria {
            self.search_criteria = criteria;
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Index of the most recent assistant message.
    fn last_assistant_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .rposition(|m| matches!(m, Message::Assistant { .. }))
    }

    /// Tool calls of the most recent message when it is an assistant message; routers look
    /// only at this.
    pub fn last_assistant_tool_calls(&self) -> &[ToolCall] {
        self.last_message().map(Message::tool_calls).unwrap_or(&[])
    }

    /// Calls of the most recent assistant message that no later tool result answers yet.
    pub fn unanswered_tool_calls(&self) -> Vec<&ToolCall> {
        let Some(idx) = self.last_assistant_index() else {
            return Vec::new();
        };
        let answered: HashSet<&str> = self.messages[idx + 1..]
            .iter()
            .filter_map(Message::tool_call_id)
            .collect();
        self.messages[idx]
            .tool_calls()
            .iter()
            .filter(|c| !answered.contains(c.id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall::new(id, name, json!({}))
    }

    /// **Scenario**: apply appends messages and leaves criteria alone when the delta has none.
    #[test]
    fn apply_appends_messages_keeps_criteria() {
        let mut state = ConversationState {
            messages: vec![Message::user("hi")],
            search_criteria: SearchCriteria {
                city: Some("Austin".into()),
                ..Default::default()
            },
        };
        state.apply(ConversationUpdate::new().message(Message::assistant("hello")));
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1], Message::assistant("hello"));
        assert_eq!(state.search_criteria.city.as_deref(), Some("Austin"));
    }

    /// **Scenario**: A criteria delta replaces the stored criteria wholesale (no field merge).
    #[test]
    fn apply_replaces_criteria_wholesale() {
        let mut state = ConversationState {
            messages: vec![],
            search_criteria: SearchCriteria {
                city: Some("Austin".into()),
                min_bedroom: Some(3),
                ..Default::default()
            },
        };
        state.apply(ConversationUpdate::new().search_criteria(SearchCriteria {
            city: Some("Denver".into()),
            ..Default::default()
        }));
        assert_eq!(state.search_criteria.city.as_deref(), Some("Denver"));
        assert_eq!(state.search_criteria.min_bedroom, None);
    }

    /// **Scenario**: Only calls of the latest assistant message without a result are unanswered.
    #[test]
    fn unanswered_tool_calls_tracks_results() {
        let a = call("c1", "get_availability");
        let b = call("c2", "book_appointment");
        let state = ConversationState {
            messages: vec![
                Message::user("book it"),
                Message::assistant_with_tool_calls("", vec![a.clone(), b.clone()]),
                Message::tool_result(&a, "free at 10:00"),
            ],
            search_criteria: SearchCriteria::default(),
        };
        let pending = state.unanswered_tool_calls();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "c2");
        // The last message is a tool result, so routers see no calls.
        assert!(state.last_assistant_tool_calls().is_empty());
    }

    #[test]
    fn empty_state_has_no_calls() {
        let state = ConversationState::new();
        assert!(state.unanswered_tool_calls().is_empty());
        assert!(state.last_assistant_tool_calls().is_empty());
        assert!(ConversationUpdate::new().is_empty());
    }
}
