//! Search-criteria agent: turns a free-text property request into [`SearchCriteria`].
//!
//! One structured model call sees the stored criteria and the request. Whether the request
//! starts a new search or refines the current one is left to the model; its complete output
//! replaces the stored criteria wholesale.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agents::handoff;
use crate::agents::NodeId;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{invoke_structured, LlmClient, LlmRequest};
use crate::message::Message;
use crate::state::{field_label, ConversationState, ConversationUpdate, SearchCriteria};
use crate::tools::Delegation;

const ENTERING: &str = "Entering search criteria agent.";
const ENTERING_FAILED: &str = "Entering search criteria agent";

const SYSTEM_PROMPT: &str = r#"
You are an AI assistant for a real estate search application. Your task is to interpret user queries about property searches and generate a JSON object representing the search criteria. The criteria should follow this structure:

{
    "city": Optional[str],
    "state": Optional[str],
    "min_bedroom": Optional[int],
    "min_bathroom": Optional[int],
    "max_price": Optional[float],
    "min_price": Optional[float]
}

Guidelines:
1. If the user's query indicates a new search (e.g., asking about a different location), create a new search criteria object, discarding any previous criteria.
2. If the query is a follow-up or modification to a previous search, update the existing criteria by adding new information or modifying existing fields.
3. Use singular forms for 'bedroom' and 'bathroom' in the JSON output.
4. For bedroom and bathroom counts, use the 'min_' prefix to indicate "at least" this many.
5. Infer the state if a well-known city is mentioned (e.g., "New York" implies "New York" state).
6. If a price range is mentioned, use 'min_price' and 'max_price' accordingly.
7. Only include fields in the JSON that are explicitly mentioned or can be reasonably inferred from the user's query.
8. The entire response should be a valid JSON object matching the structure above.

Respond with only the JSON object, no additional text.
"#;

/// Summary shown after a successful update, one line per set field.
pub fn criteria_summary(criteria: &SearchCriteria) -> String {
    let mut out = String::from(
        "I've updated your search criteria based on your request. Here's what I understood:\n",
    );
    for (field, value) in criteria.fields() {
        out.push_str(&format!("- {}: {}\n", field_label(field), value));
    }
    out
}

pub struct SearchCriteriaAgent {
    llm: Arc<dyn LlmClient>,
}

impl SearchCriteriaAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn request(current: &SearchCriteria, query: &str) -> LlmRequest {
        LlmRequest::new(SYSTEM_PROMPT).with_messages(vec![
            Message::user(format!("Current Criteria: {}", current.to_pretty_json())),
            Message::user(format!("User Query: {}", query)),
        ])
    }

    fn failed(closing: Vec<Message>, error: impl std::fmt::Display) -> ConversationUpdate {
        ConversationUpdate::new()
            .messages(closing)
            .message(Message::assistant(format!(
                "Failed to parse search criteria. Error: {}",
                error
            )))
    }
}

#[async_trait]
impl Node<ConversationState> for SearchCriteriaAgent {
    fn id(&self) -> &str {
        NodeId::SearchCriteriaAgent.as_str()
    }

    async fn run(
        &self,
        state: &ConversationState,
    ) -> Result<(ConversationUpdate, Next), AgentError> {
        let handoff = handoff::accept(state, Delegation::SearchCriteria, ENTERING);

        let query = match (&handoff.call, handoff.request()) {
            (_, Some(q)) => q.to_string(),
            (Some(call), None) => {
                // The delegation call itself is malformed: its result carries the error.
                let error = "missing required argument: request";
                let closing = handoff
                    .closing
                    .iter()
                    .map(|m| match m.tool_call_id() {
                        Some(id) if id == call.id => Message::tool_error(call, error),
                        _ => m.clone(),
                    })
                    .collect();
                return Ok((Self::failed(closing, error), Next::Continue));
            }
            (None, None) => match state.messages.iter().rev().find(|m| m.role() == "user") {
                Some(m) => m.content().to_string(),
                None => {
                    return Ok((
                        Self::failed(Vec::new(), "no search request in the conversation"),
                        Next::Continue,
                    ))
                }
            },
        };

        let request = Self::request(&state.search_criteria, &query);
        match invoke_structured::<SearchCriteria>(self.llm.as_ref(), request).await {
            Ok(criteria) => {
                debug!(criteria = ?criteria, "search criteria replaced");
                let update = ConversationUpdate::new()
                    .messages(handoff.closing)
                    .message(Message::assistant(criteria_summary(&criteria)))
                    .search_criteria(criteria);
                Ok((update, Next::Continue))
            }
            Err(e) => {
                warn!(error = %e, "search criteria model call failed");
                let closing = match handoff.call {
                    Some(ref call) => handoff
                        .closing
                        .iter()
                        .map(|m| match m.tool_call_id() {
                            Some(id) if id == call.id => Message::tool_result(call, ENTERING_FAILED),
                            _ => m.clone(),
                        })
                        .collect(),
                    None => Vec::new(),
                };
                Ok((Self::failed(closing, e), Next::Continue))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::graph::GraphState;
    use crate::llm::{MockLlm, MockReply, ResponseFormat};
    use crate::message::ToolCall;

    fn delegated(args: serde_json::Value, criteria: SearchCriteria) -> ConversationState {
        let call = ToolCall::new("s1", "to_search_criteria_agent", args);
        ConversationState {
            messages: vec![
                Message::user("find me a home"),
                Message::assistant_with_tool_calls("", vec![call]),
            ],
            search_criteria: criteria,
        }
    }

    /// **Scenario**: The Austin request yields exactly four fields and a four-line summary.
    #[tokio::test]
    async fn austin_request_sets_four_fields() {
        let llm = Arc::new(MockLlm::new(vec![MockReply::json(json!({
            "city": "Austin", "state": "TX", "min_bedroom": 3, "max_price": 500000
        }))]));
        let agent = SearchCriteriaAgent::new(llm.clone());
        let mut state = delegated(
            json!({"request": "find me homes in Austin, TX with at least 3 bedrooms under $500k"}),
            SearchCriteria::default(),
        );

        let (update, _) = agent.run(&state).await.unwrap();
        assert_eq!(update.messages[0].tool_call_id(), Some("s1"));
        assert_eq!(update.messages[0].content(), ENTERING);
        assert_eq!(
            update.messages[1].content(),
            "I've updated your search criteria based on your request. Here's what I understood:\n\
             - City: Austin\n- State: TX\n- Min bedroom: 3\n- Max price: 500000\n"
        );
        state.apply(update);
        assert_eq!(state.search_criteria.fields().len(), 4);

        let sent = &llm.requests()[0];
        assert_eq!(sent.response_format, Some(ResponseFormat::JsonObject));
        assert_eq!(sent.messages[0].content(), "Current Criteria: {}");
        assert!(sent.messages[1].content().starts_with("User Query: find me homes in Austin"));
    }

    /// **Scenario**: A field the model omits does not survive; its output replaces the
    /// stored criteria wholesale.
    #[tokio::test]
    async fn omitted_field_is_dropped() {
        let llm = Arc::new(MockLlm::new(vec![MockReply::json(json!({
            "city": "Austin", "state": "TX", "max_price": 400000
        }))]));
        let agent = SearchCriteriaAgent::new(llm.clone());
        let prior = SearchCriteria {
            city: Some("Austin".into()),
            state: Some("TX".into()),
            min_bedroom: Some(3),
            max_price: Some(500_000.0),
            ..Default::default()
        };
        let mut state = delegated(json!({"request": "a bit cheaper"}), prior);

        let (update, _) = agent.run(&state).await.unwrap();
        state.apply(update);
        assert_eq!(state.search_criteria.min_bedroom, None);
        assert_eq!(state.search_criteria.max_price, Some(400_000.0));
        assert!(llm.requests()[0].messages[0].content().contains("\"min_bedroom\": 3"));
    }

    /// **Scenario**: A float bedroom count and a string price from the model still update
    /// the criteria.
    #[tokio::test]
    async fn loosely_typed_numbers_are_accepted() {
        let llm = Arc::new(MockLlm::new(vec![MockReply::json(json!({
            "city": "Austin", "min_bedroom": 3.0, "max_price": "500000"
        }))]));
        let agent = SearchCriteriaAgent::new(llm);
        let mut state = delegated(json!({"request": "3 beds in Austin under 500k"}), SearchCriteria::default());

        let (update, _) = agent.run(&state).await.unwrap();
        assert_eq!(update.messages[0].content(), ENTERING);
        assert!(update.messages[1].content().contains("- Min bedroom: 3\n"));
        assert!(update.messages[1].content().contains("- Max price: 500000\n"));
        state.apply(update);
        assert_eq!(state.search_criteria.min_bedroom, Some(3));
        assert_eq!(state.search_criteria.max_price, Some(500_000.0));
    }

    /// **Scenario**: Malformed model output keeps the criteria and reports the failure.
    #[tokio::test]
    async fn malformed_output_keeps_criteria() {
        let llm = Arc::new(MockLlm::new(vec![MockReply::text("not json at all")]));
        let agent = SearchCriteriaAgent::new(llm);
        let prior = SearchCriteria {
            city: Some("Denver".into()),
            ..Default::default()
        };
        let state = delegated(json!({"request": "somewhere sunny"}), prior);

        let (update, _) = agent.run(&state).await.unwrap();
        assert!(update.search_criteria.is_none());
        assert_eq!(update.messages[0].content(), ENTERING_FAILED);
        assert!(update.messages[1]
            .content()
            .starts_with("Failed to parse search criteria. Error: "));
    }

    /// **Scenario**: A delegation call without `request` gets an error result and no model call.
    #[tokio::test]
    async fn missing_request_is_error_result() {
        let llm = Arc::new(MockLlm::new(Vec::new()));
        let agent = SearchCriteriaAgent::new(llm.clone());
        let state = delegated(json!({}), SearchCriteria::default());

        let (update, _) = agent.run(&state).await.unwrap();
        match &update.messages[0] {
            Message::Tool { tool_call_id, is_error, .. } => {
                assert_eq!(tool_call_id, "s1");
                assert!(*is_error);
            }
            other => panic!("expected tool result, got {:?}", other),
        }
        assert!(update.messages[1].content().contains("missing required argument"));
        assert!(llm.requests().is_empty());
    }
}
