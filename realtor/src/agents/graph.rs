//! Realtor graph wiring.
//!
//! ```text
//! START -> main_agent --(route_main_agent)--> END
//!                                       \--> search_criteria_agent -> query_database -> main_agent
//!                                       \--> appointment_agent
//!                                       \--> main_agent_tools -> main_agent
//! appointment_agent --(route_appointment_agent)--> leave_specialized_agent -> main_agent
//!                                             \--> safe_appointment_tools -> appointment_agent
//!                                             \--> [gate] sensitive_appointment_tools -> appointment_agent
//! ```

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use crate::agents::{
    route_appointment_agent, route_main_agent, AppointmentAgent, MainAgent, NodeId,
    QueryDatabaseNode, SearchCriteriaAgent, ToolNode,
};
use crate::database::PropertyDatabase;
use crate::graph::{
    CompilationError, CompiledStateGraph, InterruptHandler, PassThroughNode, StateGraph,
    DEFAULT_RECURSION_LIMIT, START,
};
use crate::llm::LlmClient;
use crate::memory::Checkpointer;
use crate::state::ConversationState;
use crate::tools::{
    appointment_tools, delegation_specs, AppointmentBook, GetListingDetailsTool, ToolCatalog,
    ToolError, ToolRegistry, ToolSafety,
};

/// Collaborators the realtor graph is built from.
pub struct RealtorDeps {
    pub llm: Arc<dyn LlmClient>,
    pub database: Arc<dyn PropertyDatabase>,
    pub appointments: Arc<AppointmentBook>,
    /// Without a checkpointer, runs cannot be resumed after an interrupt.
    pub checkpointer: Option<Arc<dyn Checkpointer<ConversationState>>>,
    pub recursion_limit: usize,
}

impl RealtorDeps {
    /// Deps with a fresh appointment book, no checkpointer and the default recursion limit.
    pub fn new(llm: Arc<dyn LlmClient>, database: Arc<dyn PropertyDatabase>) -> Self {
        Self {
            llm,
            database,
            appointments: Arc::new(AppointmentBook::new()),
            checkpointer: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer<ConversationState>>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn with_appointments(mut self, appointments: Arc<AppointmentBook>) -> Self {
        self.appointments = appointments;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Tools(#[from] ToolError),
    #[error(transparent)]
    Compile(#[from] CompilationError),
}

/// Describes a suspension before `sensitive_appointment_tools`: the calls awaiting approval.
pub struct PendingSensitiveCalls;

impl InterruptHandler<ConversationState> for PendingSensitiveCalls {
    fn describe(&self, state: &ConversationState, node: &str) -> serde_json::Value {
        let calls: Vec<_> = state
            .unanswered_tool_calls()
            .into_iter()
            .map(|c| json!({ "id": c.id, "name": c.name, "arguments": c.arguments }))
            .collect();
        json!({ "node": node, "awaiting": "approval", "tool_calls": calls })
    }
}

/// Builds and compiles the realtor graph; `sensitive_appointment_tools` is gated.
pub fn build_realtor_graph(
    deps: RealtorDeps,
) -> Result<CompiledStateGraph<ConversationState>, BuildError> {
    let catalog = ToolCatalog::load()?;

    let main_tools = ToolRegistry::new().with(Arc::new(GetListingDetailsTool::new(
        &catalog,
        deps.database.clone(),
    )?));
    let mut main_specs = delegation_specs(&catalog)?;
    main_specs.extend(main_tools.specs());

    let appointment = appointment_tools(&catalog, deps.appointments.clone())?;
    let safe = appointment.subset(ToolSafety::Safe);

    let mut graph = StateGraph::<ConversationState>::new()
        .with_interrupt_before([NodeId::SensitiveAppointmentTools.as_str()])
        .with_interrupt_handler(Arc::new(PendingSensitiveCalls))
        .with_recursion_limit(deps.recursion_limit);

    graph
        .add_node(
            NodeId::MainAgent.as_str(),
            Arc::new(MainAgent::new(deps.llm.clone(), main_specs)),
        )
        .add_node(
            NodeId::MainAgentTools.as_str(),
            Arc::new(ToolNode::new(NodeId::MainAgentTools, main_tools)),
        )
        .add_node(
            NodeId::LeaveSpecializedAgent.as_str(),
            Arc::new(PassThroughNode::new(NodeId::LeaveSpecializedAgent.as_str())),
        )
        .add_node(
            NodeId::SearchCriteriaAgent.as_str(),
            Arc::new(SearchCriteriaAgent::new(deps.llm.clone())),
        )
        .add_node(
            NodeId::QueryDatabase.as_str(),
            Arc::new(QueryDatabaseNode::new(deps.database.clone())),
        )
        .add_node(
            NodeId::AppointmentAgent.as_str(),
            Arc::new(AppointmentAgent::new(deps.llm.clone(), appointment.specs())),
        )
        .add_node(
            NodeId::SafeAppointmentTools.as_str(),
            Arc::new(ToolNode::new(NodeId::SafeAppointmentTools, safe)),
        )
        .add_node(
            NodeId::SensitiveAppointmentTools.as_str(),
            Arc::new(ToolNode::new(
                NodeId::SensitiveAppointmentTools,
                appointment.clone(),
            )),
        );

    graph
        .add_edge(START, NodeId::MainAgent.as_str())
        .add_conditional_edges(
            NodeId::MainAgent.as_str(),
            Arc::new(|s: &ConversationState| route_main_agent(s).as_str().to_string()),
            None,
        )
        .add_edge(NodeId::MainAgentTools.as_str(), NodeId::MainAgent.as_str())
        .add_edge(
            NodeId::LeaveSpecializedAgent.as_str(),
            NodeId::MainAgent.as_str(),
        )
        .add_edge(
            NodeId::SearchCriteriaAgent.as_str(),
            NodeId::QueryDatabase.as_str(),
        )
        .add_edge(NodeId::QueryDatabase.as_str(), NodeId::MainAgent.as_str())
        .add_conditional_edges(
            NodeId::AppointmentAgent.as_str(),
            Arc::new(move |s: &ConversationState| {
                route_appointment_agent(s, &appointment).as_str().to_string()
            }),
            None,
        )
        .add_edge(
            NodeId::SafeAppointmentTools.as_str(),
            NodeId::AppointmentAgent.as_str(),
        )
        .add_edge(
            NodeId::SensitiveAppointmentTools.as_str(),
            NodeId::AppointmentAgent.as_str(),
        );

    let compiled = match deps.checkpointer {
        Some(cp) => graph.compile_with_checkpointer(cp)?,
        None => graph.compile()?,
    };
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::database::InMemoryPropertyDatabase;
    use crate::graph::RunStatus;
    use crate::llm::{MockLlm, MockReply};
    use crate::memory::{MemorySaver, RunnableConfig};
    use crate::message::{Message, ToolCall};

    fn deps(llm: Arc<MockLlm>) -> RealtorDeps {
        RealtorDeps::new(llm, Arc::new(InMemoryPropertyDatabase::with_samples()))
            .with_checkpointer(Arc::new(MemorySaver::<ConversationState>::new()))
    }

    fn user(text: &str) -> ConversationState {
        ConversationState {
            messages: vec![Message::user(text)],
            ..Default::default()
        }
    }

    /// **Scenario**: A plain answer visits only the main agent and completes.
    #[tokio::test]
    async fn direct_answer_ends_turn() {
        let llm = Arc::new(MockLlm::new(vec![MockReply::text("Hello!")]));
        let graph = build_realtor_graph(deps(llm)).unwrap();
        let run = graph
            .invoke(user("hi"), &RunnableConfig::for_thread("t"))
            .await
            .unwrap();
        assert_eq!(run.visited, vec!["main_agent"]);
        assert_eq!(run.status, RunStatus::Completed);
    }

    /// **Scenario**: The search flow runs criteria agent, database, then back to the main agent.
    #[tokio::test]
    async fn search_flow_path() {
        let llm = Arc::new(MockLlm::new(vec![
            MockReply::tool_call("d1", "to_search_criteria_agent", json!({"request": "Denver"})),
            MockReply::json(json!({"city": "Denver", "state": "CO"})),
            MockReply::text("Here are two homes in Denver."),
        ]));
        let graph = build_realtor_graph(deps(llm)).unwrap();
        let run = graph
            .invoke(user("homes in Denver"), &RunnableConfig::for_thread("t"))
            .await
            .unwrap();
        assert_eq!(
            run.visited,
            vec!["main_agent", "search_criteria_agent", "query_database", "main_agent"]
        );
        assert_eq!(run.state.search_criteria.city.as_deref(), Some("Denver"));
    }

    /// **Scenario**: A mixed safe/sensitive batch suspends before the sensitive node and the
    /// interrupt lists both calls.
    #[tokio::test]
    async fn mixed_batch_suspends_whole_batch() {
        let llm = Arc::new(MockLlm::new(vec![
            MockReply::tool_call("d1", "to_appointment_agent", json!({"request": "book L-1001"})),
            MockReply::tool_calls(vec![
                ToolCall::new(
                    "b1",
                    "book_appointment",
                    json!({"listing_id": "L-1001", "date": "2030-06-01", "time": "09:00"}),
                ),
                ToolCall::new("g1", "get_availability", json!({"date": "2030-06-01"})),
            ]),
        ]));
        let graph = build_realtor_graph(deps(llm)).unwrap();
        let run = graph
            .invoke(user("book L-1001"), &RunnableConfig::for_thread("t"))
            .await
            .unwrap();
        let pending = run.interrupt().unwrap();
        assert_eq!(pending.node, "sensitive_appointment_tools");
        assert_eq!(pending.value["tool_calls"].as_array().unwrap().len(), 2);
        assert!(!run.visited.contains(&"safe_appointment_tools".to_string()));
    }
}
