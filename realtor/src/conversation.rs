//! Conversation entry point: one call per user turn.
//!
//! A turn carries an optional user message and an optional approval flag, keyed by thread
//! id. State lives in the graph's checkpointer between turns; a turn suspended at the
//! sensitive-tools gate is continued by approving it or by sending a message, which denies
//! the pending calls. Turns on the same thread id are serialized; distinct threads run
//! independently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use crate::agents::{build_realtor_graph, BuildError, NodeId, RealtorDeps};
use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, GraphRun, PendingInterrupt};
use crate::memory::{MemorySaver, RunnableConfig};
use crate::message::Message;
use crate::state::{ConversationState, SearchCriteria};

/// What one turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Messages appended during this turn, oldest first.
    pub messages: Vec<Message>,
    /// True when the turn stopped at the approval gate.
    pub suspended: bool,
    /// The interrupt awaiting approval, when suspended.
    pub pending: Option<PendingInterrupt>,
    pub search_criteria: SearchCriteria,
    /// Nodes executed this turn, in order.
    pub visited: Vec<String>,
}

impl TurnOutcome {
    /// Last assistant message with text, for display.
    pub fn reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| matches!(m, Message::Assistant { .. }) && !m.content().is_empty())
            .map(Message::content)
    }
}

/// Text of the error result given to a sensitive call the user declined.
pub fn denial_text(reason: &str) -> String {
    format!(
        "API call denied by user. Reasoning: '{}'. Continue assisting, accounting for the user's input.",
        reason
    )
}

pub struct Conversation {
    graph: CompiledStateGraph<ConversationState>,
    /// One lock per thread id, held for a whole turn.
    turns: DashMap<String, Arc<Mutex<()>>>,
}

impl Conversation {
    /// Builds the realtor graph. Without a checkpointer in `deps`, an in-process
    /// [`MemorySaver`] keeps threads for the lifetime of this value.
    pub fn new(mut deps: RealtorDeps) -> Result<Self, BuildError> {
        if deps.checkpointer.is_none() {
            deps.checkpointer = Some(Arc::new(MemorySaver::<ConversationState>::new()));
        }
        Ok(Self {
            graph: build_realtor_graph(deps)?,
            turns: DashMap::new(),
        })
    }

    /// Runs one turn of `thread_id`.
    ///
    /// | message | approve | pending | effect |
    /// |---------|---------|---------|--------|
    /// | -       | yes     | yes     | run the gated node, continue |
    /// | -       | yes     | no      | `NothingToResume` |
    /// | some    | yes     | any     | `InvalidInput` |
    /// | some    | no      | yes     | deny pending calls, continue at `appointment_agent` |
    /// | some    | no      | no      | append message, run from `main_agent` |
    /// | -       | no      | any     | nothing runs |
    ///
    /// A second turn on the same thread waits until the first one has finished, so each turn
    /// starts from the state the previous one left. A checkpoint-store failure ends the turn
    /// with `AgentError::Checkpoint`.
    pub async fn turn(
        &self,
        thread_id: &str,
        user_message: Option<String>,
        approve: bool,
    ) -> Result<TurnOutcome, AgentError> {
        let lock = self
            .turns
            .entry(thread_id.to_string())
            .or_default()
            .clone();
        let _turn = lock.lock().await;

        let config = RunnableConfig::for_thread(thread_id);
        let snapshot = self.graph.get_state(&config).await?;
        let pending = snapshot.as_ref().and_then(|s| s.pending.clone());
        let mut state = snapshot.map(|s| s.state).unwrap_or_default();
        let before = state.messages.len();
        let message = user_message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        info!(
            thread_id = %thread_id,
            has_message = message.is_some(),
            approve,
            pending = pending.is_some(),
            "conversation turn"
        );

        let run = match (message, approve, pending) {
            (Some(_), true, _) => {
                return Err(AgentError::InvalidInput(
                    "a turn either approves the pending action or sends a message, not both"
                        .to_string(),
                ))
            }
            (None, true, None) => return Err(AgentError::NothingToResume(thread_id.to_string())),
            (None, true, Some(_)) => self.graph.resume(&config).await?,
            (Some(reason), false, Some(p)) => {
                info!(thread_id = %thread_id, interrupt_id = %p.id, "pending calls denied");
                let denials: Vec<Message> = state
                    .unanswered_tool_calls()
                    .into_iter()
                    .map(|c| Message::tool_error(c, denial_text(&reason)))
                    .collect();
                state.messages.extend(denials);
                self.graph
                    .run_from(state, NodeId::AppointmentAgent.as_str(), &config)
                    .await?
            }
            (Some(text), false, None) => {
                state.messages.push(Message::user(text));
                self.graph.invoke(state, &config).await?
            }
            (None, false, pending) => {
                return Ok(TurnOutcome {
                    messages: Vec::new(),
                    suspended: pending.is_some(),
                    pending,
                    search_criteria: state.search_criteria,
                    visited: Vec::new(),
                })
            }
        };
        Ok(Self::outcome(run, before))
    }

    fn outcome(run: GraphRun<ConversationState>, before: usize) -> TurnOutcome {
        let pending = run.interrupt().cloned();
        TurnOutcome {
            messages: run.state.messages.get(before..).unwrap_or_default().to_vec(),
            suspended: pending.is_some(),
            pending,
            search_criteria: run.state.search_criteria,
            visited: run.visited,
        }
    }

    /// Full stored message history of the thread (empty for an unknown thread).
    pub async fn history(&self, thread_id: &str) -> Result<Vec<Message>, AgentError> {
        let config = RunnableConfig::for_thread(thread_id);
        Ok(self
            .graph
            .get_state(&config)
            .await?
            .map(|s| s.state.messages)
            .unwrap_or_default())
    }

    /// The interrupt the thread is suspended on, if any.
    pub async fn pending(&self, thread_id: &str) -> Result<Option<PendingInterrupt>, AgentError> {
        let config = RunnableConfig::for_thread(thread_id);
        Ok(self.graph.get_state(&config).await?.and_then(|s| s.pending))
    }
}
