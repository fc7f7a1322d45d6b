//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;

use crate::error::AgentError;

use super::{GraphState, Next};

/// One step in a graph: reads the state, returns a delta and the routing hint.
///
/// Nodes get the state by reference and may not assume it is unchanged since their last
/// invocation; other nodes run in between.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: GraphState,
{
    /// Node id (e.g. `"main_agent"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// Runs the step. Errors end the run; recoverable failures should be returned as part of
    /// the delta instead.
    async fn run(&self, state: &S) -> Result<(S::Update, Next), AgentError>;
}
