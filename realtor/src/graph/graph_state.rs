//! State contract for graph runs: a canonical record plus the delta type nodes return.

use std::fmt::Debug;

/// State threaded through a graph.
///
/// Nodes never write the state directly; they return an [`Update`](GraphState::Update) and the
/// runtime calls [`apply`](GraphState::apply) after each node. The default update must be a
/// no-op so pass-through nodes can return it.
pub trait GraphState: Clone + Send + Sync + Debug + 'static {
    type Update: Default + Send + Debug + 'static;

    /// Merges one node's delta into the canonical record.
    fn apply(&mut self, update: Self::Update);
}
