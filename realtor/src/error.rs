//! Errors that end a graph run.
//!
//! Model-call failures, unknown tools and bad tool arguments never show up here: nodes turn
//! them into visible messages. What remains is storage failure, misuse of the resume API and
//! misconfigured graphs.

use thiserror::Error;

use crate::memory::CheckpointError;

/// Error returned by graph runs, nodes and the model-call boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A collaborator failed (e.g. model call, database). Nodes usually catch this.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The checkpoint store could not save or load; fatal for the turn.
    #[error("checkpoint store: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// A router or `Next::Node` named a node that is not in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A single run executed more nodes than the configured limit.
    #[error("recursion limit of {0} node executions reached")]
    RecursionLimit(usize),

    /// Resume was requested for a thread with no pending interrupt.
    #[error("nothing to resume for thread {0}")]
    NothingToResume(String),

    /// The caller passed a combination of inputs that has no meaning.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
