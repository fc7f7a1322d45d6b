//! Graph compilation error.

use thiserror::Error;

/// Returned by `StateGraph::compile*` when the wiring is inconsistent.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// An edge or conditional source names a node that was not added.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge from START, so there is no entry node.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Nothing can reach END.
    #[error("graph has no path to END")]
    MissingEnd,

    /// Edges branch where they must not (several edges from START or from one node).
    #[error("invalid edges: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a valid node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// An interrupt-before gate names a node that was not added.
    #[error("interrupt_before references unknown node: {0}")]
    UnknownInterruptNode(String),
}
