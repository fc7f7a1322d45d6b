//! Structured tracing for graph execution.

use std::fmt::Debug;

use super::{Next, PendingInterrupt};
use crate::error::AgentError;

pub(super) fn log_graph_start(thread_id: Option<&str>, start: &str) {
    tracing::info!(thread_id, start, "Starting graph execution");
}

pub(super) fn log_node_start<S: Debug>(node_id: &str, state: &S) {
    tracing::debug!(node_id, "Starting node execution");
    tracing::trace!(node_id, state = ?state, "Node execution: state");
}

pub(super) fn log_node_complete(node_id: &str, next: &Next, resolved: Option<&str>) {
    tracing::debug!(node_id, ?next, next_node = resolved, "Node execution complete");
}

pub(super) fn log_interrupt(thread_id: Option<&str>, pending: &PendingInterrupt) {
    tracing::info!(
        thread_id,
        node = %pending.node,
        interrupt_id = %pending.id,
        "Graph interrupted before gated node"
    );
}

pub(super) fn log_graph_complete(thread_id: Option<&str>, steps: usize) {
    tracing::info!(thread_id, steps, "Graph execution complete");
}

pub(super) fn log_graph_error(node_id: &str, error: &AgentError) {
    tracing::error!(node_id, %error, "Graph execution error");
}
