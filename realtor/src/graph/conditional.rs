//! Conditional edges: route to the next node based on state.
//!
//! A source node has a routing function that takes the current state and returns a key; the
//! key is either used as the next node id or looked up in an optional path map.

use std::collections::HashMap;
use std::sync::Arc;

/// Router function: pure function of the state returning a routing key.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Routing function plus optional path map.
///
/// With a path map the next node is `map[key]` when present, otherwise the key itself.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S> {
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the state after the source node ran.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }
}

/// How the next node is chosen after a given node runs.
#[derive(Clone)]
pub(super) enum NextEntry<S> {
    /// Fixed edge; the node's `Next` is still respected.
    Unconditional(String),
    /// Router decides; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}
