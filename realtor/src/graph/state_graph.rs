//! State graph: nodes + explicit edges (from → to) and optional conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using `START` and `END`
//! for entry/exit, and use `add_conditional_edges` to route on state. Nodes listed in
//! `with_interrupt_before` are gates: the compiled graph suspends right before them.
//!
//! # Conditional edges
//!
//! From a source node, a routing function `(state) -> key` is called; the key is used as the
//! next node id, or looked up in an optional path map. A node must have either one outgoing
//! `add_edge` or `add_conditional_edges`, not both.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use crate::graph::interrupt::{DefaultInterruptHandler, InterruptHandler};
use crate::graph::node::Node;
use crate::graph::GraphState;
use crate::memory::Checkpointer;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// Node executions allowed in one run before it fails with `RecursionLimit`.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// State graph builder, generic over the state type `S`.
pub struct StateGraph<S: GraphState> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Edges (from_id, to_id).
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    /// Gated nodes: the run halts and checkpoints before dispatching any of them.
    interrupt_before: HashSet<String>,
    interrupt_handler: Arc<dyn InterruptHandler<S>>,
    recursion_limit: usize,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            interrupt_before: HashSet::new(),
            interrupt_handler: Arc::new(DefaultInterruptHandler),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Marks nodes as gates. The compiled graph persists a checkpoint with a
    /// `PendingInterrupt` and returns before dispatching a gated node; only `resume` runs it.
    pub fn with_interrupt_before<I, T>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.interrupt_before
            .extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Sets the handler that describes what a suspended run awaits.
    pub fn with_interrupt_handler(mut self, handler: Arc<dyn InterruptHandler<S>>) -> Self {
        self.interrupt_handler = handler;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Adds a node; replaces an existing node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id` (`START` / `END` allowed).
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: after it runs, `path(state)` picks the next node.
    ///
    /// - Without `path_map`, the return value is the next node id (or END).
    /// - With `path_map`, the return value is the key; next node is `map[key]` if present,
    ///   otherwise the key itself. Map values are validated at compile time.
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer. Runs whose config carries a
    /// `thread_id` checkpoint after every node and at every interrupt.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(ref path_map) = router.path_map {
                for target in path_map.values() {
                    if target != END && !self.nodes.contains_key(target) {
                        return Err(CompilationError::InvalidConditionalPathMap(target.clone()));
                    }
                }
            }
        }
        if let Some(gate) = self
            .interrupt_before
            .iter()
            .find(|id| !self.nodes.contains_key(*id))
        {
            return Err(CompilationError::UnknownInterruptNode(gate.clone()));
        }

        let mut start_edges = self.edges.iter().filter(|(f, _)| f == START);
        let first = match (start_edges.next(), start_edges.next()) {
            (None, _) => return Err(CompilationError::MissingStart),
            (Some((_, to)), None) => to.clone(),
            (Some(_), Some(_)) => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START".into(),
                ))
            }
        };
        if first == END {
            return Err(CompilationError::InvalidChain("START leads directly to END".into()));
        }

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut next_map: HashMap<String, NextEntry<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f != START) {
            if next_map
                .insert(from.clone(), NextEntry::Unconditional(to.clone()))
                .is_some()
            {
                return Err(CompilationError::InvalidChain(format!(
                    "more than one edge from {}",
                    from
                )));
            }
        }
        for (source, router) in self.conditional_edges {
            if next_map.contains_key(&source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(source));
            }
            next_map.insert(source, NextEntry::Conditional(router));
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            next_map,
            interrupt_before: self.interrupt_before,
            interrupt_handler: self.interrupt_handler,
            checkpointer,
            recursion_limit: self.recursion_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::error::AgentError;
    use crate::graph::Next;

    #[derive(Clone, Debug, Default)]
    struct Counter(u32);

    impl GraphState for Counter {
        type Update = u32;
        fn apply(&mut self, update: u32) {
            self.0 += update;
        }
    }

    struct Inc(&'static str);

    #[async_trait]
    impl Node<Counter> for Inc {
        fn id(&self) -> &str {
            self.0
        }
        async fn run(&self, _state: &Counter) -> Result<(u32, Next), AgentError> {
            Ok((1, Next::Continue))
        }
    }

    fn two_nodes() -> StateGraph<Counter> {
        let mut graph = StateGraph::<Counter>::new();
        graph.add_node("a", Arc::new(Inc("a")));
        graph.add_node("b", Arc::new(Inc("b")));
        graph
    }

    /// **Scenario**: Compile fails when a node has both an outgoing edge and conditional edges.
    #[test]
    fn compile_fails_when_node_has_both_edge_and_conditional() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", END);
        graph.add_conditional_edges("a", Arc::new(|_| "b".to_string()), None);
        match graph.compile() {
            Err(CompilationError::NodeHasBothEdgeAndConditional(id)) => assert_eq!(id, "a"),
            Err(e) => panic!("expected NodeHasBothEdgeAndConditional(a), got {:?}", e),
            Ok(_) => panic!("expected compile error"),
        }
    }

    /// **Scenario**: Compile fails when conditional path_map references a non-existent node.
    #[test]
    fn compile_fails_when_conditional_path_map_has_invalid_target() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a");
        graph.add_conditional_edges(
            "a",
            Arc::new(|_| "x".to_string()),
            Some(
                [("x".to_string(), "nonexistent".to_string())]
                    .into_iter()
                    .collect(),
            ),
        );
        assert!(matches!(
            graph.compile(),
            Err(CompilationError::InvalidConditionalPathMap(id)) if id == "nonexistent"
        ));
    }

    /// **Scenario**: A gate on an unknown node is rejected.
    #[test]
    fn compile_fails_for_unknown_interrupt_node() {
        let mut graph = two_nodes().with_interrupt_before(["missing"]);
        graph.add_edge(START, "a");
        graph.add_edge("a", END);
        assert!(matches!(
            graph.compile(),
            Err(CompilationError::UnknownInterruptNode(id)) if id == "missing"
        ));
    }

    /// **Scenario**: Missing START edge and missing END are both reported.
    #[test]
    fn compile_requires_start_and_end() {
        let mut graph = two_nodes();
        graph.add_edge("a", "b");
        assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));

        let mut graph = two_nodes();
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");
        assert!(matches!(graph.compile(), Err(CompilationError::MissingEnd)));
    }

    /// **Scenario**: Two plain edges out of one node are a branch and rejected.
    #[test]
    fn compile_rejects_duplicate_from() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("a", END);
        graph.add_edge("b", END);
        assert!(matches!(graph.compile(), Err(CompilationError::InvalidChain(_))));
    }

    /// **Scenario**: Cycles are allowed when a conditional edge can exit.
    #[test]
    fn compile_accepts_loop_with_conditional_exit() {
        let mut graph = two_nodes().with_interrupt_before(["b"]);
        graph.add_edge(START, "a");
        graph.add_edge("b", "a");
        graph.add_conditional_edges(
            "a",
            Arc::new(|s: &Counter| if s.0 > 3 { END.to_string() } else { "b".to_string() }),
            None,
        );
        let compiled = graph.compile().unwrap();
        assert_eq!(compiled.first_node_id(), "a");
    }
}
