//! Compiled state graph: immutable, runnable graph with interrupt gates and per-step
//! checkpoints.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::AgentError;
use crate::graph::conditional::NextEntry;
use crate::graph::interrupt::{InterruptHandler, PendingInterrupt};
use crate::graph::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_interrupt, log_node_complete,
    log_node_start,
};
use crate::graph::{GraphState, Next, Node, END};
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Reached END; the conversation waits for new input.
    Completed,
    /// Halted before a gated node; call `resume` to run it.
    Interrupted(PendingInterrupt),
}

/// Result of one run: final state, how it ended, and the nodes executed in order.
#[derive(Debug, Clone)]
pub struct GraphRun<S> {
    pub state: S,
    pub status: RunStatus,
    pub visited: Vec<String>,
}

impl<S> GraphRun<S> {
    pub fn interrupt(&self) -> Option<&PendingInterrupt> {
        match &self.status {
            RunStatus::Interrupted(p) => Some(p),
            RunStatus::Completed => None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt().is_some()
    }
}

/// Latest persisted view of a thread.
#[derive(Debug, Clone)]
pub struct StateSnapshot<S> {
    pub state: S,
    pub next: Option<String>,
    pub pending: Option<PendingInterrupt>,
    pub step: u64,
    pub checkpoint_id: String,
}

/// Compiled graph: immutable structure, runnable with `invoke`, `run_from` and `resume`.
///
/// Execution is strictly sequential. Before dispatching a gated node the run persists a
/// checkpoint carrying a [`PendingInterrupt`] and returns; after every node the delta is
/// merged and a checkpoint is written. Checkpoints are only written when a checkpointer was
/// compiled in and the config carries a `thread_id`; store failures end the run.
pub struct CompiledStateGraph<S: GraphState> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) first_node_id: String,
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) interrupt_before: HashSet<String>,
    pub(super) interrupt_handler: Arc<dyn InterruptHandler<S>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) recursion_limit: usize,
}

impl<S: GraphState> CompiledStateGraph<S> {
    /// Entry node (target of the START edge).
    pub fn first_node_id(&self) -> &str {
        &self.first_node_id
    }

    /// True when runs halt before `node_id` until resumed.
    pub fn is_gated(&self, node_id: &str) -> bool {
        self.interrupt_before.contains(node_id)
    }

    /// Runs from the entry node. The input state is checkpointed first.
    pub async fn invoke(&self, state: S, config: &RunnableConfig) -> Result<GraphRun<S>, AgentError> {
        let start = self.first_node_id.clone();
        self.run_from(state, &start, config).await
    }

    /// Runs from `node_id` (gates apply). The input state is checkpointed first.
    pub async fn run_from(
        &self,
        state: S,
        node_id: &str,
        config: &RunnableConfig,
    ) -> Result<GraphRun<S>, AgentError> {
        if !self.nodes.contains_key(node_id) {
            return Err(AgentError::NodeNotFound(node_id.to_string()));
        }
        let mut step = self.latest_step(config).await?;
        step += 1;
        self.save(
            config,
            Checkpoint::new(state.clone(), CheckpointSource::Input, step)
                .with_next(Some(node_id.to_string())),
        )
        .await?;
        self.run_loop(state, node_id.to_string(), config, false, step)
            .await
    }

    /// Continues a suspended thread: the gated node from its pending interrupt runs first,
    /// with its gate cleared for that one dispatch.
    pub async fn resume(&self, config: &RunnableConfig) -> Result<GraphRun<S>, AgentError> {
        let thread = config.thread_id.clone().unwrap_or_default();
        let checkpointer = self
            .checkpointer
            .as_ref()
            .ok_or_else(|| AgentError::NothingToResume(thread.clone()))?;
        let checkpoint = checkpointer
            .get_latest(config)
            .await?
            .ok_or_else(|| AgentError::NothingToResume(thread.clone()))?;
        let pending = checkpoint
            .pending
            .ok_or_else(|| AgentError::NothingToResume(thread.clone()))?;
        tracing::info!(
            thread_id = %thread,
            node = %pending.node,
            interrupt_id = %pending.id,
            "Resuming interrupted run"
        );
        self.run_loop(checkpoint.state, pending.node, config, true, checkpoint.step)
            .await
    }

    /// Latest checkpoint of the thread, if any.
    pub async fn get_state(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<StateSnapshot<S>>, AgentError> {
        let Some(checkpointer) = &self.checkpointer else {
            return Ok(None);
        };
        if config.thread_id.is_none() {
            return Ok(None);
        }
        Ok(checkpointer.get_latest(config).await?.map(|cp| StateSnapshot {
            state: cp.state,
            next: cp.next,
            pending: cp.pending,
            step: cp.step,
            checkpoint_id: cp.id,
        }))
    }

    async fn latest_step(&self, config: &RunnableConfig) -> Result<u64, AgentError> {
        match (&self.checkpointer, &config.thread_id) {
            (Some(cp), Some(_)) => Ok(cp.get_latest(config).await?.map_or(0, |c| c.step)),
            _ => Ok(0),
        }
    }

    async fn save(&self, config: &RunnableConfig, checkpoint: Checkpoint<S>) -> Result<(), AgentError> {
        if let (Some(cp), Some(_)) = (&self.checkpointer, &config.thread_id) {
            cp.put(config, &checkpoint).await?;
        }
        Ok(())
    }

    /// Next node after `current` ran; `None` means END.
    fn resolve_next(&self, current: &str, next: &Next, state: &S) -> Option<String> {
        let id = match self.next_map.get(current) {
            Some(NextEntry::Conditional(router)) => router.resolve_next(state),
            entry => match next {
                Next::End => END.to_string(),
                Next::Node(id) => id.clone(),
                Next::Continue => match entry {
                    Some(NextEntry::Unconditional(to)) => to.clone(),
                    _ => END.to_string(),
                },
            },
        };
        (id != END).then_some(id)
    }

    async fn run_loop(
        &self,
        mut state: S,
        start: String,
        config: &RunnableConfig,
        mut gate_cleared: bool,
        mut step: u64,
    ) -> Result<GraphRun<S>, AgentError> {
        let thread_id = config.thread_id.as_deref();
        log_graph_start(thread_id, &start);
        let mut current = start;
        let mut visited = Vec::new();

        loop {
            if self.is_gated(&current) && !gate_cleared {
                let pending =
                    PendingInterrupt::new(current.clone(), self.interrupt_handler.describe(&state, &current));
                step += 1;
                self.save(
                    config,
                    Checkpoint::new(state.clone(), CheckpointSource::Interrupt, step)
                        .with_next(Some(current.clone()))
                        .with_pending(Some(pending.clone())),
                )
                .await?;
                log_interrupt(thread_id, &pending);
                return Ok(GraphRun {
                    state,
                    status: RunStatus::Interrupted(pending),
                    visited,
                });
            }
            gate_cleared = false;

            if visited.len() >= self.recursion_limit {
                let err = AgentError::RecursionLimit(self.recursion_limit);
                log_graph_error(&current, &err);
                return Err(err);
            }
            let node = self
                .nodes
                .get(&current)
                .cloned()
                .ok_or_else(|| AgentError::NodeNotFound(current.clone()))?;

            log_node_start(&current, &state);
            let (update, next) = match node.run(&state).await {
                Ok(out) => out,
                Err(e) => {
                    log_graph_error(&current, &e);
                    return Err(e);
                }
            };
            state.apply(update);
            visited.push(current.clone());

            let next_id = self.resolve_next(&current, &next, &state);
            log_node_complete(&current, &next, next_id.as_deref());
            step += 1;
            self.save(
                config,
                Checkpoint::new(state.clone(), CheckpointSource::Loop, step).with_next(next_id.clone()),
            )
            .await?;

            match next_id {
                Some(id) => current = id,
                None => break,
            }
        }

        log_graph_complete(thread_id, visited.len());
        Ok(GraphRun {
            state,
            status: RunStatus::Completed,
            visited,
        })
    }
}
