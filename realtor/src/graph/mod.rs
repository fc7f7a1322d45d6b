//! State graph runtime: nodes, edges, conditional routing, interrupt-before gates and
//! per-step checkpoints.
//!
//! Build a [`StateGraph`], then `compile` or `compile_with_checkpointer` into a
//! [`CompiledStateGraph`]. Runs are strictly sequential: one node at a time, each returning a
//! delta that the runtime merges into the state via [`GraphState::apply`].

mod compile_error;
mod compiled;
mod conditional;
mod graph_state;
mod interrupt;
mod logging;
mod next;
mod node;
mod pass_through;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, GraphRun, RunStatus, StateSnapshot};
pub use conditional::{ConditionalRouter, ConditionalRouterFn};
pub use graph_state::GraphState;
pub use interrupt::{DefaultInterruptHandler, InterruptHandler, PendingInterrupt};
pub use next::Next;
pub use node::Node;
pub use pass_through::PassThroughNode;
pub use state_graph::{StateGraph, DEFAULT_RECURSION_LIMIT, END, START};
