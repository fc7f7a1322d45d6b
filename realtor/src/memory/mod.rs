//! Checkpoint persistence for graph runs.
//!
//! A [`Checkpointer`] stores one [`Checkpoint`] per graph step, keyed by thread id (the
//! conversation id) and namespace. The latest checkpoint of a thread is enough to continue a
//! suspended run: it carries the state, the next node and any [`PendingInterrupt`].
//!
//! - [`MemorySaver`]: in-process, for tests and single-process use.
//! - [`SqliteSaver`]: durable, survives restarts; state encoded through a [`Serializer`].
//!
//! [`PendingInterrupt`]: crate::graph::PendingInterrupt

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;
mod sqlite_saver;

pub use checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer, DEFAULT_RETENTION};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use sqlite_saver::SqliteSaver;
