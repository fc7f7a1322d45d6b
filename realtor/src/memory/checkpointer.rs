//! Checkpointer trait and CheckpointError.

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointMetadata};
use crate::memory::config::RunnableConfig;

/// Error type for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Checkpoints kept per thread by the bundled savers; older ones are pruned on `put`.
pub const DEFAULT_RETENTION: usize = 64;

/// Durable keyed checkpoint store: `put` is save, `get_latest` is load.
///
/// **Interaction**: Injected via `StateGraph::compile_with_checkpointer`; the compiled graph
/// writes after every step when the run config carries a `thread_id`.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Persist a checkpoint for the thread. Returns the checkpoint id.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError>;

    /// Most recent checkpoint of the thread, or `None` for an unknown thread.
    async fn get_latest(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<Checkpoint<S>>, CheckpointError>;

    /// Checkpoint summaries of the thread, newest first.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointMetadata>, CheckpointError>;
}

pub(crate) fn thread_id_required(config: &RunnableConfig) -> Result<&str, CheckpointError> {
    config
        .thread_id
        .as_deref()
        .ok_or(CheckpointError::ThreadIdRequired)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each CheckpointError variant contains expected keywords.
    #[test]
    fn checkpoint_error_display_all_variants() {
        assert!(CheckpointError::ThreadIdRequired.to_string().contains("thread"));
        assert!(CheckpointError::Serialization("err".into())
            .to_string()
            .contains("serialization"));
        assert!(CheckpointError::Storage("io".into()).to_string().contains("storage"));
        assert!(CheckpointError::NotFound("id".into()).to_string().contains("not found"));
    }

    #[test]
    fn thread_id_required_rejects_missing_id() {
        assert!(matches!(
            thread_id_required(&RunnableConfig::default()),
            Err(CheckpointError::ThreadIdRequired)
        ));
        assert_eq!(thread_id_required(&RunnableConfig::for_thread("t")).unwrap(), "t");
    }
}
