//! In-memory checkpointer (MemorySaver). Not persistent; for tests and single-process use.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::memory::checkpoint::{Checkpoint, CheckpointMetadata};
use crate::memory::checkpointer::{
    thread_id_required, CheckpointError, Checkpointer, DEFAULT_RETENTION,
};
use crate::memory::config::RunnableConfig;

/// Key: `"{thread_id}:{checkpoint_ns}"`; each thread keeps its checkpoints oldest first.
///
/// Threads are independent map entries, so concurrent conversations never contend on a
/// shared lock. Only the newest `retention` checkpoints of a thread are kept.
pub struct MemorySaver<S> {
    by_thread: DashMap<String, Vec<Checkpoint<S>>>,
    retention: usize,
}

impl<S> MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            by_thread: DashMap::new(),
            retention: DEFAULT_RETENTION,
        }
    }

    /// Keeps at most `keep` checkpoints per thread (at least one).
    pub fn with_retention(mut self, keep: usize) -> Self {
        self.retention = keep.max(1);
        self
    }

    fn thread_key(config: &RunnableConfig) -> Result<String, CheckpointError> {
        let thread_id = thread_id_required(config)?;
        Ok(format!("{}:{}", thread_id, config.checkpoint_ns))
    }
}

impl<S> Default for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let key = Self::thread_key(config)?;
        let mut list = self.by_thread.entry(key).or_default();
        list.push(checkpoint.clone());
        let excess = list.len().saturating_sub(self.retention);
        list.drain(..excess);
        Ok(checkpoint.id.clone())
    }

    async fn get_latest(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let key = Self::thread_key(config)?;
        Ok(self
            .by_thread
            .get(&key)
            .and_then(|list| list.last().cloned()))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointMetadata>, CheckpointError> {
        let key = Self::thread_key(config)?;
        let Some(list) = self.by_thread.get(&key) else {
            return Ok(Vec::new());
        };
        Ok(list
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .map(Checkpoint::metadata)
            .collect())
    }
}
