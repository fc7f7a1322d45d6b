//! Per-run configuration: which conversation a run belongs to.

/// Identifies the checkpoint stream a run reads and writes.
///
/// Runs without `thread_id` are not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnableConfig {
    /// Conversation id.
    pub thread_id: Option<String>,
    /// Sub-namespace within a thread; empty by default.
    pub checkpoint_ns: String,
}

impl RunnableConfig {
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            checkpoint_ns: String::new(),
        }
    }
}
