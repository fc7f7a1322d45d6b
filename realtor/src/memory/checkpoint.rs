//! Checkpoint: snapshot of a run after one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::PendingInterrupt;

/// Why a checkpoint was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointSource {
    /// Input applied before the first node of a run.
    Input,
    /// After a node's delta was merged.
    Loop,
    /// Run suspended before a gated node.
    Interrupt,
}

impl CheckpointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Loop => "loop",
            Self::Interrupt => "interrupt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "input" => Some(Self::Input),
            "loop" => Some(Self::Loop),
            "interrupt" => Some(Self::Interrupt),
            _ => None,
        }
    }
}

/// Snapshot of a thread after one step.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    /// Monotonic per thread.
    pub step: u64,
    pub source: CheckpointSource,
    pub created_at: DateTime<Utc>,
    pub state: S,
    /// Node to run next; `None` when the run reached END.
    pub next: Option<String>,
    /// Set when the run is suspended before a gated node.
    pub pending: Option<PendingInterrupt>,
}

impl<S> Checkpoint<S> {
    pub fn new(state: S, source: CheckpointSource, step: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            step,
            source,
            created_at: Utc::now(),
            state,
            next: None,
            pending: None,
        }
    }

    pub fn with_next(mut self, next: Option<String>) -> Self {
        self.next = next;
        self
    }

    pub fn with_pending(mut self, pending: Option<PendingInterrupt>) -> Self {
        self.pending = pending;
        self
    }

    pub fn metadata(&self) -> CheckpointMetadata {
        CheckpointMetadata {
            id: self.id.clone(),
            step: self.step,
            source: self.source,
            created_at: self.created_at,
            next: self.next.clone(),
            interrupted: self.pending.is_some(),
        }
    }
}

/// Checkpoint summary without the state, for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointMetadata {
    pub id: String,
    pub step: u64,
    pub source: CheckpointSource,
    pub created_at: DateTime<Utc>,
    pub next: Option<String>,
    pub interrupted: bool,
}
