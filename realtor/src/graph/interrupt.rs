//! Interrupt-before gates: a run halts before a gated node and persists what it awaits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A suspended run, stored in the checkpoint taken right before the gated node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInterrupt {
    pub id: String,
    /// The gated node that runs first on resume.
    pub node: String,
    /// What the run is waiting on, as described by the graph's [`InterruptHandler`].
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl PendingInterrupt {
    pub fn new(node: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            node: node.into(),
            value,
            created_at: Utc::now(),
        }
    }
}

/// Describes a pending interrupt for the caller (e.g. which actions need approval).
pub trait InterruptHandler<S>: Send + Sync {
    fn describe(&self, state: &S, node: &str) -> serde_json::Value;
}

/// Records only the gated node id.
pub struct DefaultInterruptHandler;

impl<S> InterruptHandler<S> for DefaultInterruptHandler {
    fn describe(&self, _state: &S, node: &str) -> serde_json::Value {
        serde_json::json!({ "node": node })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handler_names_node() {
        let v = DefaultInterruptHandler.describe(&(), "sensitive_tools");
        assert_eq!(v["node"], "sensitive_tools");
    }

    #[test]
    fn pending_interrupts_get_distinct_ids() {
        let a = PendingInterrupt::new("n", serde_json::Value::Null);
        let b = PendingInterrupt::new("n", serde_json::Value::Null);
        assert_ne!(a.id, b.id);
    }
}
