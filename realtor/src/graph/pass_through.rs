//! Pass-through node: has a name, changes nothing.

use async_trait::async_trait;

use crate::error::AgentError;

use super::{GraphState, Next, Node};

/// Returns an empty delta and `Next::Continue`, so only its outgoing edge matters.
///
/// Used as a re-entry point (e.g. handing control from a specialized agent back to the main
/// agent).
pub struct PassThroughNode {
    name: String,
}

impl PassThroughNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<S> Node<S> for PassThroughNode
where
    S: GraphState,
{
    fn id(&self) -> &str {
        &self.name
    }

    async fn run(&self, _state: &S) -> Result<(S::Update, Next), AgentError> {
        Ok((S::Update::default(), Next::Continue))
    }
}
