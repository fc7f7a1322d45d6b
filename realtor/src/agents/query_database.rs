//! Runs the stored search criteria against the property database.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::agents::NodeId;
use crate::database::{Listing, PropertyDatabase};
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::state::{ConversationState, ConversationUpdate};

/// Listings spelled out in the results message; the rest are only counted.
pub const MAX_LISTED: usize = 5;

pub struct QueryDatabaseNode {
    database: Arc<dyn PropertyDatabase>,
}

impl QueryDatabaseNode {
    pub fn new(database: Arc<dyn PropertyDatabase>) -> Self {
        Self { database }
    }
}

fn results_message(listings: &[Listing]) -> String {
    if listings.is_empty() {
        return "No listings match your current search criteria.".to_string();
    }
    let mut out = format!(
        "Found {} listing(s) matching your criteria:\n",
        listings.len()
    );
    for l in listings.iter().take(MAX_LISTED) {
        out.push_str(&format!("- {}\n", l.summary()));
    }
    if listings.len() > MAX_LISTED {
        out.push_str(&format!("...and {} more.\n", listings.len() - MAX_LISTED));
    }
    out
}

#[async_trait]
impl Node<ConversationState> for QueryDatabaseNode {
    fn id(&self) -> &str {
        NodeId::QueryDatabase.as_str()
    }

    async fn run(
        &self,
        state: &ConversationState,
    ) -> Result<(ConversationUpdate, Next), AgentError> {
        let text = match self.database.search(&state.search_criteria).await {
            Ok(listings) => {
                info!(matches = listings.len(), "listing search done");
                results_message(&listings)
            }
            Err(e) => {
                warn!(error = %e, "listing search failed");
                format!("Failed to query listings. Error: {}", e)
            }
        };
        Ok((
            ConversationUpdate::new().message(Message::assistant(text)),
            Next::Continue,
        ))
    }
}
