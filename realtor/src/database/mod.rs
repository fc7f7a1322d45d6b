//! Property database: the listings the search flow queries.
//!
//! The orchestration core only needs [`PropertyDatabase::search`] over the current
//! [`SearchCriteria`]; `get` backs the `get_listing_details` tool.

mod memory;
mod sqlite;

pub use memory::{sample_listings, InMemoryPropertyDatabase};
pub use sqlite::SqlitePropertyDatabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::SearchCriteria;

/// One property for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub price: f64,
}

impl Listing {
    /// True when every set criterion holds. City and state compare case-insensitively;
    /// bounds are inclusive.
    pub fn matches(&self, c: &SearchCriteria) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref()
                .map_or(true, |w| w.trim().eq_ignore_ascii_case(have))
        }
        fn within<T: PartialOrd + Copy>(min: Option<T>, max: Option<T>, v: T) -> bool {
            min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
        }
        eq(&c.city, &self.city)
            && eq(&c.state, &self.state)
            && within(c.min_bedroom, c.max_bedroom, self.bedrooms)
            && within(c.min_bathroom, c.max_bathroom, self.bathrooms)
            && within(c.min_price, c.max_price, self.price)
    }

    /// One-line summary used in search results.
    pub fn summary(&self) -> String {
        format!(
            "{}: {}, {}, {} ({} bd / {} ba) ${}",
            self.id, self.address, self.city, self.state, self.bedrooms, self.bathrooms, self.price
        )
    }
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database storage: {0}")]
    Storage(String),
    #[error("listing not found: {0}")]
    NotFound(String),
}

/// Listing store queried by the search flow.
///
/// **Interaction**: `QueryDatabaseNode` calls `search`; `GetListingDetailsTool` calls `get`.
#[async_trait]
pub trait PropertyDatabase: Send + Sync {
    /// Listings matching every set field of `criteria`, ordered by price then id.
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Listing>, DatabaseError>;

    async fn get(&self, id: &str) -> Result<Listing, DatabaseError>;
}
