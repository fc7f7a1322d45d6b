//! In-process listing store.

use async_trait::async_trait;

use crate::database::{DatabaseError, Listing, PropertyDatabase};
use crate::state::SearchCriteria;

fn listing(id: &str, address: &str, city: &str, state: &str, bd: u32, ba: u32, price: f64) -> Listing {
    Listing {
        id: id.into(),
        address: address.into(),
        city: city.into(),
        state: state.into(),
        bedrooms: bd,
        bathrooms: ba,
        price,
    }
}

/// Demo inventory shipped with the CLI and used by tests.
pub fn sample_listings() -> Vec<Listing> {
    vec![
        listing("L-1001", "412 Barton Hills Dr", "Austin", "TX", 3, 2, 475_000.0),
        listing("L-1002", "88 Rainey St #1204", "Austin", "TX", 2, 2, 389_000.0),
        listing("L-1003", "1550 Mopac Blvd", "Austin", "TX", 4, 3, 720_000.0),
        listing("L-1004", "9 Cedar Bend", "Austin", "TX", 3, 3, 499_000.0),
        listing("L-2001", "301 Larimer St", "Denver", "CO", 2, 1, 410_000.0),
        listing("L-2002", "77 Cherry Creek Ln", "Denver", "CO", 4, 3, 865_000.0),
        listing("L-3001", "1200 Pine St", "Seattle", "WA", 3, 2, 925_000.0),
        listing("L-3002", "45 Ballard Ave", "Seattle", "WA", 1, 1, 540_000.0),
    ]
}

fn sort(listings: &mut [Listing]) {
    listings.sort_by(|a, b| a.price.total_cmp(&b.price).then_with(|| a.id.cmp(&b.id)));
}

/// Fixed listing set held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPropertyDatabase {
    listings: Vec<Listing>,
}

impl InMemoryPropertyDatabase {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Store holding [`sample_listings`].
    pub fn with_samples() -> Self {
        Self::new(sample_listings())
    }
}

#[async_trait]
impl PropertyDatabase for InMemoryPropertyDatabase {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Listing>, DatabaseError> {
        let mut hits: Vec<Listing> = self
            .listings
            .iter()
            .filter(|l| l.matches(criteria))
            .cloned()
            .collect();
        sort(&mut hits);
        Ok(hits)
    }

    async fn get(&self, id: &str) -> Result<Listing, DatabaseError> {
        self.listings
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Austin, TX, 3+ bedrooms, at most $500k yields the two matching homes,
    /// cheapest first.
    #[tokio::test]
    async fn austin_search() {
        let db = InMemoryPropertyDatabase::with_samples();
        let c = SearchCriteria {
            city: Some("Austin".into()),
            state: Some("TX".into()),
            min_bedroom: Some(3),
            max_price: Some(500_000.0),
            ..Default::default()
        };
        let ids: Vec<String> = db.search(&c).await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["L-1001", "L-1004"]);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let db = InMemoryPropertyDatabase::with_samples();
        assert_eq!(db.get("L-2001").await.unwrap().city, "Denver");
        assert!(matches!(db.get("L-9").await, Err(DatabaseError::NotFound(_))));
    }
}
