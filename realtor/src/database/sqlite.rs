//! SQLite-backed listing store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{DatabaseError, Listing, PropertyDatabase};
use crate::state::SearchCriteria;

fn storage(e: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Storage(e.to_string())
}

const SELECT: &str = "SELECT id, address, city, state, bedrooms, bathrooms, price FROM listings";

/// Listings in a SQLite file; one connection per operation on a blocking thread.
pub struct SqlitePropertyDatabase {
    db_path: PathBuf,
}

impl SqlitePropertyDatabase {
    /// Opens (or creates) the database and ensures the `listings` table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path).map_err(storage)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id TEXT PRIMARY KEY,
                address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                bedrooms INTEGER NOT NULL,
                bathrooms INTEGER NOT NULL,
                price REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS listings_location ON listings (state, city);
            "#,
        )
        .map_err(storage)?;
        Ok(Self { db_path })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = Connection::open(&db_path).map_err(storage)?;
            f(&mut conn)
        })
        .await
        .map_err(storage)?
    }

    /// Inserts or replaces listings in one transaction. Returns how many were written.
    pub async fn seed(&self, listings: Vec<Listing>) -> Result<usize, DatabaseError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(storage)?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT OR REPLACE INTO listings
                         (id, address, city, state, bedrooms, bathrooms, price)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    )
                    .map_err(storage)?;
                for l in &listings {
                    stmt.execute(params![
                        l.id,
                        l.address,
                        l.city,
                        l.state,
                        l.bedrooms,
                        l.bathrooms,
                        l.price
                    ])
                    .map_err(storage)?;
                }
            }
            tx.commit().map_err(storage)?;
            Ok(listings.len())
        })
        .await
    }

    pub async fn count(&self) -> Result<usize, DatabaseError> {
        self.with_conn(|conn| {
            let n: i64 = conn
                .query_row("SELECT COUNT(*) FROM listings", [], |r| r.get(0))
                .map_err(storage)?;
            Ok(n as usize)
        })
        .await
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Listing> {
        Ok(Listing {
            id: row.get(0)?,
            address: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
            bedrooms: row.get(4)?,
            bathrooms: row.get(5)?,
            price: row.get(6)?,
        })
    }
}

#[async_trait]
impl PropertyDatabase for SqlitePropertyDatabase {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Listing>, DatabaseError> {
        let c = criteria.clone();
        tracing::debug!(criteria = ?c, "listing search");
        self.with_conn(move |conn| {
            let sql = format!(
                "{} WHERE (?1 IS NULL OR city = ?1 COLLATE NOCASE)
                   AND (?2 IS NULL OR state = ?2 COLLATE NOCASE)
                   AND (?3 IS NULL OR bedrooms >= ?3) AND (?4 IS NULL OR bedrooms <= ?4)
                   AND (?5 IS NULL OR bathrooms >= ?5) AND (?6 IS NULL OR bathrooms <= ?6)
                   AND (?7 IS NULL OR price >= ?7) AND (?8 IS NULL OR price <= ?8)
                 ORDER BY price, id",
                SELECT
            );
            let mut stmt = conn.prepare(&sql).map_err(storage)?;
            let rows = stmt
                .query_map(
                    params![
                        c.city.as_deref().map(str::trim),
                        c.state.as_deref().map(str::trim),
                        c.min_bedroom,
                        c.max_bedroom,
                        c.min_bathroom,
                        c.max_bathroom,
                        c.min_price,
                        c.max_price
                    ],
                    Self::read_row,
                )
                .map_err(storage)?
                .collect::<rusqlite::Result<Vec<Listing>>>()
                .map_err(storage)?;
            Ok(rows)
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Listing, DatabaseError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(&format!("{} WHERE id = ?1", SELECT), params![id], Self::read_row)
                .optional()
                .map_err(storage)?
                .ok_or_else(|| DatabaseError::NotFound(id.clone()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{sample_listings, InMemoryPropertyDatabase};

    async fn seeded(dir: &tempfile::TempDir) -> SqlitePropertyDatabase {
        let db = SqlitePropertyDatabase::open(dir.path().join("listings.db")).unwrap();
        db.seed(sample_listings()).await.unwrap();
        db
    }

    /// **Scenario**: The SQL filter agrees with the in-memory filter for typical criteria.
    #[tokio::test]
    async fn sql_filter_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let sql = seeded(&dir).await;
        let mem = InMemoryPropertyDatabase::with_samples();
        let cases = vec![
            SearchCriteria::default(),
            SearchCriteria {
                city: Some("austin".into()),
                state: Some("TX".into()),
                min_bedroom: Some(3),
                max_price: Some(500_000.0),
                ..Default::default()
            },
            SearchCriteria {
                min_bathroom: Some(3),
                min_price: Some(700_000.0),
                ..Default::default()
            },
        ];
        for c in cases {
            assert_eq!(sql.search(&c).await.unwrap(), mem.search(&c).await.unwrap(), "{:?}", c);
        }
    }

    /// **Scenario**: Seeding twice replaces rows instead of duplicating them.
    #[tokio::test]
    async fn reseed_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded(&dir).await;
        db.seed(sample_listings()).await.unwrap();
        assert_eq!(db.count().await.unwrap(), sample_listings().len());
        assert_eq!(db.get("L-1003").await.unwrap().bedrooms, 4);
        assert!(matches!(db.get("L-0").await, Err(DatabaseError::NotFound(id)) if id == "L-0"));
    }
}
