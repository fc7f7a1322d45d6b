//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::graph::PendingInterrupt;
use crate::memory::checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSource};
use crate::memory::checkpointer::{
    thread_id_required, CheckpointError, Checkpointer, DEFAULT_RETENTION,
};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::Serializer;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn serialization(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Serialization(e.to_string())
}

/// Row shape shared by `get_latest` and `list`.
struct Row {
    id: String,
    step: i64,
    source: String,
    created_at: String,
    next: Option<String>,
    pending: Option<String>,
    payload: Option<Vec<u8>>,
}

impl Row {
    fn metadata(&self) -> Result<CheckpointMetadata, CheckpointError> {
        Ok(CheckpointMetadata {
            id: self.id.clone(),
            step: self.step as u64,
            source: CheckpointSource::parse(&self.source)
                .ok_or_else(|| serialization(format!("unknown source {}", self.source)))?,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .map_err(serialization)?
                .with_timezone(&Utc),
            next: self.next.clone(),
            interrupted: self.pending.is_some(),
        })
    }
}

/// SQLite-backed checkpointer. Key: (thread_id, checkpoint_ns), ordered by insertion.
///
/// Opens a connection per operation on a blocking thread; the state payload is encoded by
/// the injected [`Serializer`]. Each `put` prunes the thread down to the newest `retention`
/// rows.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` in `StateGraph::compile_with_checkpointer`.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
    retention: usize,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path).map_err(storage)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL,
                checkpoint_ns TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL UNIQUE,
                step INTEGER NOT NULL,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                next_node TEXT,
                pending TEXT,
                payload BLOB NOT NULL
            );
            CREATE INDEX IF NOT EXISTS checkpoints_thread
                ON checkpoints (thread_id, checkpoint_ns, seq);
            "#,
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            serializer,
            retention: DEFAULT_RETENTION,
        })
    }

    /// Keeps at most `keep` checkpoints per thread (at least one).
    pub fn with_retention(mut self, keep: usize) -> Self {
        self.retention = keep.max(1);
        self
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, CheckpointError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CheckpointError> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(storage)?;
            f(&conn)
        })
        .await
        .map_err(storage)?
    }

    fn read_row(row: &rusqlite::Row<'_>, with_payload: bool) -> rusqlite::Result<Row> {
        Ok(Row {
            id: row.get(0)?,
            step: row.get(1)?,
            source: row.get(2)?,
            created_at: row.get(3)?,
            next: row.get(4)?,
            pending: row.get(5)?,
            payload: if with_payload { Some(row.get(6)?) } else { None },
        })
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let thread_id = thread_id_required(config)?.to_string();
        let checkpoint_ns = config.checkpoint_ns.clone();
        let payload = self.serializer.serialize(&checkpoint.state)?;
        let pending = checkpoint
            .pending
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(serialization)?;
        let id = checkpoint.id.clone();
        let step = checkpoint.step as i64;
        let source = checkpoint.source.as_str();
        let created_at = checkpoint.created_at.to_rfc3339();
        let next = checkpoint.next.clone();
        let keep = self.retention as i64;

        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction().map_err(storage)?;
            tx.execute(
                r#"
                INSERT INTO checkpoints
                (thread_id, checkpoint_ns, checkpoint_id, step, source, created_at,
                 next_node, pending, payload)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    thread_id,
                    checkpoint_ns,
                    id,
                    step,
                    source,
                    created_at,
                    next,
                    pending,
                    payload
                ],
            )
            .map_err(storage)?;
            tx.execute(
                "DELETE FROM checkpoints
                 WHERE thread_id = ?1 AND checkpoint_ns = ?2 AND seq <= (
                     SELECT seq FROM checkpoints
                     WHERE thread_id = ?1 AND checkpoint_ns = ?2
                     ORDER BY seq DESC LIMIT 1 OFFSET ?3
                 )",
                params![thread_id, checkpoint_ns, keep],
            )
            .map_err(storage)?;
            tx.commit().map_err(storage)?;
            Ok(id)
        })
        .await
    }

    async fn get_latest(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let thread_id = thread_id_required(config)?.to_string();
        let checkpoint_ns = config.checkpoint_ns.clone();

        let row = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT checkpoint_id, step, source, created_at, next_node, pending, payload
                     FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2
                     ORDER BY seq DESC LIMIT 1",
                    params![thread_id, checkpoint_ns],
                    |r| Self::read_row(r, true),
                )
                .optional()
                .map_err(storage)
            })
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let meta = row.metadata()?;
        let payload = row
            .payload
            .ok_or_else(|| CheckpointError::NotFound(format!("payload of {}", row.id)))?;
        let pending: Option<PendingInterrupt> = row
            .pending
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(serialization)?;
        Ok(Some(Checkpoint {
            id: meta.id,
            step: meta.step,
            source: meta.source,
            created_at: meta.created_at,
            state: self.serializer.deserialize(&payload)?,
            next: meta.next,
            pending,
        }))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointMetadata>, CheckpointError> {
        let thread_id = thread_id_required(config)?.to_string();
        let checkpoint_ns = config.checkpoint_ns.clone();
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT checkpoint_id, step, source, created_at, next_node, pending
                         FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2
                         ORDER BY seq DESC LIMIT ?3",
                    )
                    .map_err(storage)?;
                let rows = stmt
                    .query_map(params![thread_id, checkpoint_ns, limit], |r| {
                        Self::read_row(r, false)
                    })
                    .map_err(storage)?
                    .collect::<rusqlite::Result<Vec<Row>>>()
                    .map_err(storage)?;
                Ok(rows)
            })
            .await?;

        rows.iter().map(Row::metadata).collect()
    }
}
