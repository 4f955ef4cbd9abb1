//! SQLite-based video index.
//!
//! Embeddings are stored as little-endian f32 blobs and cosine similarity is
//! computed in Rust. The index holds one row per video, so a full scan is
//! cheap.

use super::{cosine_similarity, SearchResult, VideoRecord, VideoStore};
use crate::error::{NimbusError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS videos (
        id TEXT PRIMARY KEY,
        uri TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_videos_indexed_at ON videos(indexed_at);
"#;

const SELECT_COLUMNS: &str = "SELECT id, uri, title, description, embedding, indexed_at FROM videos";

/// SQLite-based video store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite video index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| NimbusError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<VideoRecord> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(4)?;
        let indexed_at_str: String = row.get(5)?;

        Ok(VideoRecord {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            uri: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn load_all(conn: &Connection) -> Result<Vec<VideoRecord>> {
        let mut stmt = conn.prepare(SELECT_COLUMNS)?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

#[async_trait]
impl VideoStore for SqliteVectorStore {
    #[instrument(skip(self, record), fields(uri = %record.uri))]
    async fn upsert(&self, record: &VideoRecord) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO videos (id, uri, title, description, embedding, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(uri) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                embedding = excluded.embedding,
                indexed_at = excluded.indexed_at
            "#,
            params![
                record.id.to_string(),
                record.uri,
                record.title,
                record.description,
                Self::embedding_to_bytes(&record.embedding),
                record.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted video {}", record.uri);
        Ok(())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut results: Vec<SearchResult> = Self::load_all(&conn)?
            .into_iter()
            .map(|record| {
                let score = cosine_similarity(query_embedding, &record.embedding);
                SearchResult { record, score }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching videos", results.len());
        Ok(results)
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let conn = self.lock()?;
        let mut records = Self::load_all(&conn)?;
        records.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(records)
    }

    async fn delete_by_uri(&self, uri: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM videos WHERE uri = ?1", params![uri])?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uri: &str, embedding: Vec<f32>) -> VideoRecord {
        VideoRecord::new(
            uri.to_string(),
            format!("Video {}", uri),
            "Forecast for the week".to_string(),
            embedding,
        )
    }

    #[test]
    fn test_embedding_bytes_roundtrip() {
        let embedding = vec![0.25, -1.5, 3.0];
        let bytes = SqliteVectorStore::embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(SqliteVectorStore::bytes_to_embedding(&bytes), embedding);
    }

    #[tokio::test]
    async fn test_search_orders_by_score_and_applies_threshold() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.upsert(&record("gs://v/a.mp4", vec![1.0, 0.0, 0.0])).await.unwrap();
        store.upsert(&record("gs://v/b.mp4", vec![0.8, 0.6, 0.0])).await.unwrap();
        store.upsert(&record("gs://v/c.mp4", vec![0.0, 0.0, 1.0])).await.unwrap();

        let results = store
            .search_with_threshold(&[1.0, 0.0, 0.0], 10, 0.5)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.uri, "gs://v/a.mp4");
        assert_eq!(results[1].record.uri, "gs://v/b.mp4");

        let top = store
            .search_with_threshold(&[1.0, 0.0, 0.0], 1, 0.0)
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_uri() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.upsert(&record("gs://v/a.mp4", vec![1.0, 0.0])).await.unwrap();

        let mut updated = record("gs://v/a.mp4", vec![0.0, 1.0]);
        updated.description = "Updated description".to_string();
        store.upsert(&updated).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let records = store.list().await.unwrap();
        assert_eq!(records[0].description, "Updated description");
        assert_eq!(records[0].embedding, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_delete_by_uri() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.upsert(&record("gs://v/a.mp4", vec![1.0])).await.unwrap();

        assert!(store.delete_by_uri("gs://v/a.mp4").await.unwrap());
        assert!(!store.delete_by_uri("gs://v/a.mp4").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("videos.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store.upsert(&record("gs://v/a.mp4", vec![1.0, 0.0])).await.unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].uri, "gs://v/a.mp4");
    }
}
