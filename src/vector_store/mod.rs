//! Video index used for semantic retrieval.
//!
//! Each record describes one weather video (its URI plus the text used as
//! grounding context) together with the embedding of that text.

mod sqlite;

pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A video stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Location of the video, e.g. `gs://bucket/forecast.mp4`. Unique in the index.
    pub uri: String,
    pub title: String,
    /// Description or transcript of the video, used as grounding context.
    pub description: String,
    /// Embedding of title and description.
    pub embedding: Vec<f32>,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a new record.
    pub fn new(uri: String, title: String, description: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri,
            title,
            description,
            embedding,
            indexed_at: Utc::now(),
        }
    }

    /// Text that is embedded for this record.
    pub fn embedding_text(title: &str, description: &str) -> String {
        format!("{}\n\n{}", title, description)
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: VideoRecord,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for video index implementations.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Store a record, replacing any record with the same URI.
    async fn upsert(&self, record: &VideoRecord) -> Result<()>;

    /// Search with a minimum similarity threshold, best match first.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// List all records, most recently indexed first.
    async fn list(&self) -> Result<Vec<VideoRecord>>;

    /// Delete the record with the given URI. Returns whether one existed.
    async fn delete_by_uri(&self, uri: &str) -> Result<bool>;

    /// Get total record count.
    async fn count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
