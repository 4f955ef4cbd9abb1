//! Semantic lookup of the video most relevant to a question.

use super::RelevantVideo;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::VideoStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Trait for finding the single most relevant video for a question.
#[async_trait]
pub trait VideoRetriever: Send + Sync {
    /// Return the best match, or `None` when nothing is relevant.
    async fn relevant_video(&self, question: &str) -> Result<Option<RelevantVideo>>;
}

/// Embedding-based retriever over a [`VideoStore`].
pub struct SemanticRetriever {
    store: Arc<dyn VideoStore>,
    embedder: Arc<dyn Embedder>,
    min_score: f32,
}

impl SemanticRetriever {
    pub fn new(store: Arc<dyn VideoStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            min_score: 0.3,
        }
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

#[async_trait]
impl VideoRetriever for SemanticRetriever {
    #[instrument(skip(self))]
    async fn relevant_video(&self, question: &str) -> Result<Option<RelevantVideo>> {
        if question.trim().is_empty() {
            return Ok(None);
        }

        let query_embedding = self.embedder.embed(question).await?;
        let best = self
            .store
            .search_with_threshold(&query_embedding, 1, self.min_score)
            .await?
            .into_iter()
            .next()
            .map(RelevantVideo::from);

        debug!("Relevant video: {:?}", best.as_ref().map(|v| &v.uri));
        Ok(best)
    }
}
