//! Retrieval-augmented answering: find the relevant weather video, then
//! answer from its content.

mod grounded;
mod retrieval;

pub use grounded::{GroundedAnswerer, ModelGroundedAnswerer};
pub use retrieval::{SemanticRetriever, VideoRetriever};

use crate::vector_store::SearchResult;

/// The video selected as grounding context for a question.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevantVideo {
    pub uri: String,
    pub title: String,
    /// Text the answer must be grounded in.
    pub context: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for RelevantVideo {
    fn from(result: SearchResult) -> Self {
        Self {
            uri: result.record.uri,
            title: result.record.title,
            context: result.record.description,
            score: result.score,
        }
    }
}
