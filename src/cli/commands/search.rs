//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::rag::{SemanticRetriever, VideoRetriever};
use crate::vector_store::SqliteVectorStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    )?);
    let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
    let retriever =
        SemanticRetriever::new(store, embedder).with_min_score(settings.retrieval.min_score);

    let spinner = Output::spinner("Searching videos...");
    let found = retriever.relevant_video(question).await;
    spinner.finish_and_clear();

    match found {
        Ok(Some(video)) => {
            Output::header("Best match");
            Output::video_match(&video.title, &video.uri, video.score, &video.context);
        }
        Ok(None) => {
            Output::info(&format!(
                "No video scored above {:.2} for this question.",
                settings.retrieval.min_score
            ));
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
