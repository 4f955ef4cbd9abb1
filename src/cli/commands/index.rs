//! Index and remove command implementations.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{NimbusError, Result as NimbusResult};
use crate::vector_store::{SqliteVectorStore, VideoRecord, VideoStore};
use anyhow::Result;
use tracing::info;

/// Embed a video's text and store it, replacing any record with the same URI.
pub(crate) async fn index_video(
    store: &dyn VideoStore,
    embedder: &dyn Embedder,
    uri: &str,
    title: &str,
    description: &str,
) -> NimbusResult<VideoRecord> {
    if uri.trim().is_empty() {
        return Err(NimbusError::InvalidInput("video URI is empty".to_string()));
    }
    if description.trim().is_empty() {
        return Err(NimbusError::InvalidInput(
            "video description is empty".to_string(),
        ));
    }

    let embedding = embedder
        .embed(&VideoRecord::embedding_text(title, description))
        .await?;
    let record = VideoRecord::new(
        uri.to_string(),
        title.to_string(),
        description.to_string(),
        embedding,
    );
    store.upsert(&record).await?;

    info!("Indexed video {}", record.uri);
    Ok(record)
}

/// Run the index command.
pub async fn run_index(uri: &str, title: &str, description: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let embedder = OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    )?;
    let store = SqliteVectorStore::new(&settings.sqlite_path())?;

    let spinner = Output::spinner("Embedding video description...");
    let indexed = index_video(&store, &embedder, uri, title, description).await;
    spinner.finish_and_clear();

    match indexed {
        Ok(record) => {
            Output::success(&format!("Indexed '{}'", record.title));
            Output::kv("URI", &record.uri);
            Output::kv("Videos in index", &store.count().await?.to_string());
        }
        Err(e) => {
            Output::error(&format!("Failed to index video: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Run the remove command.
pub async fn run_remove(uri: &str, settings: Settings) -> Result<()> {
    let store = SqliteVectorStore::new(&settings.sqlite_path())?;

    if store.delete_by_uri(uri).await? {
        Output::success(&format!("Removed {}", uri));
    } else {
        Output::warning(&format!("No indexed video with URI {}", uri));
    }

    Ok(())
}
