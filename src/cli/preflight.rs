//! Pre-flight checks before model-backed operations.
//!
//! Reports missing configuration up front instead of failing on the first
//! model call.

use crate::error::{NimbusError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions needs the API key for generation and embeddings.
    Ask,
    /// Indexing needs the API key for embeddings.
    Index,
    /// Searching embeds the question, so it needs the API key too.
    Search,
    /// Listing only reads the local index.
    List,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Index | Operation::Search => check_api_key(),
        Operation::List => Ok(()),
    }
}

/// Check if the OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(NimbusError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(NimbusError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
