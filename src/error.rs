//! Error types for Nimbus.

use thiserror::Error;

/// Library-level error type for Nimbus operations.
#[derive(Error, Debug)]
pub enum NimbusError {
    /// The model reported that the city could not be resolved.
    #[error("Invalid city: {0}")]
    InvalidCity(String),

    /// A model response that should have been structured could not be parsed.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The weather data provider failed or answered with a non-success status.
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Model request error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl NimbusError {
    /// Stable tag for the failure cause, used in logs and HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            NimbusError::InvalidCity(_) => "invalid_city",
            NimbusError::MalformedResponse(_) => "malformed_response",
            NimbusError::ExternalService(_) => "external_service",
            NimbusError::OpenAI(_) => "openai",
            NimbusError::Llm(_) => "model_request",
            NimbusError::Config(_) => "config",
            NimbusError::Embedding(_) => "embedding",
            NimbusError::VectorStore(_) => "vector_store",
            NimbusError::InvalidInput(_) => "invalid_input",
            NimbusError::Io(_) => "io",
            NimbusError::Json(_) => "json",
            NimbusError::TomlParse(_) => "toml",
            NimbusError::Http(_) => "http",
            NimbusError::Database(_) => "database",
        }
    }
}

/// Result type alias for Nimbus operations.
pub type Result<T> = std::result::Result<T, NimbusError>;
