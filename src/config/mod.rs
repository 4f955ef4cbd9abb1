//! Configuration module for Nimbus.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GeocodePrompts, Prompts, RagPrompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, ModelSettings, PromptSettings, RetrievalSettings,
    ServerSettings, Settings, VectorStoreSettings, WeatherSettings,
};
