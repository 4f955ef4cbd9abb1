//! Nimbus - weather question answering
//!
//! Answers natural-language weather questions. A question is first matched
//! against an index of weather videos and answered from the best match. When
//! that produces no answer, the question falls back to historical weather data:
//! a model extracts the city and date, the city is resolved to coordinates, the
//! Open-Meteo archive is queried, and the model phrases the final answer.
//!
//! # Architecture
//!
//! - `answer` - Answer type and the "NO DATA" sentinel
//! - `llm` - Generative model abstraction with tool calling
//! - `geocode` - City to coordinate resolution
//! - `weather` - Historical weather providers
//! - `fallback` - Extraction, resolution, retrieval and synthesis
//! - `embedding` / `vector_store` - Video index
//! - `rag` - Retrieval and grounded answering
//! - `pipeline` - RAG first, then the fallback
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use nimbus::config::Settings;
//! use nimbus::pipeline::WeatherPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = WeatherPipeline::from_settings(&settings)?;
//!
//!     let result = pipeline
//!         .answer("What was the weather in London on 2024-06-01?")
//!         .await?;
//!     println!("{}", result.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fallback;
pub mod geocode;
pub mod llm;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod vector_store;
pub mod weather;

#[cfg(test)]
mod testing;

pub use error::{NimbusError, Result};
