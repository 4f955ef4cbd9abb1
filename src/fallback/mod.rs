//! Weather API fallback.
//!
//! Used when the grounded answer is insufficient. The flow is:
//!
//! ```text
//! Start -> Extracting -> NoData                       (nothing extracted)
//!                     -> Resolving -> Fetching -> Synthesizing -> Done
//! ```
//!
//! Only the "nothing extracted" branch is recovered locally. Everything else
//! propagates unchanged: a call whose arguments are not strings, and any
//! resolution, fetch or synthesis failure. A caller can therefore tell "the
//! question had no city/date" apart from "the city is invalid".

mod extraction;
mod synthesis;

pub use extraction::{
    extract, validate_extraction, weather_tool, ExtractionResult, WeatherQuery, WEATHER_TOOL_NAME,
};
pub use synthesis::{synthesize, ToolExchange};

use crate::answer::Answer;
use crate::error::Result;
use crate::geocode::CoordinateResolver;
use crate::llm::GenerativeModel;
use crate::weather::WeatherProvider;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answers weather questions through the external weather API.
pub struct WeatherFallback {
    model: Arc<dyn GenerativeModel>,
    resolver: Arc<dyn CoordinateResolver>,
    weather: Arc<dyn WeatherProvider>,
}

impl WeatherFallback {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        resolver: Arc<dyn CoordinateResolver>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            model,
            resolver,
            weather,
        }
    }

    /// Run the fallback for one question.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        debug!("Extracting weather parameters");
        let (query, proposal) = match extract(self.model.as_ref(), question).await? {
            ExtractionResult::Empty => {
                info!("No city/date could be extracted, answering NO DATA");
                return Ok(Answer::NoData);
            }
            ExtractionResult::Structured { query, proposal } => (query, proposal),
        };

        debug!("Resolving coordinates for {}", query.city);
        let coordinate = self.resolver.resolve(&query.city).await?;

        debug!("Fetching weather for {}", query.date);
        let record = self.weather.historical(coordinate, &query.date).await?;

        debug!("Synthesizing answer");
        let exchange = ToolExchange::new(question, proposal, record)?;
        let text = synthesize(self.model.as_ref(), exchange).await?;

        Ok(Answer::Text(text))
    }
}
