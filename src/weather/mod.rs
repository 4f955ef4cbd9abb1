//! Historical weather lookup.
//!
//! The provider returns the raw payload for a single day at a coordinate.
//! The payload is passed through untouched; interpreting it is left to the
//! model that writes the final answer.

mod open_meteo;

pub use open_meteo::OpenMeteoArchive;

use crate::error::Result;
use crate::geocode::Coordinate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque weather payload for one (coordinate, date) key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherRecord(pub Value);

impl WeatherRecord {
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Trait for historical weather sources.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the weather for exactly one day (`YYYY-MM-DD`) at a coordinate.
    ///
    /// Network failures and non-success responses surface as
    /// [`crate::NimbusError::ExternalService`]; nothing is retried.
    async fn historical(&self, coordinate: Coordinate, date: &str) -> Result<WeatherRecord>;
}
