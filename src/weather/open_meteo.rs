//! Open-Meteo historical archive client.

use super::{WeatherProvider, WeatherRecord};
use crate::config::WeatherSettings;
use crate::error::{NimbusError, Result};
use crate::geocode::Coordinate;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Client for the Open-Meteo archive API.
pub struct OpenMeteoArchive {
    client: Client,
    base_url: Url,
    daily: Vec<String>,
}

impl OpenMeteoArchive {
    /// Create a client from settings.
    pub fn new(settings: &WeatherSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.archive_url).map_err(|e| {
            NimbusError::Config(format!(
                "Invalid weather archive URL {}: {}",
                settings.archive_url, e
            ))
        })?;

        if settings.daily.is_empty() {
            return Err(NimbusError::Config(
                "weather.daily must list at least one variable".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| NimbusError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            daily: settings.daily.clone(),
        })
    }

    /// Query parameters for a single-day lookup.
    fn query(&self, coordinate: Coordinate, date: &str) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("start_date", date.to_string()),
            ("end_date", date.to_string()),
            ("daily", self.daily.join(",")),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoArchive {
    #[instrument(skip(self))]
    async fn historical(&self, coordinate: Coordinate, date: &str) -> Result<WeatherRecord> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&self.query(coordinate, date))
            .send()
            .await
            .map_err(|e| NimbusError::ExternalService(format!("weather request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NimbusError::ExternalService(format!(
                "weather API returned {}: {}",
                status, body
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            NimbusError::ExternalService(format!("weather API returned invalid JSON: {}", e))
        })?;

        debug!("Fetched weather for {} at ({}, {})", date, coordinate.latitude, coordinate.longitude);
        Ok(WeatherRecord(payload))
    }
}
