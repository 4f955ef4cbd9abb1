//! Resolving place names to coordinates.
//!
//! The resolver asks the generative model for the coordinates of a city and
//! validates its JSON reply. Free-form names such as "Istanbul, Turkey" or
//! "NYC" are passed through as written.

use crate::config::Prompts;
use crate::error::{NimbusError, Result};
use crate::llm::{GenerationRequest, GenerativeModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Trait for turning a place name into coordinates.
#[async_trait]
pub trait CoordinateResolver: Send + Sync {
    /// Resolve a city name (optionally with country) to a coordinate.
    ///
    /// Fails with [`NimbusError::InvalidCity`] when the place cannot be
    /// resolved and [`NimbusError::MalformedResponse`] when the backend reply
    /// cannot be understood. Neither is retried.
    async fn resolve(&self, city: &str) -> Result<Coordinate>;
}

/// Resolver backed by a generative model.
pub struct ModelCoordinateResolver {
    model: Arc<dyn GenerativeModel>,
    prompts: Prompts,
}

impl ModelCoordinateResolver {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl CoordinateResolver for ModelCoordinateResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, city: &str) -> Result<Coordinate> {
        if city.trim().is_empty() {
            return Err(NimbusError::InvalidCity("city name is empty".to_string()));
        }

        let mut vars = HashMap::new();
        vars.insert("city".to_string(), city.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.geocode.user, &vars);

        let response = self
            .model
            .generate(GenerationRequest::prompt(prompt).json())
            .await?;

        let text = response.text().ok_or_else(|| {
            NimbusError::MalformedResponse("geocoding reply contained no text".to_string())
        })?;

        let coordinate = parse_coordinates(text)?;
        debug!(
            "Resolved {} to ({}, {})",
            city, coordinate.latitude, coordinate.longitude
        );
        Ok(coordinate)
    }
}

/// Parse a geocoding reply of the form `{"latitude": .., "longitude": ..}` or `{"error": ..}`.
pub fn parse_coordinates(text: &str) -> Result<Coordinate> {
    let parsed: Value = serde_json::from_str(text.trim()).map_err(|e| {
        NimbusError::MalformedResponse(format!("geocoding reply is not JSON: {}", e))
    })?;

    if let Some(error) = parsed.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(NimbusError::InvalidCity(message));
    }

    let latitude = parsed.get("latitude").and_then(Value::as_f64);
    let longitude = parsed.get("longitude").and_then(Value::as_f64);

    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
        _ => Err(NimbusError::MalformedResponse(format!(
            "geocoding reply lacks numeric latitude/longitude: {}",
            parsed
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ResponseFormat;
    use crate::testing::ScriptedModel;

    #[test]
    fn test_parse_coordinates() {
        let coordinate = parse_coordinates(r#"{"latitude": 41.01, "longitude": 28.97}"#).unwrap();
        assert_eq!(coordinate, Coordinate::new(41.01, 28.97));
    }

    #[test]
    fn test_parse_error_key_is_invalid_city() {
        let err = parse_coordinates(r#"{"error": "city not found"}"#).unwrap_err();
        match err {
            NimbusError::InvalidCity(message) => assert_eq!(message, "city not found"),
            other => panic!("Expected InvalidCity, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_key_wins_over_coordinates() {
        let err =
            parse_coordinates(r#"{"error": "ambiguous", "latitude": 1.0, "longitude": 2.0}"#)
                .unwrap_err();
        assert!(matches!(err, NimbusError::InvalidCity(_)));
    }

    #[test]
    fn test_parse_malformed_replies() {
        for reply in [
            "not json at all",
            "```json\n{\"latitude\": 1.0, \"longitude\": 2.0}\n```",
            r#"{"latitude": 51.5}"#,
            r#"{"latitude": "51.5", "longitude": "-0.12"}"#,
            "[51.5, -0.12]",
        ] {
            let err = parse_coordinates(reply).unwrap_err();
            assert!(
                matches!(err, NimbusError::MalformedResponse(_)),
                "reply {:?} gave {:?}",
                reply,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_resolver_sends_json_prompt_with_city() {
        let model = Arc::new(ScriptedModel::with_texts(&[
            r#"{"latitude": 51.5, "longitude": -0.12}"#,
        ]));
        let resolver = ModelCoordinateResolver::new(model.clone());

        let coordinate = resolver.resolve("London, UK").await.unwrap();
        assert_eq!(coordinate, Coordinate::new(51.5, -0.12));

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].response_format, ResponseFormat::Json);
        assert!(requests[0].tools.is_empty());
        match &requests[0].turns[0] {
            crate::llm::Turn::User(prompt) => assert!(prompt.contains("London, UK")),
            other => panic!("Expected user prompt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolver_rejects_empty_city_without_model_call() {
        let model = Arc::new(ScriptedModel::with_texts(&[]));
        let resolver = ModelCoordinateResolver::new(model.clone());

        let err = resolver.resolve("  ").await.unwrap_err();
        assert!(matches!(err, NimbusError::InvalidCity(_)));
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_resolver_surfaces_invalid_city() {
        let model = Arc::new(ScriptedModel::with_texts(&[r#"{"error": "city not found"}"#]));
        let resolver = ModelCoordinateResolver::new(model);

        let err = resolver.resolve("Atlantis").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_city");
    }
}
