//! Scripted collaborators for unit tests.

use crate::answer::Answer;
use crate::embedding::Embedder;
use crate::error::{NimbusError, Result};
use crate::fallback::WEATHER_TOOL_NAME;
use crate::geocode::{Coordinate, CoordinateResolver};
use crate::llm::{Candidate, FunctionCall, GenerationRequest, GenerationResponse, GenerativeModel};
use crate::rag::{GroundedAnswerer, RelevantVideo, VideoRetriever};
use crate::weather::{WeatherProvider, WeatherRecord};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A `get_weather_info` call with the given arguments.
pub fn function_call(id: &str, args: Value) -> FunctionCall {
    FunctionCall {
        id: id.to_string(),
        name: WEATHER_TOOL_NAME.to_string(),
        args: serde_json::from_value(args).unwrap(),
    }
}

/// A single-candidate response proposing `calls`.
pub fn proposal_response(calls: Vec<FunctionCall>) -> GenerationResponse {
    GenerationResponse {
        candidates: vec![Candidate {
            text: None,
            function_calls: calls,
        }],
    }
}

/// Model that replays scripted responses in order and records requests.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<GenerationResponse>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<GenerationResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(GenerationResponse::from_text(*t)))
                .collect(),
        )
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(NimbusError::Llm("no scripted response left".to_string())))
    }
}

#[derive(Clone)]
enum ResolveFailure {
    InvalidCity(String),
    Malformed(String),
}

/// Resolver that always gives the same outcome and records cities.
pub struct ScriptedResolver {
    outcome: std::result::Result<Coordinate, ResolveFailure>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedResolver {
    pub fn returning(coordinate: Coordinate) -> Self {
        Self {
            outcome: Ok(coordinate),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with_invalid_city(message: &str) -> Self {
        Self {
            outcome: Err(ResolveFailure::InvalidCity(message.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with_malformed(message: &str) -> Self {
        Self {
            outcome: Err(ResolveFailure::Malformed(message.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoordinateResolver for ScriptedResolver {
    async fn resolve(&self, city: &str) -> Result<Coordinate> {
        self.calls.lock().unwrap().push(city.to_string());
        self.outcome.clone().map_err(|failure| match failure {
            ResolveFailure::InvalidCity(message) => NimbusError::InvalidCity(message),
            ResolveFailure::Malformed(message) => NimbusError::MalformedResponse(message),
        })
    }
}

/// Weather provider with a fixed payload or failure.
pub struct FixedWeather {
    outcome: std::result::Result<Value, String>,
    calls: Mutex<Vec<(Coordinate, String)>>,
}

impl FixedWeather {
    pub fn returning(payload: Value) -> Self {
        Self {
            outcome: Ok(payload),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Coordinate, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn historical(&self, coordinate: Coordinate, date: &str) -> Result<WeatherRecord> {
        self.calls
            .lock()
            .unwrap()
            .push((coordinate, date.to_string()));
        self.outcome
            .clone()
            .map(WeatherRecord)
            .map_err(NimbusError::ExternalService)
    }
}

/// Retriever that always returns the same video (or none).
pub struct FixedRetriever {
    video: Option<RelevantVideo>,
    calls: AtomicUsize,
}

impl FixedRetriever {
    pub fn found(video: RelevantVideo) -> Self {
        Self {
            video: Some(video),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            video: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRetriever for FixedRetriever {
    async fn relevant_video(&self, _question: &str) -> Result<Option<RelevantVideo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.video.clone())
    }
}

/// Grounded answerer with a fixed answer that records questions.
pub struct ScriptedAnswerer {
    answer: Answer,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAnswerer {
    pub fn replying(answer: Answer) -> Self {
        Self {
            answer,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GroundedAnswerer for ScriptedAnswerer {
    async fn answer(&self, question: &str, _video: &RelevantVideo) -> Result<Answer> {
        self.calls.lock().unwrap().push(question.to_string());
        Ok(self.answer.clone())
    }
}

/// Embedder producing one dimension per keyword (1.0 if the text mentions it).
pub struct KeywordEmbedder {
    keywords: Vec<String>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| if text.contains(k.as_str()) { 1.0 } else { 0.0 })
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.keywords.len()
    }
}
