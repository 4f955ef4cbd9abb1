//! Question-answering pipeline.
//!
//! Each question first goes through retrieval-augmented answering. Only when
//! that yields [`Answer::NoData`] is the weather API fallback tried.

use crate::answer::Answer;
use crate::config::{Prompts, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::fallback::WeatherFallback;
use crate::geocode::ModelCoordinateResolver;
use crate::llm::{GenerativeModel, OpenAIModel};
use crate::rag::{GroundedAnswerer, ModelGroundedAnswerer, SemanticRetriever, VideoRetriever};
use crate::vector_store::SqliteVectorStore;
use crate::weather::OpenMeteoArchive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Which strategy produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Grounded in a retrieved video.
    Video,
    /// Produced by the weather API fallback.
    WeatherApi,
    /// No strategy could answer.
    Unanswered,
}

/// An answer plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineAnswer {
    pub answer: Answer,
    pub source: AnswerSource,
    /// URI of the retrieved video, if any.
    pub video_uri: Option<String>,
}

impl PipelineAnswer {
    fn unanswered(video_uri: Option<String>) -> Self {
        Self {
            answer: Answer::NoData,
            source: AnswerSource::Unanswered,
            video_uri,
        }
    }

    fn from_fallback(answer: Answer, video_uri: Option<String>) -> Self {
        if answer.is_no_data() {
            return Self::unanswered(video_uri);
        }
        Self {
            answer,
            source: AnswerSource::WeatherApi,
            video_uri,
        }
    }
}

/// Answers weather questions, one request at a time. Holds no per-request state.
pub struct WeatherPipeline {
    retriever: Arc<dyn VideoRetriever>,
    grounded: Arc<dyn GroundedAnswerer>,
    fallback: WeatherFallback,
}

impl WeatherPipeline {
    pub fn new(
        retriever: Arc<dyn VideoRetriever>,
        grounded: Arc<dyn GroundedAnswerer>,
        fallback: WeatherFallback,
    ) -> Self {
        Self {
            retriever,
            grounded,
            fallback,
        }
    }

    /// Build the production pipeline from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let mut model = OpenAIModel::new(
            &settings.model.name,
            Duration::from_secs(settings.model.timeout_secs),
        )?;
        if let Some(temperature) = settings.model.temperature {
            model = model.with_temperature(temperature);
        }
        let model: Arc<dyn GenerativeModel> = Arc::new(model);

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?);
        let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);

        let retriever = Arc::new(
            SemanticRetriever::new(store, embedder).with_min_score(settings.retrieval.min_score),
        );
        let grounded =
            Arc::new(ModelGroundedAnswerer::new(model.clone()).with_prompts(prompts.clone()));
        let resolver = Arc::new(ModelCoordinateResolver::new(model.clone()).with_prompts(prompts));
        let weather = Arc::new(OpenMeteoArchive::new(&settings.weather)?);

        Ok(Self::new(
            retriever,
            grounded,
            WeatherFallback::new(model, resolver, weather),
        ))
    }

    /// Answer one question from the weather API alone, skipping the video index.
    #[instrument(skip(self))]
    pub async fn answer_api_only(&self, question: &str) -> Result<PipelineAnswer> {
        if question.trim().is_empty() {
            return Ok(PipelineAnswer::unanswered(None));
        }

        let answer = self.fallback.answer(question).await?;
        info!("Weather info with API: {}", answer);
        Ok(PipelineAnswer::from_fallback(answer, None))
    }

    /// Answer one question.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<PipelineAnswer> {
        if question.trim().is_empty() {
            return Ok(PipelineAnswer::unanswered(None));
        }

        let video = self.retriever.relevant_video(question).await?;
        let video_uri = video.as_ref().map(|v| v.uri.clone());
        info!("Relevant video URI: {}", video_uri.as_deref().unwrap_or(""));

        let grounded = match &video {
            Some(video) => self.grounded.answer(question, video).await?,
            None => Answer::NoData,
        };
        info!("Weather info with RAG: {}", grounded);

        if !grounded.is_no_data() {
            return Ok(PipelineAnswer {
                answer: grounded,
                source: AnswerSource::Video,
                video_uri,
            });
        }

        let answer = self.fallback.answer(question).await?;
        info!("Weather info with API: {}", answer);
        Ok(PipelineAnswer::from_fallback(answer, video_uri))
    }
}
