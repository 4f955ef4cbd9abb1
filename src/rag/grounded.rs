//! Answering with a retrieved video as grounding context.

use super::RelevantVideo;
use crate::answer::Answer;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{GenerationRequest, GenerativeModel};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Trait for answering a question from supporting context.
#[async_trait]
pub trait GroundedAnswerer: Send + Sync {
    /// Answer `question` using `video` as context, or [`Answer::NoData`].
    async fn answer(&self, question: &str, video: &RelevantVideo) -> Result<Answer>;
}

/// Grounded answering through a generative model.
pub struct ModelGroundedAnswerer {
    model: Arc<dyn GenerativeModel>,
    prompts: Prompts,
}

impl ModelGroundedAnswerer {
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
impl GroundedAnswerer for ModelGroundedAnswerer {
    #[instrument(skip(self, video), fields(uri = %video.uri))]
    async fn answer(&self, question: &str, video: &RelevantVideo) -> Result<Answer> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("title".to_string(), video.title.clone());
        vars.insert("uri".to_string(), video.uri.clone());
        vars.insert("context".to_string(), video.context.clone());

        let user_prompt = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);
        let request = GenerationRequest::prompt(user_prompt)
            .with_system_instruction(self.prompts.rag.system.clone());

        let response = self.model.generate(request).await?;
        let answer = Answer::from_reply(response.text().unwrap_or_default());

        debug!("Grounded answer: {:?}", answer);
        Ok(answer)
    }
}
