//! Second model turn: turning a weather payload into an answer.

use super::extraction::WEATHER_TOOL_NAME;
use crate::error::{NimbusError, Result};
use crate::llm::{Candidate, GenerationRequest, GenerativeModel, ToolResult, Turn};
use crate::weather::WeatherRecord;
use serde_json::json;
use tracing::instrument;

/// The three-turn exchange replayed to the model: question, the model's own
/// call proposal, then the tool result. The order is fixed by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExchange {
    question: String,
    proposal: Candidate,
    result: ToolResult,
}

impl ToolExchange {
    /// Pair the model's proposal with the fetched record.
    ///
    /// The result answers the proposal's first call and is tagged with
    /// [`WEATHER_TOOL_NAME`].
    pub fn new(question: &str, proposal: Candidate, record: WeatherRecord) -> Result<Self> {
        let call_id = proposal
            .function_calls
            .first()
            .map(|call| call.id.clone())
            .ok_or_else(|| {
                NimbusError::InvalidInput("model proposal contains no function call".to_string())
            })?;

        Ok(Self {
            question: question.to_string(),
            proposal,
            result: ToolResult {
                call_id,
                name: WEATHER_TOOL_NAME.to_string(),
                response: json!({ "content": record.into_value() }),
            },
        })
    }

    /// Conversation turns in causal order.
    pub fn into_turns(self) -> Vec<Turn> {
        vec![
            Turn::User(self.question),
            Turn::Model(self.proposal),
            Turn::Tool(self.result),
        ]
    }
}

/// Replay the exchange without tools and return the model's text unmodified.
#[instrument(skip_all)]
pub async fn synthesize(model: &dyn GenerativeModel, exchange: ToolExchange) -> Result<String> {
    let response = model
        .generate(GenerationRequest::conversation(exchange.into_turns()))
        .await?;

    response
        .text()
        .map(str::to_string)
        .ok_or_else(|| NimbusError::MalformedResponse("synthesis reply contained no text".to_string()))
}
