//! Generative-text interface used by every model-backed step.
//!
//! A request is either a single prompt or an ordered list of conversation
//! turns, optionally offering tool declarations. A response exposes the
//! candidate completions, each carrying text and/or proposed function calls.

mod openai;

pub use openai::OpenAIModel;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Trait for generative-text backends.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Run a single generation request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}

/// One turn of a conversation sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// A user message.
    User(String),
    /// A turn previously produced by the model, replayed verbatim.
    Model(Candidate),
    /// The result of executing a function the model proposed.
    Tool(ToolResult),
}

/// A function invocation proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Backend-assigned call id, echoed back in the matching tool result.
    pub id: String,
    /// Name of the declared function.
    pub name: String,
    /// Named arguments.
    pub args: Map<String, Value>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub text: Option<String>,
    pub function_calls: Vec<FunctionCall>,
}

/// Payload returned to the model for a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Id of the call this result answers.
    pub call_id: String,
    /// Function name, matching the declared [`ToolSchema`].
    pub name: String,
    pub response: Value,
}

/// Declaration of a callable offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema object: `{type: "object", properties: {...}, required: [...]}`.
    pub parameters: Value,
}

/// Output format requested from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Ask the backend to constrain output to a JSON object.
    Json,
}

/// A generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolSchema>,
    pub response_format: ResponseFormat,
}

impl GenerationRequest {
    /// A request made of a single user prompt.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::conversation(vec![Turn::User(text.into())])
    }

    /// A request replaying an ordered list of turns.
    pub fn conversation(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            ..Self::default()
        }
    }

    /// Set the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Offer tools the model may call.
    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    /// Request JSON object output.
    pub fn json(mut self) -> Self {
        self.response_format = ResponseFormat::Json;
        self
    }
}

/// A generation response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    pub candidates: Vec<Candidate>,
}

impl GenerationResponse {
    /// Response with a single text candidate.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                text: Some(text.into()),
                function_calls: Vec::new(),
            }],
        }
    }

    /// Text of the first candidate, if any.
    pub fn text(&self) -> Option<&str> {
        self.candidates.first().and_then(|c| c.text.as_deref())
    }
}
