//! OpenAI Chat Completions backend for [`GenerativeModel`].

use super::{
    Candidate, FunctionCall, GenerationRequest, GenerationResponse, GenerativeModel,
    ResponseFormat, ToolSchema, Turn,
};
use crate::error::{NimbusError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    FunctionCall as OpenAIFunctionCall, FunctionObject,
    ResponseFormat as OpenAIResponseFormat,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Chat-completions model handle.
pub struct OpenAIModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIModel {
    /// Create a model handle with the given request timeout.
    pub fn new(model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeout)?,
            model: model.to_string(),
            temperature: None,
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl GenerativeModel for OpenAIModel {
    #[instrument(skip(self, request), fields(model = %self.model, turns = request.turns.len(), tools = request.tools.len()))]
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let messages = to_openai_messages(&request)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);

        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }

        if !request.tools.is_empty() {
            builder
                .tools(request.tools.iter().map(to_openai_tool).collect::<Vec<_>>())
                .tool_choice(ChatCompletionToolChoiceOption::Auto);
        }

        if request.response_format == ResponseFormat::Json {
            builder.response_format(OpenAIResponseFormat::JsonObject);
        }

        let chat_request = builder.build().map_err(|e| NimbusError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| NimbusError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let response = from_openai_response(response);
        debug!("Received {} candidate(s)", response.candidates.len());
        Ok(response)
    }
}

/// Convert a request into chat messages, preserving turn order.
pub(crate) fn to_openai_messages(
    request: &GenerationRequest,
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(request.turns.len() + 1);

    if let Some(instruction) = &request.system_instruction {
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instruction.clone())
                .build()
                .map_err(|e| NimbusError::Llm(e.to_string()))?
                .into(),
        );
    }

    for turn in &request.turns {
        let message: ChatCompletionRequestMessage = match turn {
            Turn::User(text) => ChatCompletionRequestUserMessageArgs::default()
                .content(text.clone())
                .build()
                .map_err(|e| NimbusError::Llm(e.to_string()))?
                .into(),
            Turn::Model(candidate) => {
                let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                if let Some(text) = &candidate.text {
                    builder.content(text.clone());
                }
                if !candidate.function_calls.is_empty() {
                    builder.tool_calls(
                        candidate
                            .function_calls
                            .iter()
                            .map(to_openai_tool_call)
                            .collect::<Vec<_>>(),
                    );
                }
                builder
                    .build()
                    .map_err(|e| NimbusError::Llm(e.to_string()))?
                    .into()
            }
            Turn::Tool(result) => ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(result.call_id.clone())
                .content(result.response.to_string())
                .build()
                .map_err(|e| NimbusError::Llm(e.to_string()))?
                .into(),
        };
        messages.push(message);
    }

    Ok(messages)
}

fn to_openai_tool(schema: &ToolSchema) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: schema.name.clone(),
            description: Some(schema.description.clone()),
            parameters: Some(schema.parameters.clone()),
            strict: None,
        },
    }
}

fn to_openai_tool_call(call: &FunctionCall) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: OpenAIFunctionCall {
            name: call.name.clone(),
            arguments: Value::Object(call.args.clone()).to_string(),
        },
    }
}

/// Convert a chat completion into candidates.
pub(crate) fn from_openai_response(response: CreateChatCompletionResponse) -> GenerationResponse {
    let candidates = response
        .choices
        .into_iter()
        .map(|choice| Candidate {
            text: choice.message.content,
            function_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(from_openai_tool_call)
                .collect(),
        })
        .collect();

    GenerationResponse { candidates }
}

fn from_openai_tool_call(call: ChatCompletionMessageToolCall) -> FunctionCall {
    let args = match serde_json::from_str::<Map<String, Value>>(&call.function.arguments) {
        Ok(args) => args,
        Err(e) => {
            warn!(
                "Ignoring unparseable arguments for {}: {} ({})",
                call.function.name, call.function.arguments, e
            );
            Map::new()
        }
    };

    FunctionCall {
        id: call.id,
        name: call.function.name,
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolResult;
    use serde_json::json;

    fn completion(message: Value) -> CreateChatCompletionResponse {
        serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1718000000,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": "tool_calls",
                "logprobs": null
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_tool_calls_become_function_calls() {
        let response = from_openai_response(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": "get_weather_info",
                    "arguments": "{\"city\": \"London\", \"date\": \"2024-06-01\"}"
                }
            }]
        })));

        let call = &response.candidates[0].function_calls[0];
        assert_eq!(call.id, "call_1");
        assert_eq!(call.name, "get_weather_info");
        assert_eq!(call.args["city"], "London");
        assert_eq!(call.args["date"], "2024-06-01");
    }

    #[test]
    fn test_unparseable_arguments_yield_empty_map() {
        let response = from_openai_response(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "get_weather_info", "arguments": "{city: London"}
            }]
        })));

        assert!(response.candidates[0].function_calls[0].args.is_empty());
    }

    #[test]
    fn test_text_response() {
        let response = from_openai_response(completion(json!({
            "role": "assistant",
            "content": "It was sunny."
        })));
        assert_eq!(response.text(), Some("It was sunny."));
        assert!(response.candidates[0].function_calls.is_empty());
    }

    #[test]
    fn test_messages_keep_turn_order() {
        let mut args = Map::new();
        args.insert("city".to_string(), json!("London"));
        let request = GenerationRequest::conversation(vec![
            Turn::User("question".to_string()),
            Turn::Model(Candidate {
                text: None,
                function_calls: vec![FunctionCall {
                    id: "call_1".to_string(),
                    name: "get_weather_info".to_string(),
                    args,
                }],
            }),
            Turn::Tool(ToolResult {
                call_id: "call_1".to_string(),
                name: "get_weather_info".to_string(),
                response: json!({"content": {"daily": {}}}),
            }),
        ])
        .with_system_instruction("be brief");

        let messages = to_openai_messages(&request).unwrap();
        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        match &messages[2] {
            ChatCompletionRequestMessage::Assistant(msg) => {
                let calls = msg.tool_calls.as_ref().unwrap();
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.arguments, r#"{"city":"London"}"#);
            }
            other => panic!("Expected assistant message, got {:?}", other),
        }
        match &messages[3] {
            ChatCompletionRequestMessage::Tool(msg) => assert_eq!(msg.tool_call_id, "call_1"),
            other => panic!("Expected tool message, got {:?}", other),
        }
    }
}
