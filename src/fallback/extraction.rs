//! Structured extraction of `{city, date}` from a free-text question.

use crate::error::{NimbusError, Result};
use crate::llm::{Candidate, GenerationRequest, GenerationResponse, GenerativeModel, ToolSchema};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

/// Name of the weather function offered to the model.
///
/// The tool result sent back during synthesis carries this same name.
pub const WEATHER_TOOL_NAME: &str = "get_weather_info";

const CITY_ARG: &str = "city";
const DATE_ARG: &str = "date";

/// Declaration of `get_weather_info(city: string, date: string)`.
pub fn weather_tool() -> ToolSchema {
    ToolSchema {
        name: WEATHER_TOOL_NAME.to_string(),
        description: "Get the historical weather (minimum and maximum temperature and \
            conditions) for a city on a specific day."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                CITY_ARG: {
                    "type": "string",
                    "description": "Name of the city, optionally with its country, e.g. \"Istanbul, Turkey\""
                },
                DATE_ARG: {
                    "type": "string",
                    "description": "The day to look up, in YYYY-MM-DD format"
                }
            },
            "required": [CITY_ARG, DATE_ARG]
        }),
    }
}

/// Parameters for a weather lookup, taken verbatim from the model's call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
    pub date: String,
}

/// Outcome of the extraction step.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// The model did not propose a call carrying both parameters. Not an error.
    Empty,
    /// Both parameters were extracted.
    Structured {
        query: WeatherQuery,
        /// The model's turn containing the call, replayed during synthesis.
        proposal: Candidate,
    },
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, ExtractionResult::Empty)
    }
}

/// Ask the model to turn `question` into a `get_weather_info` call.
#[instrument(skip(model))]
pub async fn extract(model: &dyn GenerativeModel, question: &str) -> Result<ExtractionResult> {
    let request = GenerationRequest::prompt(question).with_tools(vec![weather_tool()]);
    let response = model.generate(request).await?;
    let result = validate_extraction(response)?;
    debug!("Extraction result: {:?}", result);
    Ok(result)
}

/// Classify a first-turn response.
///
/// Structured when there is a candidate, it proposes at least one call, and
/// the first call's arguments contain both `city` and `date` keys. Anything
/// short of that is [`ExtractionResult::Empty`]. A key that is present with a
/// non-string value is a [`NimbusError::MalformedResponse`], since values are
/// never coerced.
pub fn validate_extraction(response: GenerationResponse) -> Result<ExtractionResult> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(ExtractionResult::Empty);
    };
    let Some(call) = candidate.function_calls.first() else {
        return Ok(ExtractionResult::Empty);
    };
    if !call.args.contains_key(CITY_ARG) || !call.args.contains_key(DATE_ARG) {
        return Ok(ExtractionResult::Empty);
    }

    let query = WeatherQuery {
        city: string_arg(&call.args, CITY_ARG)?,
        date: string_arg(&call.args, DATE_ARG)?,
    };
    Ok(ExtractionResult::Structured {
        query,
        proposal: candidate,
    })
}

fn string_arg(args: &Map<String, Value>, key: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        other => Err(NimbusError::MalformedResponse(format!(
            "{} argument `{}` is not a string: {}",
            WEATHER_TOOL_NAME,
            key,
            other.cloned().unwrap_or(Value::Null)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FunctionCall;
    use crate::testing::{function_call, proposal_response, ScriptedModel};

    #[test]
    fn test_schema_declares_exactly_city_and_date() {
        let schema = weather_tool();
        assert_eq!(schema.name, "get_weather_info");
        assert!(!schema.description.is_empty());

        let params = &schema.parameters;
        assert_eq!(params["type"], "object");
        let properties = params["properties"].as_object().unwrap();
        let mut names: Vec<_> = properties.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["city", "date"]);
        for property in properties.values() {
            assert_eq!(property["type"], "string");
            assert!(property["description"].as_str().is_some());
        }
        assert_eq!(params["required"], json!(["city", "date"]));
    }

    #[test]
    fn test_structured_when_both_arguments_present() {
        let response = proposal_response(vec![function_call(
            "call_1",
            json!({"city": "London", "date": "2024-06-01"}),
        )]);

        match validate_extraction(response.clone()).unwrap() {
            ExtractionResult::Structured { query, proposal } => {
                assert_eq!(
                    query,
                    WeatherQuery {
                        city: "London".to_string(),
                        date: "2024-06-01".to_string()
                    }
                );
                assert_eq!(proposal, response.candidates[0]);
            }
            other => panic!("Expected Structured, got {:?}", other),
        }
    }

    #[test]
    fn test_values_are_taken_verbatim() {
        let response = proposal_response(vec![function_call(
            "call_1",
            json!({"city": "  new york, USA ", "date": "last Monday"}),
        )]);

        match validate_extraction(response).unwrap() {
            ExtractionResult::Structured { query, .. } => {
                assert_eq!(query.city, "  new york, USA ");
                assert_eq!(query.date, "last Monday");
            }
            other => panic!("Expected Structured, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_without_candidates() {
        assert!(validate_extraction(GenerationResponse::default()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_without_function_calls() {
        let response = GenerationResponse::from_text("I can only help with weather questions.");
        assert!(validate_extraction(response).unwrap().is_empty());
    }

    #[test]
    fn test_empty_when_argument_missing() {
        let response = proposal_response(vec![function_call("call_1", json!({"city": "London"}))]);
        assert!(validate_extraction(response).unwrap().is_empty());

        let response = proposal_response(vec![function_call("call_1", json!({"date": "2024-06-01"}))]);
        assert!(validate_extraction(response).unwrap().is_empty());
    }

    #[test]
    fn test_non_string_argument_is_malformed() {
        for args in [
            json!({"city": "London", "date": 20240601}),
            json!({"city": null, "date": "2024-06-01"}),
        ] {
            let response = proposal_response(vec![function_call("call_1", args)]);
            let err = validate_extraction(response).unwrap_err();
            assert!(
                matches!(err, NimbusError::MalformedResponse(_)),
                "got {:?}",
                err
            );
        }
    }

    #[test]
    fn test_only_first_call_is_considered() {
        let response = proposal_response(vec![
            function_call("call_1", json!({"city": "London"})),
            function_call("call_2", json!({"city": "Paris", "date": "2024-06-01"})),
        ]);
        assert!(validate_extraction(response).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extract_offers_weather_tool_with_question() {
        let model = ScriptedModel::new(vec![Ok(proposal_response(vec![FunctionCall {
            id: "call_1".to_string(),
            name: WEATHER_TOOL_NAME.to_string(),
            args: serde_json::from_value(json!({"city": "Oslo", "date": "2024-01-15"})).unwrap(),
        }]))]);

        let result = extract(&model, "How cold was Oslo on 15 January 2024?")
            .await
            .unwrap();
        assert!(!result.is_empty());

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools, vec![weather_tool()]);
        assert_eq!(
            requests[0].turns,
            vec![crate::llm::Turn::User(
                "How cold was Oslo on 15 January 2024?".to_string()
            )]
        );
    }
}
