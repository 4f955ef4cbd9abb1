//! Ask command implementation.

use crate::answer::Answer;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{AnswerSource, WeatherPipeline};
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, api_only: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let pipeline = WeatherPipeline::from_settings(&settings)?;

    let spinner = Output::spinner("Looking up the weather...");

    let result = if api_only {
        pipeline.answer_api_only(question).await
    } else {
        pipeline.answer(question).await
    };

    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            match &result.answer {
                Answer::Text(text) => println!("\n{}\n", text),
                Answer::NoData => Output::warning("No data available for this question."),
            }

            Output::kv("Source", source_label(result.source));
            if let Some(uri) = &result.video_uri {
                Output::kv("Video", uri);
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to answer ({}): {}", e.kind(), e));
            return Err(e.into());
        }
    }

    Ok(())
}

fn source_label(source: AnswerSource) -> &'static str {
    match source {
        AnswerSource::Video => "weather video",
        AnswerSource::WeatherApi => "historical weather API",
        AnswerSource::Unanswered => "none",
    }
}
