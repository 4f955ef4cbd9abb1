//! CLI module for Nimbus.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Nimbus - weather question answering
///
/// Answers natural-language weather questions from an index of weather
/// videos, falling back to historical weather data when the videos cannot.
#[derive(Parser, Debug)]
#[command(name = "nimbus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "NIMBUS_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP endpoint that answers POSTed questions
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long, env = "NIMBUS_HOST")]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "NIMBUS_PORT")]
        port: Option<u16>,
    },

    /// Answer a single weather question
    Ask {
        /// The question to ask
        question: String,

        /// Skip the video index and answer from the weather API only
        #[arg(long)]
        api_only: bool,
    },

    /// Add a weather video to the index
    Index {
        /// Video location, e.g. gs://bucket/forecast.mp4
        #[arg(long)]
        uri: String,

        /// Video title
        #[arg(long)]
        title: String,

        /// Description or transcript used as grounding context
        #[arg(long)]
        description: String,
    },

    /// Remove a video from the index
    Remove {
        /// Video location
        uri: String,
    },

    /// List indexed videos
    List,

    /// Show the video that best matches a question
    Search {
        /// The question to match
        question: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the default path
    Init,

    /// Show configuration file path
    Path,
}
