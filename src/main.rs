//! Nimbus CLI entry point.

use anyhow::Result;
use clap::Parser;
use nimbus::cli::{commands, Cli, Commands};
use nimbus::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("nimbus={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Ask { question, api_only } => {
            commands::run_ask(question, *api_only, settings).await?;
        }

        Commands::Index {
            uri,
            title,
            description,
        } => {
            commands::run_index(uri, title, description, settings).await?;
        }

        Commands::Remove { uri } => {
            commands::run_remove(uri, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Search { question } => {
            commands::run_search(question, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path.as_ref(), settings)?;
        }
    }

    Ok(())
}
