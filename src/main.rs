//! tldw CLI entry point.

use anyhow::Result;
use clap::Parser;
use tldw::cli::{commands, Cli, Commands};
use tldw::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // API keys may live in a .env file next to where tldw is run
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config_path = match &cli.config {
        Some(path) => Settings::expand_path(path),
        None => Settings::default_config_path(),
    };
    let mut settings = Settings::load_from(Some(&config_path))?;
    if let Some(model) = &cli.model {
        settings.model.name = model.clone();
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tldw={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Summarize { input } => {
            commands::run_summarize(input, settings).await?;
        }

        Commands::Ask { input, question } => {
            commands::run_ask(input, question, settings).await?;
        }

        Commands::Chat { input } => {
            commands::run_chat(input, settings).await?;
        }

        Commands::Transcript { input, output, format } => {
            commands::run_transcript(input, output.clone(), format, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
