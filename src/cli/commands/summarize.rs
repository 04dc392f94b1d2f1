//! Summarize command implementation.

use super::{load_transcript, start_session};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(input: &str, settings: Settings) -> Result<()> {
    let mut session = start_session(&settings)?;
    load_transcript(&mut session, input).await?;

    let spinner = Output::spinner("Generating summary...");

    match session.summarize().await {
        Ok(summary) => {
            spinner.finish_and_clear();
            Output::header("Summary");
            println!("\n{}\n", summary.trim());
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
