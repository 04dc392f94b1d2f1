//! Ask command implementation.

use super::{load_transcript, start_session};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(input: &str, question: &str, settings: Settings) -> Result<()> {
    let mut session = start_session(&settings)?;
    load_transcript(&mut session, input).await?;

    let spinner = Output::spinner("Looking for the answer...");

    match session.ask(question).await {
        Ok(answer) => {
            spinner.finish_and_clear();
            println!("\n{}\n", answer.trim());
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
