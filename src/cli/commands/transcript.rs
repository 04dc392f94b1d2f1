//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::fetch_transcript;
use anyhow::Result;

/// Output format for transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {} (expected text or json)", s)),
        }
    }
}

/// Run the transcript command.
pub async fn run_transcript(
    input: &str,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Transcript, &settings)?;
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let spinner = Output::spinner("Fetching transcript...");
    let transcript = match fetch_transcript(input, &settings.transcript).await {
        Ok(transcript) => {
            spinner.finish_and_clear();
            transcript
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let rendered = match format {
        OutputFormat::Text => transcript.text.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(&transcript)?,
    };

    match output.as_deref() {
        None | Some("-") => println!("{}", rendered),
        Some(path) => {
            std::fs::write(path, &rendered)?;
            Output::success(&format!(
                "Wrote transcript for {} ({} chars) to {}",
                transcript.video_id,
                transcript.char_count(),
                path
            ));
            Output::preview(&transcript.text);
        }
    }

    Ok(())
}
