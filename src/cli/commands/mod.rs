//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod serve;
mod summarize;
mod transcript;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use serve::run_serve;
pub use summarize::run_summarize;
pub use transcript::run_transcript;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::Session;

/// Run the model pre-flight checks and build a session.
fn start_session(settings: &Settings) -> anyhow::Result<Session> {
    if let Err(e) = preflight::check(Operation::Model, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tldw config path' to find the configuration file.");
        return Err(e.into());
    }
    Ok(Session::new(settings)?)
}

/// Fetch a transcript into the session behind a spinner.
async fn load_transcript(session: &mut Session, input: &str) -> anyhow::Result<()> {
    let spinner = Output::spinner("Fetching transcript...");

    match session.load(input).await {
        Ok(transcript) => {
            spinner.finish_and_clear();
            Output::transcript_info(&transcript.video_id, transcript.char_count());
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            Err(e.into())
        }
    }
}
