//! Transcript sources for tldw.
//!
//! Provides a trait-based interface for the places a transcript can come from
//! (YouTube captions, local text files).

mod local;
mod youtube;

pub use local::LocalTranscriptSource;
pub use youtube::{extract_video_id, YoutubeTranscriptSource};

use crate::config::TranscriptSettings;
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Type of transcript source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    YouTube,
    Local,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::YouTube => write!(f, "youtube"),
            SourceType::Local => write!(f, "local"),
        }
    }
}

/// The plain text of one video's transcript.
///
/// Timing and speaker information is dropped at ingestion; caption snippets
/// are joined with single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID (or file stem for local transcripts).
    pub video_id: String,
    /// Transcript text.
    pub text: String,
}

impl Transcript {
    pub fn new(video_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            text: text.into(),
        }
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Get the source type.
    fn source_type(&self) -> SourceType;

    /// Check if this source can handle the given input.
    fn can_handle(&self, input: &str) -> bool;

    /// Extract the ID to fetch from the input (URL, path, etc.).
    fn extract_id(&self, input: &str) -> Option<String>;

    /// Fetch the transcript for an ID returned by [`TranscriptSource::extract_id`].
    async fn fetch(&self, id: &str) -> Result<Transcript>;
}

/// Detect the appropriate transcript source for the given input.
pub fn detect_source(
    input: &str,
    settings: &TranscriptSettings,
) -> Result<Option<Box<dyn TranscriptSource>>> {
    let youtube = YoutubeTranscriptSource::new(settings)?;
    if youtube.can_handle(input) {
        return Ok(Some(Box::new(youtube)));
    }

    let local = LocalTranscriptSource::new();
    if local.can_handle(input) {
        return Ok(Some(Box::new(local)));
    }

    Ok(None)
}

/// Parse input and return the appropriate source and ID.
pub fn parse_input(input: &str, settings: &TranscriptSettings) -> Result<(Box<dyn TranscriptSource>, String)> {
    let invalid = || TldwError::InvalidInput(format!("Invalid YouTube URL: {}", input));
    let source = detect_source(input, settings)?.ok_or_else(invalid)?;
    let id = source.extract_id(input).ok_or_else(invalid)?;
    Ok((source, id))
}

/// Resolve `input` to a source and fetch its transcript.
pub async fn fetch_transcript(input: &str, settings: &TranscriptSettings) -> Result<Transcript> {
    let (source, id) = parse_input(input, settings)?;
    tracing::info!("Fetching {} transcript for {}", source.source_type(), id);
    source.fetch(&id).await
}
