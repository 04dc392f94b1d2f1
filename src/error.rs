//! Error types for tldw.

use crate::llm::ModelError;
use thiserror::Error;

/// Which model-backed step of a summarize/answer action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summary,
    ChunkSummary,
    CombineSummaries,
    ExtractExcerpts,
    Answer,
    AnswerFromExcerpts,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Summary => write!(f, "generating summary"),
            Stage::ChunkSummary => write!(f, "summarizing chunk"),
            Stage::CombineSummaries => write!(f, "combining summaries"),
            Stage::ExtractExcerpts => write!(f, "extracting excerpts"),
            Stage::Answer => write!(f, "answering question"),
            Stage::AnswerFromExcerpts => write!(f, "answering from excerpts"),
        }
    }
}

/// Library-level error type for tldw operations.
#[derive(Error, Debug)]
pub enum TldwError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript not available: {0}")]
    TranscriptUnavailable(String),

    #[error("Error fetching transcript: {0}")]
    TranscriptFetch(String),

    #[error("Error {stage}: {source}")]
    Model {
        stage: Stage,
        #[source]
        source: ModelError,
    },

    #[error("Reduction did not converge after {passes} passes")]
    ReductionDidNotConverge { passes: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TldwError {
    /// Wrap a terminal model failure with the step it happened in.
    pub fn model(stage: Stage, source: ModelError) -> Self {
        TldwError::Model { stage, source }
    }
}

/// Result type alias for tldw operations.
pub type Result<T> = std::result::Result<T, TldwError>;
