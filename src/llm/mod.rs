//! Generative language model backends.
//!
//! The core only needs "prompt in, text out". Backends report failures as
//! [`ModelError`], and [`ModelError::is_context_limit`] decides whether a failure
//! means the input was too large (and should be retried in smaller pieces).

mod gemini;
mod openai;
#[cfg(test)]
pub(crate) mod testing;

pub use gemini::GeminiModel;
pub use openai::OpenAIModel;

use crate::config::{ModelProvider, ModelSettings};
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a language model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend explicitly reported that the input exceeds its context window.
    #[error("Context window exceeded: {0}")]
    ContextExceeded(String),

    /// The backend returned an error response.
    #[error("API error{}: {message}", status_suffix(.status))]
    Api { status: Option<u16>, message: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response carried no text.
    #[error("Empty response from model")]
    EmptyResponse,

    /// The response could not be decoded.
    #[error("Malformed model response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Whether this failure signals that the prompt was too large.
    ///
    /// A structured [`ModelError::ContextExceeded`] always counts. Every other
    /// variant falls back to [`message_indicates_context_limit`] on its message.
    pub fn is_context_limit(&self) -> bool {
        match self {
            ModelError::ContextExceeded(_) => true,
            other => message_indicates_context_limit(&other.to_string()),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

/// Heuristic used when a backend gives no structured size signal.
pub fn message_indicates_context_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("context") || lower.contains("limit")
}

/// A generative language model: given a prompt, returns response text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a response for a single prompt.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ModelError>;

    /// Model identifier, for logging.
    fn name(&self) -> &str;
}

/// Build the configured language model backend.
pub fn create_model(settings: &ModelSettings) -> Result<Arc<dyn LanguageModel>> {
    let api_key = settings.resolve_api_key().ok_or_else(|| {
        TldwError::Config(format!(
            "Missing API key for {} (set {})",
            settings.provider,
            settings.api_key_env_vars().join(" / ")
        ))
    })?;

    let model: Arc<dyn LanguageModel> = match settings.provider {
        ModelProvider::Gemini => Arc::new(GeminiModel::from_settings(settings, api_key)?),
        ModelProvider::OpenAI => Arc::new(OpenAIModel::from_settings(settings, api_key)?),
    };
    Ok(model)
}
