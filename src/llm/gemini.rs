//! Google Generative Language API backend (Gemini and Gemma models).

use super::{LanguageModel, ModelError};
use crate::config::ModelSettings;
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini-backed language model.
pub struct GeminiModel {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
}

impl GeminiModel {
    /// Create a client from model settings.
    pub fn from_settings(settings: &ModelSettings, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| TldwError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: settings.name.clone(),
            temperature: settings.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });
        if let Some(temperature) = self.temperature {
            body["generationConfig"] = json!({ "temperature": temperature });
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an error response to a [`ModelError`].
fn classify_error(status: u16, body: &str) -> ModelError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    let lower = message.to_lowercase();
    let too_large = status == 400
        && (lower.contains("token") || lower.contains("context") || lower.contains("too long"));

    if too_large {
        ModelError::ContextExceeded(message)
    } else {
        ModelError::Api {
            status: Some(status),
            message,
        }
    }
}

/// Pull the response text out of a successful response.
fn extract_text(response: GenerateContentResponse) -> std::result::Result<String, ModelError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ModelError::Api {
            status: None,
            message: format!("Prompt blocked: {}", reason),
        });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ModelError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
        debug!("Gemini response was truncated at the output token limit");
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl LanguageModel for GeminiModel {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ModelError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| ModelError::Transport(format!("Failed to reach Gemini API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to decode Gemini response: {}", e)))?;

        extract_text(body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
