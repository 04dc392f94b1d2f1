//! OpenAI chat completions backend.

use super::{LanguageModel, ModelError};
use crate::config::ModelSettings;
use crate::error::{Result, TldwError};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

/// Create an OpenAI client with the configured key, base URL and timeout.
pub fn create_client(settings: &ModelSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()
        .map_err(|e| TldwError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base_url) = &settings.base_url {
        config = config.with_api_base(base_url);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// OpenAI-backed language model.
pub struct OpenAIModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIModel {
    /// Create a model from settings.
    pub fn from_settings(settings: &ModelSettings, api_key: String) -> Result<Self> {
        Ok(Self {
            client: create_client(settings, &api_key)?,
            model: settings.name.clone(),
            temperature: settings.temperature,
        })
    }
}

/// Map an async-openai error to a [`ModelError`].
fn map_error(error: OpenAIError) -> ModelError {
    match error {
        OpenAIError::ApiError(api) => {
            if api.message.contains("maximum context length") {
                ModelError::ContextExceeded(api.message)
            } else {
                ModelError::Api {
                    status: None,
                    message: api.message,
                }
            }
        }
        OpenAIError::Reqwest(e) => ModelError::Transport(e.to_string()),
        OpenAIError::JSONDeserialize(e) => ModelError::InvalidResponse(e.to_string()),
        other => ModelError::Api {
            status: None,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ModelError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(map_error)?
                .into(),
        ];

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            request.temperature(temperature);
        }
        let request = request.build().map_err(map_error)?;

        let response = self.client.chat().create(request).await.map_err(map_error)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ModelError::EmptyResponse)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
