//! Configuration settings for tldw.

use crate::reduction::ReductionLimits;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub limits: LimitSettings,
    pub transcript: TranscriptSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Language model provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Google Gemini / Gemma via the Generative Language REST API (default).
    #[default]
    Gemini,
    /// OpenAI chat completions.
    OpenAI,
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" | "gemma" => Ok(ModelProvider::Gemini),
            "openai" => Ok(ModelProvider::OpenAI),
            _ => Err(format!("Unknown model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Gemini => write!(f, "gemini"),
            ModelProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Backend provider (gemini, openai).
    pub provider: ModelProvider,
    /// Model name passed to the provider.
    pub name: String,
    /// API key. Falls back to the provider's environment variables when unset.
    pub api_key: Option<String>,
    /// Override for the provider's API base URL.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Sampling temperature (provider default when unset).
    pub temperature: Option<f32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Gemini,
            name: "gemma-3-27b-it".to_string(),
            api_key: None,
            base_url: None,
            timeout_seconds: 300,
            temperature: None,
        }
    }
}

impl ModelSettings {
    /// Environment variables consulted for the API key, in order.
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self.provider {
            ModelProvider::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            ModelProvider::OpenAI => &["OPENAI_API_KEY"],
        }
    }

    /// Resolve the API key from settings or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.api_key_env_vars()
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            })
    }

    /// Apply `GEMINI_MODEL` when the Gemini provider is configured.
    pub fn apply_env_overrides(&mut self) {
        if self.provider == ModelProvider::Gemini {
            if let Ok(name) = std::env::var("GEMINI_MODEL") {
                if !name.trim().is_empty() {
                    self.name = name;
                }
            }
        }
    }
}

/// Size limits for map-reduce processing, in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Per-chunk bound used when a text is split for reduction.
    pub max_chunk_size: usize,
    /// Largest text sent to the model in a single call.
    pub max_context_size: usize,
    /// Maximum number of reduction passes before giving up.
    pub max_reduction_passes: usize,
    /// Maximum concurrent per-chunk model calls.
    pub max_concurrent_calls: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        let limits = ReductionLimits::default();
        Self {
            max_chunk_size: limits.max_chunk_size,
            max_context_size: limits.max_context_size,
            max_reduction_passes: limits.max_reduction_passes,
            max_concurrent_calls: limits.max_concurrent_calls,
        }
    }
}

impl LimitSettings {
    /// Convert into validated reduction limits.
    pub fn to_limits(&self) -> crate::error::Result<ReductionLimits> {
        let limits = ReductionLimits {
            max_chunk_size: self.max_chunk_size,
            max_context_size: self.max_context_size,
            max_reduction_passes: self.max_reduction_passes,
            max_concurrent_calls: self.max_concurrent_calls,
        };
        limits.validate()?;
        Ok(limits)
    }
}

/// Transcript fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Preferred caption languages, in order.
    pub languages: Vec<String>,
    /// YouTube base URL (overridable for testing or proxies).
    pub youtube_base_url: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            youtube_base_url: "https://www.youtube.com".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.model.apply_env_overrides();
        Ok(settings)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TldwError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tldw")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Validated reduction limits.
    pub fn reduction_limits(&self) -> crate::error::Result<ReductionLimits> {
        self.limits.to_limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.limits.max_chunk_size, 20_000);
        assert_eq!(settings.limits.max_context_size, 50_000);
        assert_eq!(settings.model.provider, ModelProvider::Gemini);
        assert_eq!(settings.model.name, "gemma-3-27b-it");
        assert!(settings.reduction_limits().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            provider = "openai"
            name = "gpt-4o-mini"

            [limits]
            max_chunk_size = 1000
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.provider, ModelProvider::OpenAI);
        assert_eq!(settings.model.timeout_seconds, 300);
        assert_eq!(settings.limits.max_chunk_size, 1000);
        assert_eq!(settings.limits.max_context_size, 50_000);
        assert_eq!(settings.transcript.languages, vec!["en".to_string()]);
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let mut settings = Settings::default();
        settings.limits.max_chunk_size = 60_000;
        assert!(settings.reduction_limits().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.limits.max_concurrent_calls = 7;
        settings.transcript.languages = vec!["de".to_string(), "en".to_string()];
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.limits.max_concurrent_calls, 7);
        assert_eq!(loaded.transcript.languages, vec!["de".to_string(), "en".to_string()]);
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Gemini".parse::<ModelProvider>(), Ok(ModelProvider::Gemini));
        assert_eq!("openai".parse::<ModelProvider>(), Ok(ModelProvider::OpenAI));
        assert!("claude".parse::<ModelProvider>().is_err());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let settings = ModelSettings {
            api_key: Some("from-config".to_string()),
            ..ModelSettings::default()
        };
        assert_eq!(settings.resolve_api_key().as_deref(), Some("from-config"));
    }
}
