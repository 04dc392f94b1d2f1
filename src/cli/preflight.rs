//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials and limits are usable before starting
//! operations that would otherwise fail midway (after fetching a transcript).

use crate::config::Settings;
use crate::error::{Result, TldwError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Summarizing and asking need a model API key and valid limits.
    Model,
    /// Fetching a transcript has no requirements.
    Transcript,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Model => {
            check_api_key(settings)?;
            settings.reduction_limits()?;
        }
        Operation::Transcript => {
            // No external requirements for fetching transcripts
        }
    }
    Ok(())
}

/// Check that the configured provider has an API key.
fn check_api_key(settings: &Settings) -> Result<()> {
    if settings.model.resolve_api_key().is_some() {
        return Ok(());
    }

    let vars = settings.model.api_key_env_vars();
    Err(TldwError::Config(format!(
        "{} not set. Set it with: export {}='...' (or add api_key under [model] in the config file)",
        vars.join(" / "),
        vars[0]
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transcript_no_requirements() {
        assert!(check(Operation::Transcript, &Settings::default()).is_ok());
    }

    #[test]
    fn test_check_model_with_configured_key() {
        let mut settings = Settings::default();
        settings.model.api_key = Some("configured".to_string());
        assert!(check(Operation::Model, &settings).is_ok());

        settings.limits.max_reduction_passes = 0;
        assert!(matches!(
            check(Operation::Model, &settings),
            Err(TldwError::Config(_))
        ));
    }
}
