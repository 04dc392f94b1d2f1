//! Per-chunk excerpt extraction.

use crate::config::Prompts;
use crate::error::{Result, Stage, TldwError};
use crate::llm::LanguageModel;
use std::sync::Arc;

/// Response meaning "nothing in this chunk is relevant".
const NOTHING_RELEVANT: &str = "None";

/// Pulls the passages relevant to a question out of one chunk.
pub struct ExcerptExtractor {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl ExcerptExtractor {
    /// Create an extractor with the default prompts.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Return the relevant excerpts of `chunk`, or an empty string if there are none.
    pub async fn extract(&self, chunk: &str, question: &str) -> Result<String> {
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.qa.extract, &[("question", question), ("chunk", chunk)]);

        let response = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| TldwError::model(Stage::ExtractExcerpts, e))?;

        let excerpts = response.trim();
        if excerpts == NOTHING_RELEVANT {
            Ok(String::new())
        } else {
            Ok(excerpts.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;
    use crate::llm::ModelError;

    #[tokio::test]
    async fn test_sentinel_maps_to_empty() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("  None \n".to_string())));
        let extractor = ExcerptExtractor::new(model);

        let excerpts = extractor.extract("Cats sleep a lot.", "What do dogs eat?").await.unwrap();
        assert_eq!(excerpts, "");
    }

    #[tokio::test]
    async fn test_excerpts_are_trimmed() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("\n\"Dogs eat kibble.\"\n".to_string())));
        let extractor = ExcerptExtractor::new(model.clone());

        let excerpts = extractor
            .extract("Dogs eat kibble. Cats sleep.", "What do dogs eat?")
            .await
            .unwrap();
        assert_eq!(excerpts, "\"Dogs eat kibble.\"");

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("\"What do dogs eat?\""));
        assert!(prompt.ends_with("Chunk: Dogs eat kibble. Cats sleep."));
    }

    #[tokio::test]
    async fn test_sentinel_must_match_exactly() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("None of this matters.".to_string())));
        let extractor = ExcerptExtractor::new(model);

        let excerpts = extractor.extract("None of this matters.", "Why?").await.unwrap();
        assert_eq!(excerpts, "None of this matters.");
    }

    #[tokio::test]
    async fn test_failure_is_terminal() {
        let model = Arc::new(ScriptedModel::new(|_| Err(ModelError::EmptyResponse)));
        let extractor = ExcerptExtractor::new(model);

        let err = extractor.extract("text", "question").await.unwrap_err();
        assert!(matches!(err, TldwError::Model { stage: Stage::ExtractExcerpts, .. }));
    }
}
