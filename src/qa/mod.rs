//! Question answering over transcripts of any length.
//!
//! Short transcripts go to the model whole. Long ones are reduced to the
//! excerpts relevant to the question, chunk by chunk, and the answer is built
//! from those excerpts.

mod extract;

pub use extract::ExcerptExtractor;

use crate::chunking::chunk_text;
use crate::config::Prompts;
use crate::error::{Result, Stage, TldwError};
use crate::llm::{LanguageModel, ModelError};
use crate::reduction::{char_len, map_in_order, ReductionLimits};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Answer returned when no chunk held anything relevant to the question.
pub const NO_INFORMATION_ANSWER: &str = "The transcript does not contain information on this.";

/// Answers questions about a transcript through a language model.
pub struct QuestionAnswerer {
    model: Arc<dyn LanguageModel>,
    extractor: ExcerptExtractor,
    prompts: Prompts,
    limits: ReductionLimits,
}

impl QuestionAnswerer {
    /// Create an answerer with the default prompts.
    pub fn new(model: Arc<dyn LanguageModel>, limits: ReductionLimits) -> Self {
        Self {
            extractor: ExcerptExtractor::new(model.clone()),
            model,
            prompts: Prompts::default(),
            limits,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.extractor = self.extractor.with_prompts(prompts.clone());
        self.prompts = prompts;
        self
    }

    /// Answer `question` from `text`.
    #[instrument(skip(self, text), fields(model = %self.model.name(), chars = char_len(text)))]
    pub async fn answer(&self, question: &str, text: &str) -> Result<String> {
        let mut current = Cow::Borrowed(text);
        let mut passes = 0;

        loop {
            if self.limits.fits_context(&current) {
                match self.answer_direct(question, &current).await {
                    Ok(answer) => return Ok(answer),
                    Err(e) if e.is_context_limit() => {
                        warn!("Model rejected {} chars as too large, extracting excerpts: {}", char_len(&current), e);
                    }
                    Err(e) => return Err(TldwError::model(Stage::Answer, e)),
                }
            }

            if passes == self.limits.max_reduction_passes {
                return Err(TldwError::ReductionDidNotConverge { passes });
            }
            passes += 1;

            let excerpts = self.extract_excerpts(question, &current).await?;
            if excerpts.is_empty() {
                info!("No relevant excerpts found");
                return Ok(NO_INFORMATION_ANSWER.to_string());
            }
            if self.limits.fits_context(&excerpts) {
                return self.answer_from_excerpts(question, &excerpts).await;
            }

            info!(
                "Excerpts still too large ({} chars) after pass {}, reducing again",
                char_len(&excerpts),
                passes
            );
            current = Cow::Owned(excerpts);
        }
    }

    async fn answer_direct(&self, question: &str, text: &str) -> std::result::Result<String, ModelError> {
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.qa.direct, &[("question", question), ("transcript", text)]);
        self.model.generate(&prompt).await
    }

    /// Extract from every chunk of `text` and join the non-empty excerpts in chunk order.
    async fn extract_excerpts(&self, question: &str, text: &str) -> Result<String> {
        let chunks = chunk_text(text, self.limits.max_chunk_size);
        info!("Extracting excerpts from {} chunks", chunks.len());

        let excerpts = map_in_order(&chunks, self.limits.concurrency(), |index, chunk| async move {
            let excerpt = self.extractor.extract(chunk, question).await?;
            debug!("Chunk {}: {} chars of excerpts", index + 1, char_len(&excerpt));
            Ok::<_, TldwError>(excerpt)
        })
        .await?;

        Ok(excerpts
            .into_iter()
            .filter(|e| !e.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    async fn answer_from_excerpts(&self, question: &str, excerpts: &str) -> Result<String> {
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.qa.excerpts, &[("question", question), ("excerpts", excerpts)]);
        self.model
            .generate(&prompt)
            .await
            .map_err(|e| TldwError::model(Stage::AnswerFromExcerpts, e))
    }
}
