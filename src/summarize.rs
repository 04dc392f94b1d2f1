//! Map-reduce summarization of transcripts of any length.
//!
//! A text that fits the context window is summarized in one call. Anything
//! larger (or anything the model rejects as too large) is chunked, each chunk is
//! summarized on its own, and the joined chunk summaries are either combined in
//! a final call or, if still too large, reduced again.

use crate::chunking::chunk_text;
use crate::config::Prompts;
use crate::error::{Result, Stage, TldwError};
use crate::llm::{LanguageModel, ModelError};
use crate::reduction::{char_len, map_in_order, ReductionLimits};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Produces structured summaries through a language model.
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
    limits: ReductionLimits,
}

impl Summarizer {
    /// Create a summarizer with the default prompts.
    pub fn new(model: Arc<dyn LanguageModel>, limits: ReductionLimits) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
            limits,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Summarize `text` into the TL;DR / Key Points / Conclusion structure.
    #[instrument(skip(self, text), fields(model = %self.model.name(), chars = char_len(text)))]
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let mut current = Cow::Borrowed(text);
        let mut passes = 0;

        loop {
            if self.limits.fits_context(&current) {
                match self.summarize_direct(&current).await {
                    Ok(summary) => return Ok(summary),
                    Err(e) if e.is_context_limit() => {
                        warn!("Model rejected {} chars as too large, chunking: {}", char_len(&current), e);
                    }
                    Err(e) => return Err(TldwError::model(Stage::Summary, e)),
                }
            }

            if passes == self.limits.max_reduction_passes {
                return Err(TldwError::ReductionDidNotConverge { passes });
            }
            passes += 1;

            let combined = self.summarize_chunks(&current).await?;
            if self.limits.fits_context(&combined) {
                return self.combine(&combined).await;
            }

            info!(
                "Chunk summaries still too large ({} chars) after pass {}, reducing again",
                char_len(&combined),
                passes
            );
            current = Cow::Owned(combined);
        }
    }

    async fn summarize_direct(&self, text: &str) -> std::result::Result<String, ModelError> {
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.structured, &[("transcript", text)]);
        self.model.generate(&prompt).await
    }

    /// Summarize every chunk of `text` and join the results in chunk order.
    async fn summarize_chunks(&self, text: &str) -> Result<String> {
        let chunks = chunk_text(text, self.limits.max_chunk_size);
        info!("Summarizing {} chunks", chunks.len());

        let summaries = map_in_order(&chunks, self.limits.concurrency(), |index, chunk| async move {
            debug!("Summarizing chunk {} ({} chars)", index + 1, char_len(chunk));
            self.summarize_chunk(chunk).await
        })
        .await?;

        Ok(summaries.join("\n\n"))
    }

    async fn summarize_chunk(&self, chunk: &str) -> Result<String> {
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.chunk, &[("chunk", chunk)]);
        let summary = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| TldwError::model(Stage::ChunkSummary, e))?;
        Ok(summary.trim().to_string())
    }

    async fn combine(&self, summaries: &str) -> Result<String> {
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.combine, &[("summaries", summaries)]);
        self.model
            .generate(&prompt)
            .await
            .map_err(|e| TldwError::model(Stage::CombineSummaries, e))
    }
}
