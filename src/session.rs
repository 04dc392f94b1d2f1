//! Per-video session state.
//!
//! Holds the model-backed components together with the current transcript
//! and its summary, so follow-up questions reuse what was already fetched.

use crate::config::{Prompts, Settings, TranscriptSettings};
use crate::error::{Result, TldwError};
use crate::llm::{create_model, LanguageModel};
use crate::qa::QuestionAnswerer;
use crate::reduction::ReductionLimits;
use crate::summarize::Summarizer;
use crate::transcript::{fetch_transcript, Transcript};
use std::sync::Arc;
use tracing::{info, instrument};

/// A summarize/ask session over one transcript at a time.
pub struct Session {
    transcript_settings: TranscriptSettings,
    summarizer: Summarizer,
    answerer: QuestionAnswerer,
    transcript: Option<Transcript>,
    summary: Option<String>,
}

impl Session {
    /// Create a session from settings, building the configured model backend.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let limits = settings.reduction_limits()?;
        let model = create_model(&settings.model)?;

        info!("Using {} model {}", settings.model.provider, model.name());

        Ok(Self::with_components(
            model,
            prompts,
            limits,
            settings.transcript.clone(),
        ))
    }

    /// Create a session with custom components.
    pub fn with_components(
        model: Arc<dyn LanguageModel>,
        prompts: Prompts,
        limits: ReductionLimits,
        transcript_settings: TranscriptSettings,
    ) -> Self {
        Self {
            transcript_settings,
            summarizer: Summarizer::new(model.clone(), limits).with_prompts(prompts.clone()),
            answerer: QuestionAnswerer::new(model, limits).with_prompts(prompts),
            transcript: None,
            summary: None,
        }
    }

    /// Fetch the transcript for `input` (URL, video ID or file) and make it current.
    #[instrument(skip(self))]
    pub async fn load(&mut self, input: &str) -> Result<&Transcript> {
        let transcript = fetch_transcript(input, &self.transcript_settings).await?;
        info!(
            "Loaded transcript for {} ({} chars)",
            transcript.video_id,
            transcript.char_count()
        );
        Ok(self.set_transcript(transcript))
    }

    /// Make `transcript` current. A different video drops the cached summary.
    pub fn set_transcript(&mut self, transcript: Transcript) -> &Transcript {
        let same_video = self
            .transcript
            .as_ref()
            .is_some_and(|current| current == &transcript);
        if !same_video {
            self.summary = None;
        }
        self.transcript.insert(transcript)
    }

    /// The current transcript, if one is loaded.
    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    /// The cached summary of the current transcript, if one was generated.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn current(&self) -> Result<&Transcript> {
        self.transcript
            .as_ref()
            .ok_or_else(|| TldwError::InvalidInput("No transcript loaded".to_string()))
    }

    /// Summarize the current transcript, reusing the cached summary if there is one.
    pub async fn summarize(&mut self) -> Result<String> {
        if let Some(summary) = &self.summary {
            return Ok(summary.clone());
        }

        let summary = self.summarizer.summarize(&self.current()?.text).await?;
        self.summary = Some(summary.clone());
        Ok(summary)
    }

    /// Answer a question about the current transcript.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TldwError::InvalidInput("Question is empty".to_string()));
        }
        self.answerer.answer(question, &self.current()?.text).await
    }

    /// The summarizer used by this session.
    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// The question answerer used by this session.
    pub fn answerer(&self) -> &QuestionAnswerer {
        &self.answerer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;

    fn session_with(model: Arc<ScriptedModel>) -> Session {
        Session::with_components(
            model,
            Prompts::default(),
            ReductionLimits::default(),
            TranscriptSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_summary_is_cached_per_transcript() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("TL;DR: cached".to_string())));
        let mut session = session_with(model.clone());

        session.set_transcript(Transcript::new("a", "First video text."));
        assert_eq!(session.summarize().await.unwrap(), "TL;DR: cached");
        assert_eq!(session.summarize().await.unwrap(), "TL;DR: cached");
        assert_eq!(model.call_count(), 1);

        // Re-setting the same transcript keeps the summary
        session.set_transcript(Transcript::new("a", "First video text."));
        assert_eq!(session.summary(), Some("TL;DR: cached"));

        session.set_transcript(Transcript::new("b", "Second video text."));
        assert!(session.summary().is_none());
        session.summarize().await.unwrap();
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_requires_transcript() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("unused".to_string())));
        let mut session = session_with(model.clone());

        assert!(matches!(session.summarize().await, Err(TldwError::InvalidInput(_))));
        assert!(matches!(session.ask("Why?").await, Err(TldwError::InvalidInput(_))));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_question() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("unused".to_string())));
        let mut session = session_with(model.clone());
        session.set_transcript(Transcript::new("a", "Some text."));

        assert!(matches!(session.ask("   ").await, Err(TldwError::InvalidInput(_))));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_load_local_transcript_and_ask() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.txt");
        std::fs::write(&path, "Ownership moves values.\nBorrowing lends them.").unwrap();

        let model = Arc::new(ScriptedModel::new(|_| Ok("Values move.".to_string())));
        let mut session = session_with(model.clone());

        let transcript = session.load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(transcript.video_id, "lecture");

        let answer = session.ask("  What happens to values?  ").await.unwrap();
        assert_eq!(answer, "Values move.");
        let prompt = &model.prompts()[0];
        assert!(prompt.contains("Question: What happens to values?\n"));
        assert!(prompt.ends_with("Ownership moves values. Borrowing lends them."));
    }
}
