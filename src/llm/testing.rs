//! Scripted language model for unit tests.

use super::{LanguageModel, ModelError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type Responder = dyn Fn(&str) -> Result<String, ModelError> + Send + Sync;

/// Answers every prompt through a closure and records what it was asked.
pub(crate) struct ScriptedModel {
    responder: Box<Responder>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, ModelError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of recorded prompts containing `marker`.
    pub(crate) fn count_containing(&self, marker: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(marker))
            .count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
