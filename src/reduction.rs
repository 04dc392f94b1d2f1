//! Shared plumbing for map-reduce over chunks.

use crate::error::{Result, TldwError};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

/// Size and fan-out limits threaded into the summarizer and question answerer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReductionLimits {
    /// Per-chunk bound, in characters, used when a text is split for reduction.
    pub max_chunk_size: usize,
    /// Largest text, in characters, sent to the model in one call.
    pub max_context_size: usize,
    /// Reduced passes allowed before the operation fails.
    pub max_reduction_passes: usize,
    /// Per-chunk model calls allowed in flight at once.
    pub max_concurrent_calls: usize,
}

impl Default for ReductionLimits {
    fn default() -> Self {
        Self {
            max_chunk_size: 20_000,
            max_context_size: 50_000,
            max_reduction_passes: 8,
            max_concurrent_calls: 2,
        }
    }
}

impl ReductionLimits {
    /// Check the limits are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(TldwError::Config("max_chunk_size must be positive".to_string()));
        }
        if self.max_chunk_size >= self.max_context_size {
            return Err(TldwError::Config(format!(
                "max_chunk_size ({}) must be smaller than max_context_size ({})",
                self.max_chunk_size, self.max_context_size
            )));
        }
        if self.max_reduction_passes == 0 {
            return Err(TldwError::Config(
                "max_reduction_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `text` can be sent in a single model call.
    pub fn fits_context(&self, text: &str) -> bool {
        char_len(text) <= self.max_context_size
    }

    pub(crate) fn concurrency(&self) -> usize {
        self.max_concurrent_calls.max(1)
    }
}

/// Length of `text` in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Run `f` over every chunk with bounded concurrency.
///
/// Results come back in chunk order regardless of completion order. The first
/// error in chunk order aborts the whole map and drops the calls still in flight.
pub async fn map_in_order<'a, F, Fut, T>(
    chunks: &'a [String],
    concurrency: usize,
    f: F,
) -> Result<Vec<T>>
where
    F: Fn(usize, &'a str) -> Fut,
    Fut: Future<Output = Result<T>> + 'a,
{
    let calls: Vec<Fut> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| f(index, chunk.as_str()))
        .collect();
    stream::iter(calls)
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}
