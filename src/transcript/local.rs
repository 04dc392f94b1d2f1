//! Local transcript files.

use super::{SourceType, Transcript, TranscriptSource};
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use std::path::Path;

/// Supported transcript file extensions.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Plain-text transcript files on disk.
pub struct LocalTranscriptSource;

impl LocalTranscriptSource {
    pub fn new() -> Self {
        Self
    }

    fn is_text_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl Default for LocalTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for LocalTranscriptSource {
    fn source_type(&self) -> SourceType {
        SourceType::Local
    }

    fn can_handle(&self, input: &str) -> bool {
        Self::is_text_file(Path::new(input))
    }

    fn extract_id(&self, input: &str) -> Option<String> {
        self.can_handle(input).then(|| input.to_string())
    }

    async fn fetch(&self, id: &str) -> Result<Transcript> {
        let path = Path::new(id);

        if !path.is_file() {
            return Err(TldwError::TranscriptUnavailable(format!("file not found: {}", id)));
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return Err(TldwError::TranscriptUnavailable(format!("{} is empty", id)));
        }

        let video_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("local")
            .to_string();

        Ok(Transcript::new(video_id, text))
    }
}
