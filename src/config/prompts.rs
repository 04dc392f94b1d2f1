//! Prompt templates for tldw.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub qa: QaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    /// Structured summary of a transcript that fits in one call. Uses `{{transcript}}`.
    pub structured: String,
    /// Summary of one chunk during reduction. Uses `{{chunk}}`.
    pub chunk: String,
    /// Structured summary built from chunk summaries. Uses `{{summaries}}`.
    pub combine: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            structured: r#"Summarize the following YouTube video transcript in a concise manner.
Structure the summary as:
- TL;DR: A one-sentence overview.
- Key Points: Bullet list of 5-10 main ideas.
- Conclusion: Any final thoughts or takeaways.

Transcript: {{transcript}}"#
                .to_string(),

            chunk: r#"Provide a concise summary of the following transcript chunk, focusing on key points, main ideas, and any important details. Keep it under 1000 words.

Chunk: {{chunk}}"#
                .to_string(),

            combine: r#"Combine and summarize these chunk summaries into a cohesive overall summary.
Structure as:
- TL;DR: A one-sentence overview.
- Key Points: Bullet list of 5-10 main ideas.
- Conclusion: Any final thoughts or takeaways.

Chunk Summaries: {{summaries}}"#
                .to_string(),
        }
    }
}

/// Prompts for question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    /// Answer from the full transcript. Uses `{{question}}` and `{{transcript}}`.
    pub direct: String,
    /// Answer from extracted excerpts. Uses `{{question}}` and `{{excerpts}}`.
    pub excerpts: String,
    /// Verbatim excerpt extraction from one chunk. Uses `{{question}}` and `{{chunk}}`.
    pub extract: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            direct: r#"Answer the following question based on the YouTube video transcript provided.
Be concise, accurate, and cite relevant parts if possible.
If the answer isn't in the transcript, say "The transcript does not contain information on this."

Question: {{question}}
Transcript: {{transcript}}"#
                .to_string(),

            excerpts: r#"Answer the following question based on the provided relevant excerpts from the YouTube video transcript.
Be concise, accurate, and cite relevant parts if possible.
If the answer isn't in the excerpts, say "The transcript does not contain information on this."

Question: {{question}}
Excerpts: {{excerpts}}"#
                .to_string(),

            extract: r#"Extract any parts from the following transcript chunk that are relevant to answering the question: "{{question}}".
If nothing is relevant, respond with exactly "None".
Otherwise, return the relevant excerpts verbatim, separated by newlines.

Chunk: {{chunk}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass over the template: substituted values are
    /// never scanned for placeholders, so transcript text containing `{{...}}`
    /// is inserted literally. Unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            match after_open.find("}}") {
                Some(end) => {
                    let key = after_open[..end].trim();
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after_open[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &[(&str, &str)]) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert((*key).to_string(), (*value).to_string());
        }
        Self::render(template, &merged)
    }
}
