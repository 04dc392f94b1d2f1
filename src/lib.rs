//! tldw - Too Long; Didn't Watch
//!
//! Summarize YouTube videos and answer questions about them with a generative
//! language model, no matter how long the transcript is.
//!
//! # Overview
//!
//! A transcript that fits the model's context window is handled in a single
//! call. Longer transcripts are split into sentence-aligned chunks and reduced
//! map-reduce style:
//! - summaries are built per chunk and then combined, recursively if needed
//! - questions are answered from the relevant excerpts extracted per chunk
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Transcript sources (YouTube captions, local files)
//! - `llm` - Language model backends (Gemini, OpenAI)
//! - `chunking` - Sentence-aligned text chunking
//! - `reduction` - Size limits and the ordered concurrent map over chunks
//! - `summarize` - Map-reduce summarization
//! - `qa` - Extract-then-answer question answering
//! - `session` - Per-video state for interactive use
//!
//! # Example
//!
//! ```rust,no_run
//! use tldw::config::Settings;
//! use tldw::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load_from(None)?;
//!     let mut session = Session::new(&settings)?;
//!
//!     session.load("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     println!("{}", session.summarize().await?);
//!     println!("{}", session.ask("What is promised?").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod qa;
pub mod reduction;
pub mod session;
pub mod summarize;
pub mod transcript;

pub use error::{Result, TldwError};
