//! CLI module for tldw.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// tldw - Too Long; Didn't Watch
///
/// Summarize YouTube videos and ask questions about them, however long they are.
#[derive(Parser, Debug)]
#[command(name = "tldw")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Model name to use instead of the configured one
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a video
    Summarize {
        /// YouTube URL/ID, or local transcript file (.txt, .md)
        input: String,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube URL/ID, or local transcript file (.txt, .md)
        input: String,

        /// The question to ask
        question: String,
    },

    /// Start an interactive session about a video
    Chat {
        /// YouTube URL/ID, or local transcript file (.txt, .md)
        input: String,
    },

    /// Fetch and print a transcript without calling the model
    Transcript {
        /// YouTube URL/ID, or local transcript file (.txt, .md)
        input: String,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Start HTTP API server for integration with other systems
    ///
    /// Accepts YouTube URLs and IDs only. Up to 64 transcripts are cached,
    /// oldest dropped first.
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tldw",
            "-vv",
            "ask",
            "https://youtu.be/dQw4w9WgXcQ",
            "What is the song about?",
            "--model",
            "gemini-2.0-flash",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("gemini-2.0-flash"));
        match cli.command {
            Commands::Ask { input, question } => {
                assert_eq!(input, "https://youtu.be/dQw4w9WgXcQ");
                assert_eq!(question, "What is the song about?");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["tldw", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 3000);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
