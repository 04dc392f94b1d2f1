//! Interactive chat command.
//!
//! Keeps one transcript (and its summary, once generated) loaded across
//! questions, the way a browser session would.

use super::{load_transcript, start_session};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// One line of user input, interpreted.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    Help,
    Summary,
    Load(&'a str),
    Question(&'a str),
}

fn parse_chat_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "" => ChatInput::Empty,
        "exit" | "quit" | "/exit" | "/quit" if rest.is_empty() => ChatInput::Exit,
        "help" | "/help" if rest.is_empty() => ChatInput::Help,
        "summary" | "/summary" | "summarize" | "/summarize" if rest.is_empty() => ChatInput::Summary,
        "load" | "/load" if !rest.is_empty() => ChatInput::Load(rest),
        _ => ChatInput::Question(line),
    }
}

fn print_help() {
    println!(
        "{}\n",
        style("Ask anything about the video. Commands: 'summary', 'load <url>', 'exit'.").dim()
    );
}

/// Run the interactive chat command.
pub async fn run_chat(input: &str, settings: Settings) -> Result<()> {
    let mut session = start_session(&settings)?;
    load_transcript(&mut session, input).await?;

    println!("\n{}", style("tldw chat").bold().cyan());
    print_help();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_chat_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Help => print_help(),
            ChatInput::Load(input) => {
                // Errors are already reported, keep the previous transcript
                let _ = load_transcript(&mut session, input).await;
            }
            ChatInput::Summary => {
                let spinner = Output::spinner("Generating summary...");
                let result = session.summarize().await;
                spinner.finish_and_clear();
                match result {
                    Ok(summary) => println!("\n{}\n", summary.trim()),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
            ChatInput::Question(question) => {
                let spinner = Output::spinner("Thinking...");
                let result = session.ask(question).await;
                spinner.finish_and_clear();
                match result {
                    Ok(answer) => println!("\n{} {}\n", style("tldw:").cyan().bold(), answer.trim()),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_chat_input("   \n"), ChatInput::Empty);
        assert_eq!(parse_chat_input("exit\n"), ChatInput::Exit);
        assert_eq!(parse_chat_input("QUIT"), ChatInput::Exit);
        assert_eq!(parse_chat_input("/summary"), ChatInput::Summary);
        assert_eq!(parse_chat_input("help"), ChatInput::Help);
        assert_eq!(
            parse_chat_input("load https://youtu.be/dQw4w9WgXcQ\n"),
            ChatInput::Load("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_commands_with_extra_words_are_questions() {
        assert_eq!(
            parse_chat_input("summary of the second half?"),
            ChatInput::Question("summary of the second half?")
        );
        assert_eq!(parse_chat_input("load"), ChatInput::Question("load"));
        assert_eq!(
            parse_chat_input("  What is the main argument?  "),
            ChatInput::Question("What is the main argument?")
        );
    }
}
