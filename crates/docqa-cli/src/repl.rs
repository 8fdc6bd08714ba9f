//! Interactive chat about a single document.

use crate::commands::ask_and_record;
use crate::config::data_dir;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use docqa_domain::Document;
use rustyline::config::Config as EditorConfig;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the chat loop for one document.
pub async fn run_chat(
    raw_id: &str,
    session: &mut Session,
    formatter: &Formatter,
    history_size: usize,
) -> Result<()> {
    let document = session.document(raw_id)?;

    println!(
        "{}",
        formatter.info(&format!(
            "Chatting about '{}' ({} chunks). Type 'help' for commands, 'exit' to quit",
            document.title(),
            document.chunks_count()
        ))
    );
    println!();

    let editor_config = EditorConfig::builder()
        .max_history_size(history_size)
        .map_err(|e| CliError::Config(format!("Invalid history size: {}", e)))?
        .auto_add_history(false)
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)
        .map_err(|e| CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e))))?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        match editor.readline("docqa> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_chat_line(line) {
                    ChatCommand::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ChatCommand::Help => print_help(formatter),
                    ChatCommand::Summary => summarize(session, &document, formatter).await,
                    ChatCommand::Question(question) => {
                        if let Err(e) = ask(session, &document, &question, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand {
    Exit,
    Help,
    Summary,
    Question(String),
}

fn parse_chat_line(line: &str) -> ChatCommand {
    match line {
        "exit" | "quit" | "q" => ChatCommand::Exit,
        "help" | "?" => ChatCommand::Help,
        "summary" | "/summary" => ChatCommand::Summary,
        _ => ChatCommand::Question(line.to_string()),
    }
}

async fn ask(session: &mut Session, document: &Document, question: &str, formatter: &Formatter) -> Result<()> {
    let (answer, record) = ask_and_record(session, document, question).await?;
    println!("{}", formatter.format_answer(&answer, &record)?);
    println!();
    Ok(())
}

async fn summarize(session: &Session, document: &Document, formatter: &Formatter) {
    let outcome = session.assistant().summarize(document).await;
    match formatter.format_summary(document, &outcome) {
        Ok(text) => println!("{}\n", text),
        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
    }
}

fn get_history_path() -> Result<PathBuf> {
    let dir = data_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("chat_history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  <question>        - Ask a question about the document");
    println!("  summary           - Summarize the document");
    println!("  help, ?           - Show this help");
    println!("  exit, quit, q     - Leave the chat");
    println!();
}
