//! Interactive chat mode.

use crate::config::{Config, Settings};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_domain::SessionId;
use folio_engine::QaEngine;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the interactive chat.
pub async fn run_chat(engine: &QaEngine, settings: &Settings, formatter: &Formatter) -> Result<()> {
    let owner = engine
        .store()
        .owner()
        .map(|o| o.name.clone())
        .unwrap_or_else(|| "the portfolio owner".to_string());
    println!(
        "{}",
        formatter.info(&format!(
            "Ask anything about {}. Type '/help' for commands, 'exit' to quit",
            owner
        ))
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(settings.history_size)?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut session_id = SessionId::generate();

    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => print_help(formatter),
                    Ok(ReplCommand::NewSession) => {
                        session_id = SessionId::generate();
                        println!("{}", formatter.success("Started a new conversation"));
                    }
                    Ok(ReplCommand::History) => {
                        let turns = engine.history(&session_id).await.unwrap_or_default();
                        println!("{}", formatter.format_history(&turns));
                    }
                    Ok(ReplCommand::Stats) => {
                        println!("{}", engine.metrics().summary());
                    }
                    Ok(ReplCommand::Ask(question)) => match engine.ask(&session_id, &question).await {
                        Ok(reply) => {
                            if reply.session_id != session_id {
                                println!(
                                    "{}",
                                    formatter.warning("Conversation expired, starting over")
                                );
                                session_id = reply.session_id.clone();
                            }
                            match formatter.format_reply(&reply) {
                                Ok(text) => println!("{}", text),
                                Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                            }
                        }
                        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                    },
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
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

/// Chat input kinds.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Exit,
    Help,
    NewSession,
    History,
    Stats,
    Ask(String),
}

/// Parse a chat input line.
///
/// Lines starting with `/` are commands; everything else is a question.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let line = line.trim();

    if line.is_empty() {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    }

    if matches!(line, "exit" | "quit" | "q") {
        return Ok(ReplCommand::Exit);
    }

    let Some(command) = line.strip_prefix('/') else {
        return Ok(ReplCommand::Ask(line.to_string()));
    };

    match command.trim() {
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        "help" | "?" => Ok(ReplCommand::Help),
        "new" | "reset" => Ok(ReplCommand::NewSession),
        "history" => Ok(ReplCommand::History),
        "stats" => Ok(ReplCommand::Stats),
        other => Err(CliError::InvalidInput(format!(
            "Unknown command: /{}. Type '/help' for available commands.",
            other
        ))),
    }
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Type a question to ask it. Commands:"));
    println!();
    println!("  /new       Start a new conversation");
    println!("  /history   Show this conversation");
    println!("  /stats     Show engine counters");
    println!("  /help      Show this help message");
    println!("  exit       Exit the chat");
    println!();
}

/// Get the history file path.
fn get_history_path() -> Result<PathBuf> {
    let dir = Config::dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}
