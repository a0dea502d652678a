//! Interactive console
//!
//! Lines are either one of a few commands or a free-text query for the
//! coordinator. Commands are matched case-insensitively; anything that is
//! not a command is treated as a query.

use std::future::Future;

use rustyline::error::ReadlineError;
use tokio::signal::ctrl_c;
use tracing::warn;

use super::Session;

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    ListModels,
    Switch(String),
    Status,
    Query(String),
    Empty,
}

const HELP: &str = "\
📖 Available commands:
- exit / quit / q / salir: leave the application
- help / h / ? / ayuda: show this help
- list-models / models / modelos: list the models installed in Ollama
- switch <model> / cambiar <model>: switch every agent to another model
- status: show the system status
Anything else is sent to the coordinator agent as a query.";

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let lower = line.to_lowercase();
    match lower.as_str() {
        "exit" | "quit" | "q" | "salir" => return Command::Exit,
        "help" | "h" | "?" | "ayuda" => return Command::Help,
        "list-models" | "models" | "modelos" => return Command::ListModels,
        "status" => return Command::Status,
        _ => {}
    }

    if let Some((keyword, rest)) = line.split_once(char::is_whitespace) {
        let keyword = keyword.to_lowercase();
        let name = rest.trim();
        if (keyword == "switch" || keyword == "cambiar") && !name.is_empty() {
            return Command::Switch(name.to_string());
        }
    }

    Command::Query(line.to_string())
}

/// Run `work` unless `interrupt` resolves first, in which case `work` is dropped.
///
/// The process keeps its SIGINT handler once Ctrl+C has been awaited, so every
/// long-running command must go through here to stay interruptible.
async fn until_interrupted<T>(work: impl Future<Output = T>, interrupt: impl Future) -> Option<T> {
    tokio::select! {
        value = work => Some(value),
        _ = interrupt => None,
    }
}

fn interrupted(what: &str) {
    warn!("Interrupted {} at the user's request", what);
    println!("\nError: {} was interrupted", what);
}

/// Read commands until the user exits. Ctrl+C or Ctrl+D at the prompt end the loop.
pub async fn run_repl(session: &mut Session) -> Result<(), ReadlineError> {
    let mut editor = rustyline::DefaultEditor::new()?;

    println!("\n🤖 Multiagent assistant");
    println!("Type 'exit' to quit");
    println!("Type 'help' to see the available commands");

    loop {
        let line = match editor.readline("\n🧠 Query: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => return Err(e),
        };

        let command = parse_command(&line);
        if command != Command::Empty {
            let _ = editor.add_history_entry(line.trim());
        }

        match command {
            Command::Empty => continue,
            Command::Exit => {
                println!("Goodbye!");
                break;
            }
            Command::Help => println!("\n{}", HELP),
            Command::ListModels => match until_interrupted(session.list_models(), ctrl_c()).await {
                Some(Ok(models)) => {
                    println!("\n📋 Models available in Ollama:");
                    println!("{}", models);
                }
                Some(Err(e)) => println!("Error listing models: {}", e),
                None => interrupted("listing models"),
            },
            Command::Switch(model) => {
                match until_interrupted(session.switch_model(&model), ctrl_c()).await {
                    Some(Ok(())) => println!("✅ Model switched to '{}'", model),
                    Some(Err(e)) => println!("❌ Could not switch to model '{}': {}", model, e),
                    None => interrupted("the model switch"),
                }
            }
            Command::Status => println!("\n{}", session.status()),
            Command::Query(query) => {
                match until_interrupted(session.respond(&query), ctrl_c()).await {
                    Some(answer) => println!("\n🤖 Answer: {}", answer),
                    None => interrupted("the query"),
                }
            }
        }
    }

    Ok(())
}
