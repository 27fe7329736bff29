//! Interactive REPL over the conversation controller.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Plain lines are questions; slash commands manage sessions and press
//! the quick-reply buttons of the latest bot message.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::{debug, warn};

use ragchat_chat::ConversationController;
use ragchat_core::types::{Message, SessionEntry};
use ragchat_core::utils::get_history_path;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    New,
    Sessions,
    Open(String),
    Delete(String),
    Press(usize),
    Help,
    Exit,
    Say(String),
    Invalid(String),
}

/// Run the interactive REPL loop.
pub async fn run(controller: ConversationController, session: Option<String>) -> Result<()> {
    helpers::print_banner();

    if let Err(e) = controller.refresh_directory().await {
        eprintln!("⚠ Could not load sessions: {e}");
    }
    if let Some(id) = session {
        match controller.select_session(&id).await {
            Ok(()) => print_transcript(&controller.transcript().await, 0),
            Err(e) => eprintln!("⚠ Could not open session {id}: {e}"),
        }
    }

    let mut editor = create_editor()?;
    let mut shown = controller.transcript().await.len();

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&input);

        let command = parse_command(trimmed);
        debug!(?command, "repl input");

        // Switching sessions replaces the transcript, so reprint from the top.
        let mut reprint = false;
        match command {
            Command::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            Command::Help => helpers::print_help(),
            Command::Invalid(reason) => eprintln!("⚠ {reason}"),
            Command::Sessions => {
                if let Err(e) = controller.refresh_directory().await {
                    warn!(error = %e, "session list refresh failed");
                }
                let current = controller.current_session().await;
                helpers::print_sessions(&controller, &controller.sessions().await, current.as_deref());
            }
            Command::New => match controller.start_new_session().await {
                Ok(_) => reprint = true,
                Err(e) => eprintln!("\n❌ Error: {e}\n"),
            },
            Command::Open(target) => {
                let id = resolve_target(&controller.sessions().await, &target);
                match controller.select_session(&id).await {
                    Ok(()) => reprint = true,
                    Err(e) => eprintln!("\n❌ Error: {e}\n"),
                }
            }
            Command::Delete(target) => {
                let id = resolve_target(&controller.sessions().await, &target);
                let was_current = controller.current_session().await.as_deref() == Some(id.as_str());
                match controller.delete_session(&id).await {
                    Ok(()) => {
                        helpers::print_notice(&format!("deleted {id}"));
                        reprint = was_current;
                    }
                    Err(e) => eprintln!("\n❌ Error: {e}\n"),
                }
            }
            Command::Press(n) => {
                let transcript = controller.transcript().await;
                match button_label(&transcript, n) {
                    Some(label) => controller.handle_guided_button(&label).await,
                    None => eprintln!("⚠ No button [{n}] on the last message"),
                }
            }
            Command::Say(text) => {
                helpers::print_thinking();
                controller.send_message(&text).await;
                helpers::clear_thinking();
                // The question itself is already on screen.
                shown += 1;
            }
        }

        let transcript = controller.transcript().await;
        if reprint || transcript.len() < shown {
            shown = 0;
        }
        print_transcript(&transcript, shown);
        shown = transcript.len();
    }

    controller.settle().await;
    save_history(&mut editor);

    Ok(())
}

fn parse_command(input: &str) -> Command {
    if is_exit_command(input) {
        return Command::Exit;
    }
    if !input.starts_with('/') {
        return Command::Say(input.to_string());
    }

    let (name, arg) = match input.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (input, ""),
    };
    match (name, arg) {
        ("/new", _) => Command::New,
        ("/sessions", _) => Command::Sessions,
        ("/help", _) => Command::Help,
        ("/open" | "/delete", "") => Command::Invalid(format!("{name} needs a session number or id")),
        ("/open", arg) => Command::Open(arg.to_string()),
        ("/delete", arg) => Command::Delete(arg.to_string()),
        ("/press", arg) => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Command::Press(n),
            _ => Command::Invalid("/press needs a button number".to_string()),
        },
        _ => Command::Invalid(format!("unknown command {name}, try /help")),
    }
}

/// A 1-based index into the listed sessions, or a literal session id.
fn resolve_target(sessions: &[SessionEntry], target: &str) -> String {
    target
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| sessions.get(i))
        .map(|entry| entry.id.clone())
        .unwrap_or_else(|| target.to_string())
}

/// Label of button `n` (1-based) on the latest bot message.
fn button_label(transcript: &[Message], n: usize) -> Option<String> {
    transcript
        .iter()
        .rev()
        .find(|m| !m.is_user())
        .and_then(|m| m.buttons.get(n.checked_sub(1)?))
        .cloned()
}

fn print_transcript(transcript: &[Message], from: usize) {
    let last_bot = transcript.iter().rposition(|m| !m.is_user());
    for (i, message) in transcript.iter().enumerate().skip(from) {
        helpers::print_message(message, Some(i) == last_bot);
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
