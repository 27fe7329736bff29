//! Shared CLI helpers — path expansion, transcript and session printing, banner.

use std::path::PathBuf;

use chrono::Local;
use colored::Colorize;

use ragchat_chat::ConversationController;
use ragchat_core::types::{Message, SessionEntry, Sender};
use ragchat_core::utils::truncate_string;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print one transcript message. Bot buttons are numbered for `/press`.
pub fn print_message(message: &Message, pressable: bool) {
    match message.sender {
        Sender::User => println!("{} {}", "You:".green().bold(), message.text),
        Sender::Bot => {
            println!();
            println!("{}", "💬 ragchat".cyan().bold());
            if message.text.is_empty() {
                println!("{}", "(empty)".dimmed());
            } else {
                println!("{}", message.text);
            }
            if !message.buttons.is_empty() {
                let hint = if pressable { "/press" } else { "" };
                println!("{}", format_buttons(&message.buttons, hint).yellow());
            }
            println!();
        }
    }
}

/// Render buttons as `[1] first  [2] second`, optionally prefixed by a hint.
pub fn format_buttons(buttons: &[String], hint: &str) -> String {
    let rendered = buttons
        .iter()
        .enumerate()
        .map(|(i, label)| format!("[{}] {label}", i + 1))
        .collect::<Vec<_>>()
        .join("  ");
    if hint.is_empty() {
        rendered
    } else {
        format!("{hint} {rendered}")
    }
}

/// Print the session list, marking the current session.
pub fn print_sessions(
    controller: &ConversationController,
    sessions: &[SessionEntry],
    current: Option<&str>,
) {
    println!();
    if sessions.is_empty() {
        println!("{}", "(no sessions)".dimmed());
        println!();
        return;
    }

    for (i, entry) in sessions.iter().enumerate() {
        let marker = if current == Some(entry.id.as_str()) {
            "▸".green().to_string()
        } else {
            " ".to_string()
        };
        let name = truncate_string(controller.display_name(entry), 40);
        let when = entry
            .last_activity
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M");
        println!(
            "{marker} {:>3}  {:<40}  {}  {}",
            i + 1,
            name,
            when.to_string().dimmed(),
            entry.id.dimmed()
        );
    }
    println!();
}

/// Print a dimmed one-line notice.
pub fn print_notice(text: &str) {
    println!("{}", text.dimmed());
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "💬 ragchat".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a question, /help for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print the REPL command reference.
pub fn print_help() {
    println!();
    println!("  {:<18} {}", "/new".bold(), "start a new session");
    println!("  {:<18} {}", "/sessions".bold(), "list sessions");
    println!("  {:<18} {}", "/open <n|id>".bold(), "open a session");
    println!("  {:<18} {}", "/delete <n|id>".bold(), "delete a session");
    println!("  {:<18} {}", "/press <n>".bold(), "press a button on the last bot message");
    println!("  {:<18} {}", "exit".bold(), "quit");
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
