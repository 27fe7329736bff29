//! History reconstruction — stored entries → display transcript.

use crate::types::{HistoryEntry, Message};

/// Rebuild the transcript of a session from its stored history.
///
/// Entries are taken in store order (never re-sorted by timestamp). Within an
/// entry the order is system message, question, answer; only the channels that
/// are present are emitted, and entries carrying none are skipped.
pub fn reconstruct(entries: &[HistoryEntry]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(entries.len() * 2);

    for entry in entries {
        if let Some(system) = entry.system_message() {
            messages.push(Message::bot_with_buttons(system, entry.buttons().to_vec()));
        }
        if let Some(question) = entry.question() {
            messages.push(Message::user(question));
        }
        if let Some(answer) = entry.answer() {
            messages.push(Message::bot(answer));
        }
    }

    messages
}
