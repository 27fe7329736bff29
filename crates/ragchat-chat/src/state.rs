//! Mutable conversation state owned by the controller.
//!
//! The visible transcript is the history last loaded from the store followed
//! by the messages appended locally since. Local messages are tagged with the
//! session they belong to, so a history load can keep the ones the store has
//! not caught up with yet.

use ragchat_core::session::SessionDirectory;
use ragchat_core::types::Message;

/// A message appended locally, not yet seen in a loaded history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LocalMessage {
    pub seq: u64,
    pub session: Option<String>,
    pub message: Message,
}

/// Everything the controller mutates, behind one lock.
#[derive(Debug, Default)]
pub(crate) struct ConversationState {
    pub current_session: Option<String>,
    /// Transcript as reconstructed by the last history load.
    pub loaded: Vec<Message>,
    /// Appended since the last load, in display order.
    pub local: Vec<LocalMessage>,
    pub directory: SessionDirectory,
    /// Bumped whenever a history load is issued or the transcript is reset
    /// (new session, delete). A load tagged with an older epoch is dropped.
    pub transcript_epoch: u64,
    /// Bumped on every local directory mutation. A reload that started
    /// before a local mutation is discarded.
    pub directory_revision: u64,
    next_seq: u64,
}

impl ConversationState {
    /// Start a new transcript epoch and return it.
    pub fn next_epoch(&mut self) -> u64 {
        self.transcript_epoch += 1;
        self.transcript_epoch
    }

    pub fn touch_directory(&mut self) {
        self.directory_revision += 1;
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.loaded
            .iter()
            .chain(self.local.iter().map(|m| &m.message))
            .cloned()
            .collect()
    }

    /// Replace the whole transcript, e.g. for a fresh or deleted session.
    pub fn reset_transcript(&mut self) {
        self.loaded.clear();
        self.local.clear();
    }

    /// Append a message for `session` and return its sequence number.
    pub fn push_local(&mut self, session: Option<String>, message: Message) -> u64 {
        self.next_seq += 1;
        self.local.push(LocalMessage {
            seq: self.next_seq,
            session,
            message,
        });
        self.next_seq
    }

    /// Make `id` current for a send that started without a session.
    pub fn adopt(&mut self, id: &str) {
        self.current_session = Some(id.to_string());
        for m in self.local.iter_mut().filter(|m| m.session.is_none()) {
            m.session = Some(id.to_string());
        }
    }

    /// Install the history of `session`.
    ///
    /// Local messages of other sessions are dropped. Local messages of this
    /// session that the history already ends with are dropped too, the rest
    /// stay after it.
    pub fn install(&mut self, session: &str, loaded: Vec<Message>) {
        self.local.retain(|m| m.session.as_deref() == Some(session));
        let delivered = delivered_prefix(&loaded, &self.local);
        self.local.drain(..delivered);
        self.loaded = loaded;
    }

    /// Append the reply to the local message `question`.
    ///
    /// When a load already absorbed the question, the history may hold the
    /// answer as well; it is not shown twice.
    pub fn deliver_reply(&mut self, question: u64, session: Option<String>, reply: Message) {
        let pending = self.local.iter().any(|m| m.seq == question);
        if !pending && self.local.is_empty() && self.loaded.last() == Some(&reply) {
            return;
        }
        self.push_local(session, reply);
    }
}

/// How many leading local messages `loaded` already ends with.
///
/// The store may also hold one trailing answer that has not reached us yet.
/// Senders are not compared: scripted echoes come back as system messages.
fn delivered_prefix(loaded: &[Message], local: &[LocalMessage]) -> usize {
    let ends_with = |k: usize, skip: usize| {
        loaded.len() >= k + skip
            && loaded[loaded.len() - skip - k..loaded.len() - skip]
                .iter()
                .zip(&local[..k])
                .all(|(l, m)| l.text == m.message.text && l.buttons == m.message.buttons)
    };
    (1..=local.len())
        .rev()
        .find(|&k| ends_with(k, 0) || ends_with(k, 1))
        .unwrap_or(0)
}
