//! Core types for ragchat — sessions, history entries, and transcript messages.
//!
//! `HistoryEntry` mirrors what the remote store persists; `Message` is the
//! display unit of the in-memory transcript; `SessionEntry` is one row of the
//! session directory.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────
// Transcript messages
// ─────────────────────────────────────────────

/// Who authored a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message of the visible transcript.
///
/// `buttons` are quick replies offered by the bot; empty means none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<String>,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            sender: Sender::User,
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    /// Create a bot message without buttons.
    pub fn bot(text: impl Into<String>) -> Self {
        Message {
            sender: Sender::Bot,
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    /// Create a bot message offering quick-reply buttons.
    pub fn bot_with_buttons(text: impl Into<String>, buttons: Vec<String>) -> Self {
        Message {
            sender: Sender::Bot,
            text: text.into(),
            buttons,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

// ─────────────────────────────────────────────
// History entries (remote store records)
// ─────────────────────────────────────────────

/// One persisted record of a session's history, as returned by the store.
///
/// Any subset of `question` / `answer` / `system_message` may be present.
/// Empty strings are treated the same as absent fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(
        default,
        alias = "systemMessage",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<String>>,
    /// Retrieval source the backend recorded for an answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    /// The user question, if present and non-empty.
    pub fn question(&self) -> Option<&str> {
        non_empty(&self.question)
    }

    /// The bot answer, if present and non-empty.
    pub fn answer(&self) -> Option<&str> {
        non_empty(&self.answer)
    }

    /// The system message, if present and non-empty.
    pub fn system_message(&self) -> Option<&str> {
        non_empty(&self.system_message)
    }

    /// Buttons attached to the system message (empty if none).
    pub fn buttons(&self) -> &[String] {
        self.buttons.as_deref().unwrap_or(&[])
    }

    /// Whether the entry carries none of the three text channels.
    pub fn is_degenerate(&self) -> bool {
        self.question().is_none() && self.answer().is_none() && self.system_message().is_none()
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Decode a store timestamp leniently.
///
/// Accepts RFC 3339 strings, naive ISO-8601 strings (local time), and
/// numbers (Unix epoch milliseconds). Anything else decodes to `None`
/// instead of failing the whole history.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_timestamp))
}

/// Parse a timestamp value in any of the formats the store emits.
pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => parse_timestamp_str(s),
        serde_json::Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = s.parse::<NaiveDateTime>().ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

// ─────────────────────────────────────────────
// Session directory rows
// ─────────────────────────────────────────────

/// Display name of a session.
///
/// `Placeholder` renders as the localized "new session" label and is the only
/// state an optimistic upsert may overwrite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionName {
    Placeholder,
    Named(String),
}

impl SessionName {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, SessionName::Placeholder)
    }

    /// Render the name, substituting `placeholder` for the placeholder state.
    pub fn display<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            SessionName::Placeholder => placeholder,
            SessionName::Named(name) => name,
        }
    }
}

/// One known session: id, display name, recency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: String,
    pub name: SessionName,
    pub last_activity: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new(id: impl Into<String>, name: SessionName, last_activity: DateTime<Utc>) -> Self {
        SessionEntry {
            id: id.into(),
            name,
            last_activity,
        }
    }

    /// A freshly created, still unnamed session.
    pub fn placeholder(id: impl Into<String>, last_activity: DateTime<Utc>) -> Self {
        Self::new(id, SessionName::Placeholder, last_activity)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
