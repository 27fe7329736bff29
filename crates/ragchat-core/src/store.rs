//! Remote session store contract — the abstraction over the RAG backend.
//!
//! The controller and the session directory only ever talk to the backend
//! through [`SessionStore`]. `ragchat-store` provides the HTTP implementation;
//! tests substitute an in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::HistoryEntry;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Coarse failure classes used for degradation decisions and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection refused, timeout, non-2xx status.
    Network,
    /// The response body could not be decoded.
    Malformed,
    /// The store does not know the requested session.
    NotFound,
}

/// A failed call to the remote session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Transport(_) | StoreError::Status { .. } => ErrorKind::Network,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Malformed(_) => ErrorKind::Malformed,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

/// Body of `POST /rag_query`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// Response of `POST /rag_query`.
///
/// `session_id` is the session the exchange was recorded under; the store
/// creates one when the query carried none.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Response of `POST /new_chat_session`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Response of `GET /list_chat_sessions`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionListResponse {
    #[serde(default)]
    pub sessions: Vec<String>,
}

/// Response of `GET /get_chat_history/{id}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Body of `POST /save_system_message`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemMessageRequest {
    pub message: String,
    pub session_id: String,
    pub buttons: Option<Vec<String>>,
}

/// Acknowledgement returned by delete and save calls.
///
/// The backend reports e.g. `{"status": "ok"}`; the content is informational.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

// ─────────────────────────────────────────────
// SessionStore trait
// ─────────────────────────────────────────────

/// The six operations of the remote session store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Ask a question. With `session_id = None` the store opens a new session.
    async fn query(&self, question: &str, session_id: Option<&str>) -> StoreResult<QueryResponse>;

    /// Create an empty session and return its id.
    async fn create_session(&self) -> StoreResult<String>;

    /// Delete a session.
    async fn delete_session(&self, session_id: &str) -> StoreResult<Ack>;

    /// List all session ids, in store order.
    async fn list_sessions(&self) -> StoreResult<Vec<String>>;

    /// Fetch a session's history, oldest first.
    async fn get_history(&self, session_id: &str) -> StoreResult<Vec<HistoryEntry>>;

    /// Persist a bot-originated message outside the Q&A path.
    async fn save_system_message(
        &self,
        message: &str,
        session_id: &str,
        buttons: Option<&[String]>,
    ) -> StoreResult<Ack>;
}
