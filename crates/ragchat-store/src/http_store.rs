//! HTTP client for the RAG backend's session API.
//!
//! Speaks JSON over HTTP/1.1 to the six endpoints of the remote session store:
//! `rag_query`, `new_chat_session`, `delete_chat_session/{id}`,
//! `list_chat_sessions`, `get_chat_history/{id}`, `save_system_message`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use ragchat_core::config::schema::StoreConfig;
use ragchat_core::store::{
    Ack, CreateSessionResponse, HistoryResponse, QueryRequest, QueryResponse,
    SessionListResponse, SessionStore, StoreError, StoreResult, SystemMessageRequest,
};
use ragchat_core::types::HistoryEntry;

// ─────────────────────────────────────────────
// HttpSessionStore
// ─────────────────────────────────────────────

/// A [`SessionStore`] backed by the backend's HTTP API.
pub struct HttpSessionStore {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// Base URL without trailing slash (e.g. `"http://127.0.0.1:8601"`).
    base_url: String,
}

impl std::fmt::Debug for HttpSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSessionStore")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpSessionStore {
    /// Create a client for the store at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpSessionStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `store` config section.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// `{base}/{endpoint}/{session_id}`, with the id percent-encoded as one
    /// path segment.
    fn session_url(&self, endpoint: &str, session_id: &str) -> StoreResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.url(endpoint))
            .map_err(|e| StoreError::Transport(format!("invalid store URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::Transport(format!("store URL cannot hold a path: {}", self.base_url))
            })?
            .push(session_id);
        Ok(url)
    }

    /// Turn a raw response into a typed body, classifying failures.
    ///
    /// `subject` names what was requested (used for not-found reporting).
    async fn decode<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        subject: &str,
        result: reqwest::Result<reqwest::Response>,
    ) -> StoreResult<T> {
        let response = match result {
            Ok(resp) => resp,
            Err(e) => {
                error!(operation, error = %e, "HTTP request failed");
                return Err(StoreError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            error!(operation, subject, "Store reported not found");
            return Err(StoreError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(operation, status = %status, body = %body, "Store error");
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!(operation, error = %e, "Failed to parse store response");
            StoreError::Malformed(e.to_string())
        })
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn query(&self, question: &str, session_id: Option<&str>) -> StoreResult<QueryResponse> {
        debug!(session = session_id.unwrap_or("-"), "Sending query");

        let mut request = self.client.post(self.url("rag_query"));
        if let Some(id) = session_id {
            request = request.query(&[("session_id", id)]);
        }
        let body = QueryRequest {
            question: question.to_string(),
        };

        let result = request.json(&body).send().await;
        let response: QueryResponse = self
            .decode("rag_query", session_id.unwrap_or("rag_query"), result)
            .await?;

        debug!(
            session = response.session_id.as_deref().unwrap_or("-"),
            has_answer = response.answer.is_some(),
            source = response.source.as_deref().unwrap_or("-"),
            "Query answered"
        );
        Ok(response)
    }

    async fn create_session(&self) -> StoreResult<String> {
        let result = self.client.post(self.url("new_chat_session")).send().await;
        let response: CreateSessionResponse =
            self.decode("new_chat_session", "new_chat_session", result).await?;
        debug!(session = %response.session_id, "Session created");
        Ok(response.session_id)
    }

    async fn delete_session(&self, session_id: &str) -> StoreResult<Ack> {
        let url = self.session_url("delete_chat_session", session_id)?;
        let result = self.client.delete(url).send().await;
        let ack: Ack = self.decode("delete_chat_session", session_id, result).await?;
        debug!(
            session = session_id,
            status = ack.status.as_deref().unwrap_or("-"),
            "Session delete acknowledged"
        );
        Ok(ack)
    }

    async fn list_sessions(&self) -> StoreResult<Vec<String>> {
        let result = self.client.get(self.url("list_chat_sessions")).send().await;
        let response: SessionListResponse =
            self.decode("list_chat_sessions", "list_chat_sessions", result).await?;
        Ok(response.sessions)
    }

    async fn get_history(&self, session_id: &str) -> StoreResult<Vec<HistoryEntry>> {
        let url = self.session_url("get_chat_history", session_id)?;
        let result = self.client.get(url).send().await;
        let response: HistoryResponse =
            self.decode("get_chat_history", session_id, result).await?;
        debug!(
            session = session_id,
            entries = response.history.len(),
            "History fetched"
        );
        Ok(response.history)
    }

    async fn save_system_message(
        &self,
        message: &str,
        session_id: &str,
        buttons: Option<&[String]>,
    ) -> StoreResult<Ack> {
        let body = SystemMessageRequest {
            message: message.to_string(),
            session_id: session_id.to_string(),
            buttons: buttons.map(|b| b.to_vec()),
        };
        let result = self
            .client
            .post(self.url("save_system_message"))
            .json(&body)
            .send()
            .await;
        self.decode("save_system_message", session_id, result).await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
