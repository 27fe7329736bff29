//! In-memory `SessionStore` fake for controller tests.
//!
//! Records every call, serves canned histories, can fail selected
//! operations, and can hold a query or history fetch until the test
//! releases it, either before or after the history is read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use ragchat_core::store::{Ack, QueryResponse, SessionStore, StoreError, StoreResult};
use ragchat_core::types::HistoryEntry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Query {
        question: String,
        session_id: Option<String>,
    },
    Create,
    Delete(String),
    List,
    History(String),
    SaveSystem {
        message: String,
        session_id: String,
        buttons: Option<Vec<String>>,
    },
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    sessions: Vec<String>,
    histories: HashMap<String, Vec<HistoryEntry>>,
    next_ids: Vec<String>,
    answer: Option<String>,
    fail_query: bool,
    fail_create: bool,
    fail_delete: bool,
    fail_history: Vec<String>,
    gates: HashMap<String, Arc<Notify>>,
    held: HashMap<String, Arc<Notify>>,
    query_gate: Option<Arc<Notify>>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeStore {
    inner: Arc<Mutex<Inner>>,
}

impl FakeStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.set_answer(Some("canned answer"));
        store
    }

    pub fn add_session(&self, id: &str, history: Vec<HistoryEntry>) {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.push(id.to_string());
        inner.histories.insert(id.to_string(), history);
    }

    /// Ids handed out by `create_session` (and by `query` without a session).
    pub fn queue_ids(&self, ids: &[&str]) {
        self.inner.lock().unwrap().next_ids = ids.iter().rev().map(|s| s.to_string()).collect();
    }

    pub fn set_answer(&self, answer: Option<&str>) {
        self.inner.lock().unwrap().answer = answer.map(String::from);
    }

    pub fn fail_query(&self) {
        self.inner.lock().unwrap().fail_query = true;
    }

    pub fn fail_create(&self) {
        self.inner.lock().unwrap().fail_create = true;
    }

    pub fn fail_delete(&self) {
        self.inner.lock().unwrap().fail_delete = true;
    }

    pub fn fail_history(&self, id: &str) {
        self.inner.lock().unwrap().fail_history.push(id.to_string());
    }

    /// Hold `get_history(id)` until the returned notify fires.
    pub fn gate_history(&self, id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner
            .lock()
            .unwrap()
            .gates
            .insert(id.to_string(), gate.clone());
        gate
    }

    /// Read the history of `id` at once, but hold the response until the
    /// returned notify fires.
    pub fn hold_history(&self, id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner
            .lock()
            .unwrap()
            .held
            .insert(id.to_string(), gate.clone());
        gate
    }

    /// Hold the next `query` until the returned notify fires.
    pub fn gate_query(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner.lock().unwrap().query_gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn saves(&self) -> Vec<(String, Option<Vec<String>>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SaveSystem {
                    message, buttons, ..
                } => Some((message, buttons)),
                _ => None,
            })
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Query { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn next_id(&self) -> String {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_ids.pop().unwrap_or_else(|| "generated".to_string());
        inner.sessions.push(id.clone());
        inner.histories.entry(id.clone()).or_default();
        id
    }
}

#[async_trait]
impl SessionStore for FakeStore {
    async fn query(&self, question: &str, session_id: Option<&str>) -> StoreResult<QueryResponse> {
        self.record(Call::Query {
            question: question.to_string(),
            session_id: session_id.map(String::from),
        });
        let gate = self.inner.lock().unwrap().query_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let (fail, answer) = {
            let inner = self.inner.lock().unwrap();
            (inner.fail_query, inner.answer.clone())
        };
        if fail {
            return Err(StoreError::Transport("connection refused".into()));
        }
        let sid = match session_id {
            Some(id) => id.to_string(),
            None => self.next_id(),
        };
        {
            let mut inner = self.inner.lock().unwrap();
            inner.histories.entry(sid.clone()).or_default().push(HistoryEntry {
                question: Some(question.to_string()),
                answer: answer.clone(),
                timestamp: Some(chrono::Utc::now()),
                ..Default::default()
            });
        }
        Ok(QueryResponse {
            answer,
            session_id: Some(sid),
            source: None,
        })
    }

    async fn create_session(&self) -> StoreResult<String> {
        self.record(Call::Create);
        if self.inner.lock().unwrap().fail_create {
            return Err(StoreError::Status {
                status: 500,
                body: "disk full".into(),
            });
        }
        Ok(self.next_id())
    }

    async fn delete_session(&self, session_id: &str) -> StoreResult<Ack> {
        self.record(Call::Delete(session_id.to_string()));
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete {
            return Err(StoreError::Transport("connection reset".into()));
        }
        inner.sessions.retain(|s| s != session_id);
        inner.histories.remove(session_id);
        Ok(Ack {
            status: Some("deleted".into()),
            session_id: Some(session_id.to_string()),
        })
    }

    async fn list_sessions(&self) -> StoreResult<Vec<String>> {
        self.record(Call::List);
        Ok(self.inner.lock().unwrap().sessions.clone())
    }

    async fn get_history(&self, session_id: &str) -> StoreResult<Vec<HistoryEntry>> {
        self.record(Call::History(session_id.to_string()));
        let gate = self.inner.lock().unwrap().gates.remove(session_id);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let (held, snapshot) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_history.iter().any(|id| id == session_id) {
                return Err(StoreError::NotFound(session_id.to_string()));
            }
            let snapshot = inner.histories.get(session_id).cloned().unwrap_or_default();
            (inner.held.remove(session_id), snapshot)
        };
        if let Some(held) = held {
            held.notified().await;
        }
        Ok(snapshot)
    }

    async fn save_system_message(
        &self,
        message: &str,
        session_id: &str,
        buttons: Option<&[String]>,
    ) -> StoreResult<Ack> {
        self.record(Call::SaveSystem {
            message: message.to_string(),
            session_id: session_id.to_string(),
            buttons: buttons.map(|b| b.to_vec()),
        });
        let mut inner = self.inner.lock().unwrap();
        inner
            .histories
            .entry(session_id.to_string())
            .or_default()
            .push(HistoryEntry {
                system_message: Some(message.to_string()),
                buttons: buttons.map(|b| b.to_vec()),
                timestamp: Some(chrono::Utc::now()),
                ..Default::default()
            });
        Ok(Ack {
            status: Some("ok".into()),
            session_id: None,
        })
    }
}
