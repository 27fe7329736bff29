//! Session directory — the ordered list of known sessions.
//!
//! Two ways in:
//! - [`SessionDirectory::load`] rebuilds the whole list from the store. This is
//!   the authoritative resync point.
//! - [`SessionDirectory::upsert_from_local_activity`] merges a local send into
//!   the list before the store has been re-read.
//!
//! Entries are kept sorted by `last_activity`, most recent first, with at most
//! one entry per id.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::store::{SessionStore, StoreResult};
use crate::types::{HistoryEntry, SessionEntry, SessionName};

/// Number of leading words used as a session name.
const NAME_WORDS: usize = 4;

/// Derive a session name from message text: its first four
/// whitespace-separated words joined by single spaces.
pub fn derive_name(text: &str) -> String {
    text.split_whitespace()
        .take(NAME_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

// ─────────────────────────────────────────────
// SessionDirectory
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionDirectory {
    entries: Vec<SessionEntry>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from arbitrary entries (sorted, deduplicated by id).
    pub fn from_entries(entries: Vec<SessionEntry>) -> Self {
        let mut dir = SessionDirectory::new();
        for entry in entries {
            if dir.get(&entry.id).is_none() {
                dir.entries.push(entry);
            }
        }
        dir.sort();
        dir
    }

    /// Load every session from the store.
    ///
    /// Histories are fetched one session at a time. A session whose history
    /// cannot be fetched is still listed, named by its id. Only a failure of
    /// the session listing itself fails the load.
    pub async fn load(store: &dyn SessionStore) -> StoreResult<Self> {
        let ids = store.list_sessions().await?;
        debug!(sessions = ids.len(), "Loading session directory");

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            if entries.iter().any(|e: &SessionEntry| e.id == id) {
                continue;
            }
            let entry = match store.get_history(&id).await {
                Ok(history) => summarize(&id, &history, Utc::now()),
                Err(e) => {
                    warn!(session = %id, error = %e, "Failed to load session history");
                    SessionEntry::new(id.clone(), SessionName::Named(id.clone()), Utc::now())
                }
            };
            entries.push(entry);
        }

        Ok(Self::from_entries(entries))
    }

    /// Merge a local send into the directory.
    ///
    /// An existing entry gets the new recency, and takes `name_hint` only while
    /// it is still unnamed. A missing entry is inserted. Nothing is removed and
    /// a name never reverts to the placeholder.
    pub fn upsert_from_local_activity(
        &mut self,
        id: &str,
        name_hint: &str,
        timestamp: DateTime<Utc>,
    ) {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.last_activity = timestamp;
                if entry.name.is_placeholder() && !name_hint.is_empty() {
                    entry.name = SessionName::Named(name_hint.to_string());
                }
            }
            None => {
                let name = if name_hint.is_empty() {
                    SessionName::Placeholder
                } else {
                    SessionName::Named(name_hint.to_string())
                };
                self.entries.push(SessionEntry::new(id, name, timestamp));
            }
        }
        self.sort();
    }

    /// Put a new session at the front, replacing any entry with the same id.
    pub fn insert_front(&mut self, entry: SessionEntry) {
        self.entries.retain(|e| e.id != entry.id);
        self.entries.insert(0, entry);
    }

    /// Remove a session. Returns whether it was listed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Replace the whole directory with an authoritative reload.
    pub fn replace_all(&mut self, other: SessionDirectory) {
        self.entries = other.entries;
    }

    pub fn get(&self, id: &str) -> Option<&SessionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort(&mut self) {
        // Stable: ties keep their current order.
        self.entries.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
    }
}

/// Name and recency of one session, from its history.
fn summarize(id: &str, history: &[HistoryEntry], now: DateTime<Utc>) -> SessionEntry {
    let Some(last) = history.last() else {
        return SessionEntry::placeholder(id, now);
    };

    let first_text = history
        .iter()
        .find_map(|e| e.question().or_else(|| e.system_message()))
        .unwrap_or("");
    let derived = derive_name(first_text);
    let name = if derived.is_empty() {
        id.to_string()
    } else {
        derived
    };

    SessionEntry::new(id, SessionName::Named(name), last.timestamp.unwrap_or(now))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Ack, QueryResponse, StoreError};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Read-only store with canned listings and histories.
    #[derive(Default)]
    struct CannedStore {
        ids: Vec<String>,
        histories: HashMap<String, Vec<HistoryEntry>>,
        broken: Vec<String>,
        list_fails: bool,
    }

    #[async_trait]
    impl SessionStore for CannedStore {
        async fn query(&self, _: &str, _: Option<&str>) -> StoreResult<QueryResponse> {
            unreachable!("directory never queries")
        }
        async fn create_session(&self) -> StoreResult<String> {
            unreachable!("directory never creates sessions")
        }
        async fn delete_session(&self, _: &str) -> StoreResult<Ack> {
            unreachable!("directory never deletes")
        }
        async fn list_sessions(&self) -> StoreResult<Vec<String>> {
            if self.list_fails {
                return Err(StoreError::Transport("connection refused".into()));
            }
            Ok(self.ids.clone())
        }
        async fn get_history(&self, id: &str) -> StoreResult<Vec<HistoryEntry>> {
            if self.broken.iter().any(|b| b == id) {
                return Err(StoreError::Malformed("unexpected EOF".into()));
            }
            Ok(self.histories.get(id).cloned().unwrap_or_default())
        }
        async fn save_system_message(
            &self,
            _: &str,
            _: &str,
            _: Option<&[String]>,
        ) -> StoreResult<Ack> {
            unreachable!("directory never saves")
        }
    }

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn question(text: &str, millis: i64) -> HistoryEntry {
        HistoryEntry {
            question: Some(text.to_string()),
            timestamp: Some(at(millis)),
            ..Default::default()
        }
    }

    fn names(dir: &SessionDirectory) -> Vec<(&str, &SessionName)> {
        dir.entries().iter().map(|e| (e.id.as_str(), &e.name)).collect()
    }

    // ── derive_name ──

    #[test]
    fn test_derive_name_first_four_words() {
        assert_eq!(derive_name("hello world foo bar baz"), "hello world foo bar");
    }

    #[test]
    fn test_derive_name_collapses_whitespace() {
        assert_eq!(derive_name("  a\tb\n\nc   d e"), "a b c d");
        assert_eq!(derive_name("short"), "short");
        assert_eq!(derive_name("   "), "");
    }

    // ── load ──

    #[tokio::test]
    async fn test_load_named_and_placeholder_sessions() {
        let mut store = CannedStore::default();
        store.ids = vec!["a".into(), "b".into()];
        store
            .histories
            .insert("a".into(), vec![question("hello world foo bar baz", 100)]);

        let before = Utc::now();
        let dir = SessionDirectory::load(&store).await.unwrap();

        assert_eq!(
            names(&dir),
            vec![
                ("b", &SessionName::Placeholder),
                ("a", &SessionName::Named("hello world foo bar".into())),
            ]
        );
        assert!(dir.get("b").unwrap().last_activity >= before);
        assert_eq!(dir.get("a").unwrap().last_activity, at(100));
    }

    #[tokio::test]
    async fn test_load_recency_is_last_entry_and_name_is_first_meaningful() {
        let mut store = CannedStore::default();
        store.ids = vec!["s".into()];
        store.histories.insert(
            "s".into(),
            vec![
                HistoryEntry {
                    answer: Some("orphan answer".into()),
                    timestamp: Some(at(10)),
                    ..Default::default()
                },
                HistoryEntry {
                    system_message: Some("Welcome to the gift certificate desk".into()),
                    timestamp: Some(at(20)),
                    ..Default::default()
                },
                question("later question", 30),
            ],
        );

        let dir = SessionDirectory::load(&store).await.unwrap();
        let entry = dir.get("s").unwrap();
        assert_eq!(entry.name, SessionName::Named("Welcome to the gift".into()));
        assert_eq!(entry.last_activity, at(30));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_id_when_no_meaningful_text() {
        let mut store = CannedStore::default();
        store.ids = vec!["abc-123".into()];
        store.histories.insert(
            "abc-123".into(),
            vec![HistoryEntry {
                answer: Some("only answers here".into()),
                timestamp: Some(at(5)),
                ..Default::default()
            }],
        );

        let dir = SessionDirectory::load(&store).await.unwrap();
        assert_eq!(
            dir.get("abc-123").unwrap().name,
            SessionName::Named("abc-123".into())
        );
    }

    #[tokio::test]
    async fn test_load_isolates_per_session_failures() {
        let mut store = CannedStore::default();
        store.ids = vec!["ok".into(), "bad".into()];
        store.histories.insert("ok".into(), vec![question("fine", 50)]);
        store.broken = vec!["bad".into()];

        let before = Utc::now();
        let dir = SessionDirectory::load(&store).await.unwrap();

        assert_eq!(dir.len(), 2);
        let bad = dir.get("bad").unwrap();
        assert_eq!(bad.name, SessionName::Named("bad".into()));
        assert!(bad.last_activity >= before);
        assert_eq!(dir.entries()[0].id, "bad");
    }

    #[tokio::test]
    async fn test_load_collapses_duplicate_ids() {
        let mut store = CannedStore::default();
        store.ids = vec!["a".into(), "a".into()];
        let dir = SessionDirectory::load(&store).await.unwrap();
        assert_eq!(dir.len(), 1);
    }

    #[tokio::test]
    async fn test_load_fails_when_listing_fails() {
        let store = CannedStore {
            list_fails: true,
            ..Default::default()
        };
        let err = SessionDirectory::load(&store).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    // ── upsert_from_local_activity ──

    #[test]
    fn test_upsert_names_placeholder_once() {
        let mut dir = SessionDirectory::new();
        dir.insert_front(SessionEntry::placeholder("s", at(1)));

        dir.upsert_from_local_activity("s", "first question", at(2));
        dir.upsert_from_local_activity("s", "second question", at(3));

        let entry = dir.get("s").unwrap();
        assert_eq!(entry.name, SessionName::Named("first question".into()));
        assert_eq!(entry.last_activity, at(3));
    }

    #[test]
    fn test_upsert_never_regresses_to_placeholder() {
        let mut dir = SessionDirectory::new();
        dir.upsert_from_local_activity("s", "named", at(1));
        dir.upsert_from_local_activity("s", "", at(2));
        assert_eq!(dir.get("s").unwrap().name, SessionName::Named("named".into()));
    }

    #[test]
    fn test_upsert_inserts_unknown_session() {
        let mut dir = SessionDirectory::from_entries(vec![SessionEntry::new(
            "old",
            SessionName::Named("old one".into()),
            at(1),
        )]);

        dir.upsert_from_local_activity("fresh", "hello there", at(9));

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.entries()[0].id, "fresh");
        assert_eq!(
            dir.get("fresh").unwrap().name,
            SessionName::Named("hello there".into())
        );
    }

    #[test]
    fn test_upsert_order_tracks_latest_activity() {
        let mut dir = SessionDirectory::from_entries(vec![
            SessionEntry::placeholder("a", at(1)),
            SessionEntry::placeholder("b", at(2)),
            SessionEntry::placeholder("c", at(3)),
        ]);

        for (i, id) in ["a", "c", "b", "a"].iter().enumerate() {
            dir.upsert_from_local_activity(id, "hint", at(10 + i as i64));
        }

        let order: Vec<&str> = dir.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(dir
            .entries()
            .windows(2)
            .all(|w| w[0].last_activity >= w[1].last_activity));
    }

    #[test]
    fn test_upsert_never_removes() {
        let mut dir = SessionDirectory::from_entries(vec![
            SessionEntry::placeholder("a", at(1)),
            SessionEntry::placeholder("b", at(2)),
        ]);
        dir.upsert_from_local_activity("a", "x", at(3));
        assert_eq!(dir.len(), 2);
    }

    // ── other mutations ──

    #[test]
    fn test_insert_front_replaces_same_id() {
        let mut dir = SessionDirectory::from_entries(vec![
            SessionEntry::placeholder("a", at(5)),
            SessionEntry::placeholder("b", at(4)),
        ]);
        dir.insert_front(SessionEntry::placeholder("b", at(6)));

        let order: Vec<&str> = dir.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_remove() {
        let mut dir = SessionDirectory::from_entries(vec![SessionEntry::placeholder("a", at(1))]);
        assert!(dir.remove("a"));
        assert!(!dir.remove("a"));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_summarize_missing_timestamp_uses_now() {
        let now = at(777);
        let entry = summarize(
            "s",
            &[HistoryEntry {
                question: Some("q".into()),
                ..Default::default()
            }],
            now,
        );
        assert_eq!(entry.last_activity, now);
    }
}
