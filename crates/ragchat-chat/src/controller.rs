//! Conversation controller — owner of the current session, the transcript,
//! and the session directory.
//!
//! Every store call goes through here. Store failures never escape as broken
//! state: each entry point logs the error and degrades (fallback text, a kept
//! transcript, an unchanged directory). Operations the UI may want to report
//! also return the error.
//!
//! # Ordering
//!
//! - `send_message` appends the user's message before the query is issued.
//! - A reply is tagged with the session it was sent from and is shown only
//!   while that session is still current.
//! - History loads are tagged with the transcript epoch at the time they were
//!   issued; a newer load, a new session, or a delete makes them stale.
//!   Messages appended while a load is in flight survive it.
//! - Directory reloads run in the background and only ever replace the
//!   directory.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, error, info, warn};

use ragchat_core::locale::{Locale, LocaleText};
use ragchat_core::session::{derive_name, reconstruct};
use ragchat_core::store::{SessionStore, StoreResult};
use ragchat_core::types::{Message, SessionEntry};

use crate::guided::{GuidedAction, GuidedFlows};
use crate::state::ConversationState;
use crate::worker::{self, Job};

// ─────────────────────────────────────────────
// ConversationController
// ─────────────────────────────────────────────

pub struct ConversationController {
    store: Arc<dyn SessionStore>,
    state: Arc<RwLock<ConversationState>>,
    flows: GuidedFlows,
    text: &'static LocaleText,
    jobs: mpsc::UnboundedSender<Job>,
}

impl ConversationController {
    /// Create a controller over `store`.
    ///
    /// Spawns the background worker, so this must be called from within a
    /// Tokio runtime.
    pub fn new(store: Arc<dyn SessionStore>, locale: Locale) -> Self {
        let state = Arc::new(RwLock::new(ConversationState::default()));
        let jobs = worker::spawn(store.clone(), state.clone());

        ConversationController {
            store,
            state,
            flows: GuidedFlows::new(locale),
            text: locale.text(),
            jobs,
        }
    }

    // ── Session lifecycle ──

    /// Create a session, make it current, and greet the user.
    ///
    /// The greeting is shown immediately and saved in the background.
    pub async fn start_new_session(&self) -> StoreResult<String> {
        let id = match self.store.create_session().await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Failed to create session");
                return Err(e);
            }
        };

        let greeting = self.flows.greeting();
        {
            let mut state = self.state.write().await;
            state.current_session = Some(id.clone());
            state.next_epoch();
            state.reset_transcript();
            state.push_local(Some(id.clone()), greeting.clone());
            state
                .directory
                .insert_front(SessionEntry::placeholder(&id, Utc::now()));
            state.touch_directory();
        }
        self.persist(&id, &greeting);

        info!(session = %id, "Started new session");
        Ok(id)
    }

    /// Make `id` current and load its transcript from the store.
    ///
    /// On failure the previous transcript stays visible. A response that
    /// arrives after the user has moved on is discarded.
    pub async fn select_session(&self, id: &str) -> StoreResult<()> {
        let epoch = {
            let mut state = self.state.write().await;
            state.current_session = Some(id.to_string());
            state.next_epoch()
        };

        let history = match self.store.get_history(id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(session = %id, error = %e, "Failed to load session history");
                return Err(e);
            }
        };
        let loaded = reconstruct(&history);

        let mut state = self.state.write().await;
        if state.transcript_epoch != epoch {
            debug!(session = %id, "Discarding stale session history");
            return Ok(());
        }
        debug!(session = %id, messages = loaded.len(), "Session selected");
        state.install(id, loaded);
        Ok(())
    }

    /// Delete a session remotely, then forget it locally.
    pub async fn delete_session(&self, id: &str) -> StoreResult<()> {
        if let Err(e) = self.store.delete_session(id).await {
            error!(session = %id, error = %e, "Failed to delete session");
            return Err(e);
        }

        let mut state = self.state.write().await;
        state.directory.remove(id);
        state.touch_directory();
        if state.current_session.as_deref() == Some(id) {
            state.current_session = None;
            state.reset_transcript();
            state.next_epoch();
        }
        info!(session = %id, "Deleted session");
        Ok(())
    }

    // ── Messaging ──

    /// Send a question and append the reply.
    ///
    /// Empty or whitespace-only text is ignored. The user's message is shown
    /// before the query goes out. The reply is the answer, the fallback text
    /// when the store gave none, or the error text when the query failed. It
    /// is appended only if the session it was sent from is still current, but
    /// it is returned either way. Returns `None` only when nothing was sent.
    pub async fn send_message(&self, text: &str) -> Option<Message> {
        if text.trim().is_empty() {
            return None;
        }

        let (session, question) = {
            let mut state = self.state.write().await;
            let session = state.current_session.clone();
            let question = state.push_local(session.clone(), Message::user(text));
            (session, question)
        };

        let response = match self.store.query(text, session.as_deref()).await {
            Ok(response) => response,
            Err(e) => {
                error!(session = session.as_deref().unwrap_or("-"), error = %e, "Query failed");
                let reply = Message::bot(self.text.send_error);
                let mut state = self.state.write().await;
                if state.current_session == session {
                    state.deliver_reply(question, session, reply.clone());
                }
                return Some(reply);
            }
        };

        let answer = response
            .answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| self.text.no_answer.to_string());
        let reply = Message::bot(answer);
        let resolved = response
            .session_id
            .filter(|s| !s.is_empty())
            .or_else(|| session.clone());
        let origin = session.clone().or_else(|| resolved.clone());

        {
            let mut state = self.state.write().await;
            if session.is_none() && state.current_session.is_none() {
                if let Some(id) = &resolved {
                    state.adopt(id);
                }
            }
            if state.current_session == origin {
                state.deliver_reply(question, origin.clone(), reply.clone());
            } else {
                debug!("Reply arrived after a session switch; not appending");
            }

            match &resolved {
                Some(id) => {
                    state
                        .directory
                        .upsert_from_local_activity(id, &derive_name(text), Utc::now());
                    state.touch_directory();
                }
                None => warn!("Store answered without a session id"),
            }
        }

        self.enqueue(Job::ReloadDirectory);
        Some(reply)
    }

    /// React to a quick-reply button.
    ///
    /// Does nothing without a current session or for unknown labels. Scripted
    /// exchanges are shown in the session that is current when the button is
    /// handled and saved to it in the background; FAQ labels are sent as
    /// questions.
    pub async fn handle_guided_button(&self, label: &str) {
        let action = self.flows.resolve(label);

        let session = {
            let mut state = self.state.write().await;
            let Some(session) = state.current_session.clone() else {
                debug!(label, "Ignoring button without a current session");
                return;
            };
            if let GuidedAction::TaskLookup(exchange) | GuidedAction::MerchantLookup(exchange) =
                &action
            {
                for message in exchange.messages() {
                    state.push_local(Some(session.clone()), message);
                }
            }
            session
        };

        match action {
            GuidedAction::TaskLookup(exchange) | GuidedAction::MerchantLookup(exchange) => {
                for message in exchange.messages() {
                    self.persist(&session, &message);
                }
            }
            GuidedAction::FaqQuestion(question) => {
                self.send_message(&question).await;
            }
            GuidedAction::Unrecognized => {
                debug!(label, "Ignoring unrecognized button");
            }
        }
    }

    // ── Directory ──

    /// Reload the directory from the store and wait for it.
    ///
    /// Returns `Ok(false)` if local changes overtook the reload.
    pub async fn refresh_directory(&self) -> StoreResult<bool> {
        worker::reload_directory(self.store.as_ref(), &self.state)
            .await
            .inspect_err(|e| warn!(error = %e, "Directory reload failed"))
    }

    /// Wait until every background job queued so far has run.
    pub async fn settle(&self) {
        let (tx, rx) = oneshot::channel();
        if self.jobs.send(Job::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    // ── Snapshots ──

    pub async fn current_session(&self) -> Option<String> {
        self.state.read().await.current_session.clone()
    }

    pub async fn transcript(&self) -> Vec<Message> {
        self.state.read().await.transcript()
    }

    /// Known sessions, most recent first.
    pub async fn sessions(&self) -> Vec<SessionEntry> {
        self.state.read().await.directory.entries().to_vec()
    }

    pub fn text(&self) -> &'static LocaleText {
        self.text
    }

    /// Name of a session as it should be displayed.
    pub fn display_name<'a>(&self, entry: &'a SessionEntry) -> &'a str {
        entry.name.display(self.text.placeholder_name)
    }

    // ── Internals ──

    /// Queue a bot-originated message for saving.
    fn persist(&self, session_id: &str, message: &Message) {
        let buttons = if message.buttons.is_empty() {
            None
        } else {
            Some(message.buttons.clone())
        };
        self.enqueue(Job::SaveSystemMessage {
            session_id: session_id.to_string(),
            message: message.text.clone(),
            buttons,
        });
    }

    fn enqueue(&self, job: Job) {
        if self.jobs.send(job).is_err() {
            warn!("Background worker is gone; dropping job");
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
