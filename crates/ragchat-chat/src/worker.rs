//! Background job worker — fire-and-forget store calls, run in order.
//!
//! Saves of scripted messages and directory reloads never block the caller.
//! They go through one unbounded queue drained by a single task, so saves
//! reach the store in the order they were shown, and a reload never overtakes
//! the saves queued before it.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, warn};

use ragchat_core::session::SessionDirectory;
use ragchat_core::store::{SessionStore, StoreResult};

use crate::state::ConversationState;

/// A unit of background work.
#[derive(Debug)]
pub(crate) enum Job {
    /// Persist a bot-originated message.
    SaveSystemMessage {
        session_id: String,
        message: String,
        buttons: Option<Vec<String>>,
    },
    /// Re-read the directory from the store.
    ReloadDirectory,
    /// Signal once every job queued before this one has run.
    Flush(oneshot::Sender<()>),
}

/// Spawn the worker on the current Tokio runtime.
///
/// The worker exits once every sender has been dropped and the queue is drained.
pub(crate) fn spawn(
    store: Arc<dyn SessionStore>,
    state: Arc<RwLock<ConversationState>>,
) -> mpsc::UnboundedSender<Job> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            run_job(store.as_ref(), &state, job).await;
        }
        debug!("Background worker stopped");
    });

    tx
}

async fn run_job(store: &dyn SessionStore, state: &RwLock<ConversationState>, job: Job) {
    match job {
        Job::SaveSystemMessage {
            session_id,
            message,
            buttons,
        } => {
            if let Err(e) = store
                .save_system_message(&message, &session_id, buttons.as_deref())
                .await
            {
                warn!(session = %session_id, error = %e, "Failed to save system message");
            }
        }
        Job::ReloadDirectory => {
            if let Err(e) = reload_directory(store, state).await {
                warn!(error = %e, "Directory reload failed");
            }
        }
        Job::Flush(done) => {
            let _ = done.send(());
        }
    }
}

/// Reload the directory from the store and install it.
///
/// Returns `Ok(false)` when the result was discarded because the directory
/// was mutated locally while the reload was in flight. Only the directory is
/// touched, never the transcript or the current session.
pub(crate) async fn reload_directory(
    store: &dyn SessionStore,
    state: &RwLock<ConversationState>,
) -> StoreResult<bool> {
    let revision = state.read().await.directory_revision;
    let loaded = SessionDirectory::load(store).await?;

    let mut state = state.write().await;
    if state.directory_revision != revision {
        debug!("Discarding directory reload overtaken by local changes");
        return Ok(false);
    }
    debug!(sessions = loaded.len(), "Directory reloaded");
    state.directory.replace_all(loaded);
    Ok(true)
}
