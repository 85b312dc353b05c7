//! Cloud autosave with a single-flight write guard.
//!
//! At most one remote write is in flight per session. A push that arrives
//! while another is running is dropped, not queued: the next autosave will
//! carry the newer state anyway, so queueing would only add stale writes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use seergate_core::clock::Clock;
use seergate_core::store::SessionStore;
use serde::Serialize;

/// Where the remote sync currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudStatus {
    /// No write attempted yet.
    Idle,
    /// A write is in flight.
    Syncing,
    /// The last write succeeded.
    Synced,
    /// The last write failed.
    Error,
}

/// Snapshot of the sync indicator shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudState {
    /// Current status.
    pub status: CloudStatus,
    /// Message from the last failure, cleared on the next attempt.
    pub error: Option<String>,
    /// When the last successful write landed.
    pub updated_at: Option<DateTime<Utc>>,
}

/// How a push attempt resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The write reached the store.
    Completed,
    /// Another write was in flight; this one was discarded.
    Dropped,
    /// The write ran and failed.
    Failed(String),
}

/// The single-flight remote writer.
pub struct CloudSync {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    busy: AtomicBool,
    state: Mutex<CloudState>,
}

impl CloudSync {
    /// Creates an idle syncer over the given session store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            busy: AtomicBool::new(false),
            state: Mutex::new(CloudState {
                status: CloudStatus::Idle,
                error: None,
                updated_at: None,
            }),
        }
    }

    /// Current sync indicator.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    #[must_use]
    pub fn state(&self) -> CloudState {
        self.state.lock().unwrap().clone()
    }

    /// Pushes a payload to the session row, unless a push is in flight.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub async fn push(&self, code: &str, payload: &serde_json::Value) -> PushOutcome {
        if self.busy.swap(true, Ordering::SeqCst) {
            tracing::debug!(code, "cloud push dropped, write already in flight");
            return PushOutcome::Dropped;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.status = CloudStatus::Syncing;
            state.error = None;
        }

        let outcome = match self.store.upsert(code, payload).await {
            Ok(()) => {
                let mut state = self.state.lock().unwrap();
                state.status = CloudStatus::Synced;
                state.updated_at = Some(self.clock.now());
                PushOutcome::Completed
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(code, error = %message, "cloud push failed");
                let mut state = self.state.lock().unwrap();
                state.status = CloudStatus::Error;
                state.error = Some(message.clone());
                PushOutcome::Failed(message)
            }
        };

        self.busy.store(false, Ordering::SeqCst);
        outcome
    }
}
