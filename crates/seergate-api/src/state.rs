//! Shared application state.

use std::sync::{Arc, Mutex};

use seergate_core::clock::Clock;
use seergate_core::rng::RandomSource;
use seergate_core::store::{DocumentStore, SessionStore};
use seergate_divination::deck::Deck;
use seergate_session::cloud::CloudSync;
use seergate_session::controller::TrialSession;
use seergate_session::live_watch::LiveWatch;
use seergate_session::payload::SavePayload;

/// Remote-sync half of the state, absent when no database is configured.
#[derive(Clone)]
pub struct CloudHandle {
    /// The session row store.
    pub store: Arc<dyn SessionStore>,
    /// Single-flight writer over the store.
    pub sync: Arc<CloudSync>,
    /// Session code autosaves push to, set when a session is created or
    /// adopted.
    pub code: Arc<Mutex<Option<String>>>,
    /// Running observer poller, if live watch is on.
    pub watch: Arc<Mutex<Option<LiveWatch>>>,
}

impl CloudHandle {
    /// Creates a handle with no active code or watch.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        let sync = Arc::new(CloudSync::new(store.clone(), clock));
        Self {
            store,
            sync,
            code: Arc::new(Mutex::new(None)),
            watch: Arc::new(Mutex::new(None)),
        }
    }

    /// The active session code, if any.
    ///
    /// # Panics
    ///
    /// Panics if the code mutex is poisoned.
    #[must_use]
    pub fn current_code(&self) -> Option<String> {
        self.code.lock().unwrap().clone()
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single live trial session.
    pub session: Arc<tokio::sync::Mutex<TrialSession>>,
    /// Local document persistence (save, history, unlocks, gate memory).
    pub local: Arc<dyn DocumentStore>,
    /// The card deck, for codex listings.
    pub deck: Deck,
    /// Clock used for timestamps.
    pub clock: Arc<dyn Clock>,
    /// Entropy for session-code generation.
    pub entropy: Arc<dyn RandomSource>,
    /// Remote sync, when configured.
    pub cloud: Option<CloudHandle>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        session: Arc<tokio::sync::Mutex<TrialSession>>,
        local: Arc<dyn DocumentStore>,
        deck: Deck,
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn RandomSource>,
        cloud: Option<CloudHandle>,
    ) -> Self {
        Self {
            session,
            local,
            deck,
            clock,
            entropy,
            cloud,
        }
    }

    /// Pushes an autosave payload to the active session row, if remote sync
    /// is configured and a code is set. Failures are already reflected in
    /// the sync status; nothing propagates to the caller.
    pub async fn push_cloud(&self, payload: &SavePayload) {
        let Some(cloud) = &self.cloud else {
            return;
        };
        let Some(code) = cloud.current_code() else {
            return;
        };
        match serde_json::to_value(payload) {
            Ok(doc) => {
                cloud.sync.push(&code, &doc).await;
            }
            Err(err) => tracing::warn!(error = %err, "cloud payload serialization failed"),
        }
    }
}
