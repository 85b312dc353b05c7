//! Observer live watch.
//!
//! While an observer is viewing results, a background task polls the
//! session row and folds the fetched snapshot into the shared session.
//! Dropping the handle stops the poller.

use std::sync::Arc;
use std::time::Duration;

use seergate_core::store::SessionStore;
use tokio::task::JoinHandle;

use crate::controller::TrialSession;
use crate::payload::SavePayload;

/// How often the observer refreshes from the session row.
pub const LIVE_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// A running live-watch poller. Aborts its task on drop.
#[derive(Debug)]
pub struct LiveWatch {
    handle: JoinHandle<()>,
}

impl Drop for LiveWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a poller that refreshes `session` from the row for `code` every
/// `interval`. Fetch failures and missing rows are logged and retried on
/// the next tick.
#[must_use]
pub fn spawn(
    session: Arc<tokio::sync::Mutex<TrialSession>>,
    store: Arc<dyn SessionStore>,
    code: String,
    interval: Duration,
) -> LiveWatch {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; the poll cadence starts
        // one interval out, matching the original timer.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.fetch(&code).await {
                Ok(Some(row)) => {
                    let payload: SavePayload = match serde_json::from_value(row.payload) {
                        Ok(payload) => payload,
                        Err(err) => {
                            tracing::warn!(code, error = %err, "session row payload corrupt");
                            continue;
                        }
                    };
                    session.lock().await.apply_remote_refresh(payload.ui);
                }
                Ok(None) => {
                    tracing::warn!(code, "no session row for live watch");
                }
                Err(err) => {
                    tracing::warn!(code, error = %err, "live watch fetch failed");
                }
            }
        }
    });
    LiveWatch { handle }
}
