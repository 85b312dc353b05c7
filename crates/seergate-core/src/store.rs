//! Persistence ports.
//!
//! Two stores back a trial: a local `DocumentStore` holding one whole JSON
//! document per named store (save snapshot, run history, unlocks, gate
//! memory), and an optional remote `SessionStore` holding one row per
//! session code for the observer to watch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Whole-document local persistence, keyed by fixed store names.
///
/// Loaders treat missing and corrupt documents identically: `load` returns
/// `None` and the caller falls back to a typed default. There are no partial
/// updates; `save` replaces the document.
pub trait DocumentStore: Send + Sync {
    /// Loads the document for `store`, or `None` if absent or unreadable.
    fn load(&self, store: &str) -> Option<serde_json::Value>;

    /// Replaces the document for `store`.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Infrastructure` if the document cannot be
    /// written. Callers on the play path log and continue.
    fn save(&self, store: &str, doc: &serde_json::Value) -> Result<(), GateError>;

    /// Removes the document for `store`, if present.
    fn clear(&self, store: &str);
}

/// One remote session row, shared between player and observer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    /// The session code.
    pub code: String,
    /// The save payload (same shape as the local snapshot).
    pub payload: serde_json::Value,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last upsert time.
    pub updated_at: DateTime<Utc>,
}

/// Remote session persistence: upsert/fetch of one row per code.
///
/// Deliberately last-write-wins: there is no version check, so two writers
/// against the same code overwrite each other. Sharing a code is a
/// conflict-avoidance policy, not conflict resolution.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts or replaces the payload for `code`.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Infrastructure` on storage failure.
    async fn upsert(&self, code: &str, payload: &serde_json::Value) -> Result<(), GateError>;

    /// Fetches the row for `code`, or `None` if no such session exists.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Infrastructure` on storage failure.
    async fn fetch(&self, code: &str) -> Result<Option<SessionRow>, GateError>;
}
