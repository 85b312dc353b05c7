//! Test stores — mock `DocumentStore` and `SessionStore` implementations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use seergate_core::error::GateError;
use seergate_core::store::{DocumentStore, SessionRow, SessionStore};

/// An in-memory `DocumentStore` backed by a map.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<std::collections::HashMap<String, serde_json::Value>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds a document, for restore-path tests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed(&self, store: &str, doc: serde_json::Value) {
        self.documents
            .lock()
            .unwrap()
            .insert(store.to_owned(), doc);
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, store: &str) -> Option<serde_json::Value> {
        self.documents.lock().unwrap().get(store).cloned()
    }

    fn save(&self, store: &str, doc: &serde_json::Value) -> Result<(), GateError> {
        self.documents
            .lock()
            .unwrap()
            .insert(store.to_owned(), doc.clone());
        Ok(())
    }

    fn clear(&self, store: &str) {
        self.documents.lock().unwrap().remove(store);
    }
}

/// A session store that records every upsert and serves a configurable row.
#[derive(Debug, Default)]
pub struct RecordingSessionStore {
    row: Mutex<Option<SessionRow>>,
    upserts: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingSessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row `fetch` will return.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_row(&self, row: SessionRow) {
        *self.row.lock().unwrap() = Some(row);
    }

    /// Snapshot of all `(code, payload)` pairs upserted so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn upserts(&self) -> Vec<(String, serde_json::Value)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for RecordingSessionStore {
    async fn upsert(&self, code: &str, payload: &serde_json::Value) -> Result<(), GateError> {
        self.upserts
            .lock()
            .unwrap()
            .push((code.to_owned(), payload.clone()));
        let mut row = self.row.lock().unwrap();
        let now = Utc::now();
        *row = Some(SessionRow {
            code: code.to_owned(),
            payload: payload.clone(),
            created_at: row.as_ref().map_or(now, |r| r.created_at),
            updated_at: now,
        });
        Ok(())
    }

    async fn fetch(&self, code: &str) -> Result<Option<SessionRow>, GateError> {
        Ok(self
            .row
            .lock()
            .unwrap()
            .clone()
            .filter(|row| row.code == code))
    }
}

/// A session store that always fails with an infrastructure error.
#[derive(Debug, Default)]
pub struct FailingSessionStore;

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn upsert(&self, _code: &str, _payload: &serde_json::Value) -> Result<(), GateError> {
        Err(GateError::Infrastructure("connection refused".into()))
    }

    async fn fetch(&self, _code: &str) -> Result<Option<SessionRow>, GateError> {
        Err(GateError::Infrastructure("connection refused".into()))
    }
}

/// A session store whose upserts block until explicitly released, for
/// exercising the single-flight write guard.
#[derive(Debug)]
pub struct GatedSessionStore {
    gate: tokio::sync::Semaphore,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl Default for GatedSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedSessionStore {
    /// Creates a store whose first upsert will block until [`release`] is
    /// called.
    ///
    /// [`release`]: GatedSessionStore::release
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: tokio::sync::Semaphore::new(0),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    /// Lets one blocked upsert finish.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Number of upserts that have begun.
    #[must_use]
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of upserts that have completed.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for GatedSessionStore {
    async fn upsert(&self, _code: &str, _payload: &serde_json::Value) -> Result<(), GateError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| GateError::Infrastructure("gate closed".into()))?;
        permit.forget();
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch(&self, _code: &str) -> Result<Option<SessionRow>, GateError> {
        Ok(None)
    }
}
