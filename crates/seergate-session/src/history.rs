//! Run history, newest first, capped at fifty runs.

use chrono::{DateTime, Utc};
use seergate_core::store::DocumentStore;
use seergate_engine::stats::TrialStats;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Document name the history list is stored under.
pub const HISTORY_STORE: &str = "seers_trial_history_v2";

/// Most runs retained before the oldest fall off.
pub const MAX_RUNS: usize = 50;

/// One finished (or abandoned) trial run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Unique run id.
    pub id: Uuid,
    /// When the run began.
    pub started_at: DateTime<Utc>,
    /// When the run was finalized.
    pub ended_at: DateTime<Utc>,
    /// Realm the run ended in.
    pub realm_key: String,
    /// Seed of the last spread drawn, zero if none.
    pub seed: u32,
    /// Ids of the cards in the last spread.
    pub card_ids: Vec<String>,
    /// Engine statistics at finalization.
    pub stats: TrialStats,
}

/// Loads the history list. A missing or corrupt document reads as empty.
#[must_use]
pub fn load(store: &dyn DocumentStore) -> Vec<RunRecord> {
    store
        .load(HISTORY_STORE)
        .and_then(|doc| serde_json::from_value(doc).ok())
        .unwrap_or_default()
}

/// Prepends a run and persists the capped list.
///
/// # Errors
///
/// Returns the store's error if the updated list cannot be written.
pub fn add_run(
    store: &dyn DocumentStore,
    run: RunRecord,
) -> Result<Vec<RunRecord>, seergate_core::error::GateError> {
    let mut runs = load(store);
    runs.insert(0, run);
    runs.truncate(MAX_RUNS);
    store.save(HISTORY_STORE, &serde_json::to_value(&runs)?)?;
    Ok(runs)
}

/// Removes the entire history document.
pub fn clear(store: &dyn DocumentStore) {
    store.clear(HISTORY_STORE);
}
