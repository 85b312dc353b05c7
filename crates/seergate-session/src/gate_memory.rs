//! The Gate's long memory across trials.
//!
//! A fixed set of memory categories is tallied over every completed trial.
//! Unknown categories are dropped on load and on record, so the document
//! shape stays stable no matter what the narrative emits.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use seergate_core::clock::Clock;
use seergate_core::error::GateError;
use seergate_core::store::DocumentStore;
use serde::{Deserialize, Serialize};

/// Document name the gate memory is stored under.
pub const GATE_MEMORY_STORE: &str = "seers_trial_gate_memory_v2";

/// The memory categories the Gate tracks.
pub const MEMORY_KEYS: [&str; 8] = [
    "truth", "escape", "power", "loyalty", "silence", "rage", "mercy", "ambition",
];

/// Accumulated memory across all completed trials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateMemory {
    /// Completed trial count.
    pub trials: u64,
    /// Occurrences per category, every known key always present.
    pub counts: BTreeMap<String, u64>,
    /// Last time each category was recorded, every known key always present.
    pub last_seen: BTreeMap<String, Option<DateTime<Utc>>>,
}

impl Default for GateMemory {
    fn default() -> Self {
        Self {
            trials: 0,
            counts: MEMORY_KEYS.iter().map(|&k| (k.to_owned(), 0)).collect(),
            last_seen: MEMORY_KEYS.iter().map(|&k| (k.to_owned(), None)).collect(),
        }
    }
}

impl GateMemory {
    /// Merges a stored document onto the default shape, ignoring unknown
    /// keys and restoring any missing ones.
    fn normalized(self) -> Self {
        let mut base = Self {
            trials: self.trials,
            ..Self::default()
        };
        for key in MEMORY_KEYS {
            if let Some(count) = self.counts.get(key) {
                base.counts.insert(key.to_owned(), *count);
            }
            if let Some(seen) = self.last_seen.get(key) {
                base.last_seen.insert(key.to_owned(), *seen);
            }
        }
        base
    }
}

/// Loads the gate memory. A missing or corrupt document reads as default.
#[must_use]
pub fn load(store: &dyn DocumentStore) -> GateMemory {
    store
        .load(GATE_MEMORY_STORE)
        .and_then(|doc| serde_json::from_value::<GateMemory>(doc).ok())
        .map_or_else(GateMemory::default, GateMemory::normalized)
}

/// Tallies one completed trial's memory values into the long memory.
///
/// # Errors
///
/// Returns the store's error if the updated document cannot be written.
pub fn record_completed_trial<'a>(
    store: &dyn DocumentStore,
    clock: &dyn Clock,
    memories: impl IntoIterator<Item = &'a str>,
) -> Result<GateMemory, GateError> {
    let mut memory = load(store);
    memory.trials += 1;

    let now = clock.now();
    for value in memories {
        let key = value.trim().to_lowercase();
        let Some(count) = memory.counts.get_mut(&key) else {
            continue;
        };
        *count += 1;
        memory.last_seen.insert(key, Some(now));
    }

    store.save(GATE_MEMORY_STORE, &serde_json::to_value(&memory)?)?;
    Ok(memory)
}

/// Removes the gate memory document.
pub fn reset(store: &dyn DocumentStore) {
    store.clear(GATE_MEMORY_STORE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use seergate_test_support::{FixedClock, MemoryDocumentStore};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_default_carries_all_known_keys() {
        let memory = GateMemory::default();

        assert_eq!(memory.trials, 0);
        assert_eq!(memory.counts.len(), MEMORY_KEYS.len());
        assert!(memory.counts.values().all(|&n| n == 0));
        assert!(memory.last_seen.values().all(Option::is_none));
    }

    #[test]
    fn test_record_tallies_known_keys_and_skips_unknown() {
        let store = MemoryDocumentStore::new();

        let memory =
            record_completed_trial(&store, &clock(), ["truth", "  TRUTH ", "mercy", "banana"])
                .unwrap();

        assert_eq!(memory.trials, 1);
        assert_eq!(memory.counts["truth"], 2);
        assert_eq!(memory.counts["mercy"], 1);
        assert_eq!(memory.last_seen["truth"], Some(clock().0));
        assert!(!memory.counts.contains_key("banana"));
    }

    #[test]
    fn test_trials_increment_even_with_no_memories() {
        let store = MemoryDocumentStore::new();
        record_completed_trial(&store, &clock(), []).unwrap();

        let memory = record_completed_trial(&store, &clock(), []).unwrap();

        assert_eq!(memory.trials, 2);
    }

    #[test]
    fn test_load_merges_partial_documents_onto_default_shape() {
        let store = MemoryDocumentStore::new();
        store.seed(
            GATE_MEMORY_STORE,
            serde_json::json!({
                "trials": 3,
                "counts": { "truth": 5, "dragon": 9 },
                "lastSeen": {}
            }),
        );

        let memory = load(&store);

        assert_eq!(memory.trials, 3);
        assert_eq!(memory.counts["truth"], 5);
        assert_eq!(memory.counts["rage"], 0);
        assert!(!memory.counts.contains_key("dragon"));
        assert_eq!(memory.last_seen.len(), MEMORY_KEYS.len());
    }

    #[test]
    fn test_corrupt_document_reads_as_default() {
        let store = MemoryDocumentStore::new();
        store.seed(GATE_MEMORY_STORE, serde_json::json!("nope"));

        assert_eq!(load(&store), GateMemory::default());
    }

    #[test]
    fn test_reset_removes_the_document() {
        let store = MemoryDocumentStore::new();
        record_completed_trial(&store, &clock(), ["truth"]).unwrap();

        reset(&store);

        assert_eq!(load(&store), GateMemory::default());
    }
}
