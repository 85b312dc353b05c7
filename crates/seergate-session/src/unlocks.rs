//! The codex unlock ledger.
//!
//! Every card that appears in a spread is unlocked permanently. Repeat
//! appearances bump a seen counter; the first sighting timestamp is kept.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use seergate_core::clock::Clock;
use seergate_core::error::GateError;
use seergate_core::store::DocumentStore;
use serde::{Deserialize, Serialize};

/// Document name the unlock ledger is stored under.
pub const UNLOCKS_STORE: &str = "seers_trial_unlocks_v2";

/// One unlocked card's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUnlock {
    /// First time the card appeared in a spread.
    pub unlocked_at: DateTime<Utc>,
    /// Total times the card has appeared.
    pub times_seen: u64,
}

/// The full ledger, keyed by card id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockLedger {
    /// Unlock records by card id.
    #[serde(default)]
    pub cards: BTreeMap<String, CardUnlock>,
}

impl UnlockLedger {
    /// Whether the card has ever been seen.
    #[must_use]
    pub fn is_unlocked(&self, card_id: &str) -> bool {
        self.cards.contains_key(card_id)
    }
}

/// Loads the ledger. A missing or corrupt document reads as empty.
#[must_use]
pub fn load(store: &dyn DocumentStore) -> UnlockLedger {
    store
        .load(UNLOCKS_STORE)
        .and_then(|doc| serde_json::from_value(doc).ok())
        .unwrap_or_default()
}

/// Unlocks (or bumps) every card id in a freshly drawn spread.
///
/// # Errors
///
/// Returns the store's error if the updated ledger cannot be written.
pub fn unlock_cards<'a>(
    store: &dyn DocumentStore,
    clock: &dyn Clock,
    card_ids: impl IntoIterator<Item = &'a str>,
) -> Result<UnlockLedger, GateError> {
    let mut ledger = load(store);
    let now = clock.now();
    for id in card_ids {
        ledger
            .cards
            .entry(id.to_owned())
            .and_modify(|u| u.times_seen += 1)
            .or_insert(CardUnlock {
                unlocked_at: now,
                times_seen: 1,
            });
    }
    store.save(UNLOCKS_STORE, &serde_json::to_value(&ledger)?)?;
    Ok(ledger)
}

/// Removes the entire ledger document.
pub fn clear(store: &dyn DocumentStore) {
    store.clear(UNLOCKS_STORE);
}
