//! Normalized signal/memory events.
//!
//! Older save payloads stored bare strings in the signal and memory lists.
//! Those are normalized into `TrialEvent` during deserialization so nothing
//! downstream ever branches on element shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NO_REALM;

/// A single signal or memory emitted by the narrative.
///
/// Append-only: once created an event is never mutated. The wire field names
/// (`v`, `realm`, `at`) match the historical payload format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EventRepr")]
pub struct TrialEvent {
    /// The signal/memory category value (e.g. `playful`, `truth`).
    #[serde(rename = "v")]
    pub value: String,
    /// Realm active when the event was recorded.
    pub realm: String,
    /// Timestamp of recording.
    pub at: DateTime<Utc>,
}

impl TrialEvent {
    /// Creates an event recorded now (per the injected clock).
    #[must_use]
    pub fn new(value: impl Into<String>, realm: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            realm: realm.into(),
            at,
        }
    }
}

/// Accepts either the structured form or a legacy bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum EventRepr {
    Tagged {
        #[serde(rename = "v")]
        value: String,
        #[serde(default = "no_realm")]
        realm: String,
        #[serde(default = "epoch")]
        at: DateTime<Utc>,
    },
    Bare(String),
}

fn no_realm() -> String {
    NO_REALM.to_owned()
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

impl From<EventRepr> for TrialEvent {
    fn from(repr: EventRepr) -> Self {
        match repr {
            EventRepr::Tagged { value, realm, at } => Self { value, realm, at },
            EventRepr::Bare(value) => Self {
                value,
                realm: no_realm(),
                at: epoch(),
            },
        }
    }
}
