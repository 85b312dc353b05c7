//! Derived session state mutated by the tag interpreter.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use seergate_core::NO_REALM;
use seergate_core::answer::Answer;
use seergate_core::event::TrialEvent;
use seergate_divination::draw::DrawnCard;
use seergate_divination::reading::Reading;
use serde::{Deserialize, Serialize};

/// The realm-ending reading produced by a draw, shown until the next realm
/// transition clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealmEndReading {
    /// Realm active when the triggering draw occurred.
    pub realm: String,
    /// When the reading was synthesized.
    pub at: DateTime<Utc>,
    /// The reading itself.
    pub reading: Reading,
}

/// A reading snapshotted once at realm completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmReport {
    /// When the report was captured.
    pub captured_at: DateTime<Utc>,
    /// The realm it covers.
    pub realm_key: String,
    /// The captured reading.
    pub report: Reading,
}

/// All derived state for one trial run. The engine snapshot is held
/// separately by the controller; this is everything the tags build up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialState {
    /// The Gate's current mood indicator.
    pub mood: String,
    /// Current screen/scene id.
    pub scene: String,
    /// Current realm id, or the `NO_REALM` sentinel.
    pub realm_key: String,
    /// The current spread; replaced wholesale on draw, cleared on realm entry.
    pub spread: Vec<DrawnCard>,
    /// Reading synthesized by the most recent draw, if still current.
    pub realm_end_reading: Option<RealmEndReading>,
    /// Accumulated signal events, append-only.
    pub signal_events: Vec<TrialEvent>,
    /// Accumulated memory events, append-only.
    pub memory_events: Vec<TrialEvent>,
    /// Answers keyed by prompt id; one slot per prompt, last write wins.
    pub answers_by_prompt: BTreeMap<String, Answer>,
    /// Realm reports captured at completion, keyed by realm.
    pub realm_reports: BTreeMap<String, RealmReport>,
    /// Full transcript of emitted lines and sealed whispers.
    pub log: Vec<String>,
    /// Pending prompt id, if the narrative posed a question.
    pub prompt_id: Option<String>,
    /// Pending prompt question text.
    pub prompt_title: Option<String>,
}

impl Default for TrialState {
    fn default() -> Self {
        Self {
            mood: "curious".to_owned(),
            scene: "realm_select".to_owned(),
            realm_key: NO_REALM.to_owned(),
            spread: Vec::new(),
            realm_end_reading: None,
            signal_events: Vec::new(),
            memory_events: Vec::new(),
            answers_by_prompt: BTreeMap::new(),
            realm_reports: BTreeMap::new(),
            log: Vec::new(),
            prompt_id: None,
            prompt_title: None,
        }
    }
}

impl TrialState {
    /// The currently dominant signal category, for the live gate hint.
    #[must_use]
    pub fn top_signal(&self) -> Option<String> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for event in &self.signal_events {
            let key = event.value.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            match counts.iter_mut().find(|(k, _)| *k == key) {
                Some((_, n)) => *n += 1,
                None => counts.push((key, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.into_iter().next().map(|(k, _)| k)
    }
}
