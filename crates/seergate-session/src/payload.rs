//! Save payload shapes.
//!
//! One payload format serves both the local autosave document and the cloud
//! session row. Wire names are the historical camelCase ones, so saves made
//! by earlier builds keep restoring.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use seergate_core::answer::Answer;
use seergate_core::event::TrialEvent;
use seergate_divination::draw::DrawnCard;
use serde::{Deserialize, Serialize};

use crate::state::{RealmEndReading, RealmReport, TrialState};

/// The derived-state half of a save. Every field is optional so partial or
/// older documents still load; missing fields fall back per restore mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiSnapshot {
    /// Gate mood indicator.
    pub gate_mood: Option<String>,
    /// Scene id.
    pub scene: Option<String>,
    /// Realm id.
    pub realm_key: Option<String>,
    /// The current spread.
    pub spread: Option<Vec<DrawnCard>>,
    /// Reading synthesized by the latest draw.
    pub realm_end_reading: Option<RealmEndReading>,
    /// Accumulated signal events.
    pub signal_events: Option<Vec<TrialEvent>>,
    /// Accumulated memory events.
    pub memory_events: Option<Vec<TrialEvent>>,
    /// Answers keyed by prompt id.
    pub answers_by_prompt: Option<BTreeMap<String, Answer>>,
    /// Captured realm reports keyed by realm.
    pub realm_reports: Option<BTreeMap<String, RealmReport>>,
    /// Transcript lines.
    pub log: Option<Vec<String>>,
    /// Pending prompt id.
    pub prompt_id: Option<String>,
    /// Pending prompt question text.
    pub prompt_title: Option<String>,
}

impl UiSnapshot {
    /// Captures the full derived state.
    #[must_use]
    pub fn capture(state: &TrialState) -> Self {
        Self {
            gate_mood: Some(state.mood.clone()),
            scene: Some(state.scene.clone()),
            realm_key: Some(state.realm_key.clone()),
            spread: Some(state.spread.clone()),
            realm_end_reading: state.realm_end_reading.clone(),
            signal_events: Some(state.signal_events.clone()),
            memory_events: Some(state.memory_events.clone()),
            answers_by_prompt: Some(state.answers_by_prompt.clone()),
            realm_reports: Some(state.realm_reports.clone()),
            log: Some(state.log.clone()),
            prompt_id: state.prompt_id.clone(),
            prompt_title: state.prompt_title.clone(),
        }
    }

    /// Restore mode used at boot: missing fields become fresh defaults.
    #[must_use]
    pub fn into_state(self) -> TrialState {
        let defaults = TrialState::default();
        TrialState {
            mood: self.gate_mood.unwrap_or(defaults.mood),
            scene: self.scene.unwrap_or(defaults.scene),
            realm_key: self.realm_key.unwrap_or(defaults.realm_key),
            spread: self.spread.unwrap_or_default(),
            realm_end_reading: self.realm_end_reading,
            signal_events: self.signal_events.unwrap_or_default(),
            memory_events: self.memory_events.unwrap_or_default(),
            answers_by_prompt: self.answers_by_prompt.unwrap_or_default(),
            realm_reports: self.realm_reports.unwrap_or_default(),
            log: self.log.unwrap_or_default(),
            prompt_id: self.prompt_id,
            prompt_title: self.prompt_title,
        }
    }

    /// Restore mode used by the observer refresh: missing fields keep the
    /// current values instead of resetting.
    pub fn apply_to(self, state: &mut TrialState) {
        if let Some(mood) = self.gate_mood {
            state.mood = mood;
        }
        if let Some(scene) = self.scene {
            state.scene = scene;
        }
        if let Some(realm_key) = self.realm_key {
            state.realm_key = realm_key;
        }
        if let Some(spread) = self.spread {
            state.spread = spread;
        }
        if let Some(reading) = self.realm_end_reading {
            state.realm_end_reading = Some(reading);
        }
        if let Some(events) = self.signal_events {
            state.signal_events = events;
        }
        if let Some(events) = self.memory_events {
            state.memory_events = events;
        }
        if let Some(answers) = self.answers_by_prompt {
            state.answers_by_prompt = answers;
        }
        if let Some(reports) = self.realm_reports {
            state.realm_reports = reports;
        }
        if let Some(log) = self.log {
            state.log = log;
        }
        if let Some(prompt_id) = self.prompt_id {
            state.prompt_id = Some(prompt_id);
        }
        if let Some(title) = self.prompt_title {
            state.prompt_title = Some(title);
        }
    }
}

/// A complete save: the engine snapshot plus the derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    /// Serialized story-engine cursor, `None` for a just-created session.
    pub engine_state: Option<String>,
    /// When the payload was built.
    pub saved_at: Option<DateTime<Utc>>,
    /// The derived state.
    #[serde(default)]
    pub ui: UiSnapshot,
}

impl SavePayload {
    /// The blank payload written when a share session is first created.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            engine_state: None,
            saved_at: None,
            ui: UiSnapshot::default(),
        }
    }
}
