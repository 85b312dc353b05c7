//! The trial session controller.
//!
//! Owns the story engine and the derived state, drives every play-path
//! operation (boot, advance, choice, name input, new trial, full reset),
//! and keeps the local autosave current. Remote sync is the caller's
//! concern: each operation returns the payload it autosaved so the caller
//! can push the same bytes to the session row.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use seergate_core::NO_REALM;
use seergate_core::answer::Answer;
use seergate_core::clock::Clock;
use seergate_core::error::GateError;
use seergate_core::store::DocumentStore;
use seergate_divination::deck::Deck;
use seergate_divination::reading::{Reading, ReadingInputs, build_reading};
use seergate_engine::advancer::{advance_until_choice_or_end, supply_player_name};
use seergate_engine::stats::TrialStats;
use seergate_engine::story::{Choice, StoryEngine};
use uuid::Uuid;

use crate::payload::{SavePayload, UiSnapshot};
use crate::state::{RealmReport, TrialState};
use crate::tags::apply_tags;
use crate::{gate_memory, history, unlocks};

/// Document name the autosave snapshot is stored under.
pub const SAVE_STORE: &str = "seers_trial_save_v2";

/// Realm the reading falls back to before any realm has been entered.
const FIRST_REALM: &str = "threshold";

/// Scene id that marks a realm as completed.
const END_SCENE: &str = "end";

/// Bookkeeping for the run in progress, finalized into history when the
/// next trial begins.
#[derive(Debug, Clone)]
struct RunTracker {
    id: Uuid,
    started_at: DateTime<Utc>,
    seed: u32,
    card_ids: Vec<String>,
    finalized: bool,
}

impl RunTracker {
    fn begin(clock: &dyn Clock) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: clock.now(),
            seed: 0,
            card_ids: Vec::new(),
            finalized: false,
        }
    }
}

/// One live trial session.
pub struct TrialSession {
    engine: Box<dyn StoryEngine>,
    deck: Deck,
    local: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    state: TrialState,
    choices: Vec<Choice>,
    awaiting_name: bool,
    ended: bool,
    run: RunTracker,
}

impl TrialSession {
    /// Creates a session positioned at the start of the script. Call
    /// [`boot`](Self::boot) before serving it.
    #[must_use]
    pub fn new(
        engine: Box<dyn StoryEngine>,
        deck: Deck,
        local: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let run = RunTracker::begin(clock.as_ref());
        Self {
            engine,
            deck,
            local,
            clock,
            state: TrialState::default(),
            choices: Vec::new(),
            awaiting_name: false,
            ended: false,
            run,
        }
    }

    /// Boots from the local autosave if one exists, then advances to the
    /// first rest point.
    ///
    /// A corrupt engine snapshot is logged and ignored; the trial restarts
    /// fresh rather than failing.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the story fails while advancing.
    pub fn boot(&mut self) -> Result<SavePayload, GateError> {
        let saved = self
            .local
            .load(SAVE_STORE)
            .and_then(|doc| serde_json::from_value::<SavePayload>(doc).ok());
        self.restore(saved.as_ref());
        self.step()
    }

    /// Boots from a fetched session row instead of the local autosave.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the story fails while advancing.
    pub fn boot_from_remote(&mut self, payload: &SavePayload) -> Result<SavePayload, GateError> {
        self.restore(Some(payload));
        self.step()
    }

    fn restore(&mut self, saved: Option<&SavePayload>) {
        self.engine.reset();
        self.state = TrialState::default();
        self.choices.clear();
        self.awaiting_name = false;
        self.ended = false;
        self.run = RunTracker::begin(self.clock.as_ref());

        let Some(payload) = saved else {
            return;
        };
        if let Some(snapshot) = &payload.engine_state
            && let Err(err) = self.engine.restore_state(snapshot)
        {
            tracing::warn!(error = %err, "saved engine state failed to load, starting fresh");
            self.engine.reset();
        }
        self.state = payload.ui.clone().into_state();
    }

    /// Advances the story to its next rest point and autosaves.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the story fails mid-stream.
    pub fn advance(&mut self) -> Result<SavePayload, GateError> {
        self.step()
    }

    /// Records the answer (if a prompt is pending), applies the choice, and
    /// advances.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` for a bad index or a story failure.
    pub fn commit_choice(&mut self, index: usize, note: &str) -> Result<SavePayload, GateError> {
        let picked = self
            .choices
            .iter()
            .find(|c| c.index == index)
            .map(|c| c.text.clone())
            .unwrap_or_default();
        self.record_answer(&picked, note);
        self.engine.choose(index)?;
        self.step()
    }

    /// Supplies the player's name and resumes the halted story.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the story fails while resuming.
    pub fn provide_name(&mut self, name: &str) -> Result<SavePayload, GateError> {
        supply_player_name(self.engine.as_mut(), name);
        self.awaiting_name = false;
        self.step()
    }

    /// Finalizes the current run into history, discards the autosave, and
    /// boots a fresh trial.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the fresh story fails while advancing.
    pub fn new_trial(&mut self) -> Result<SavePayload, GateError> {
        self.finalize_run();
        self.local.clear(SAVE_STORE);
        self.restore(None);
        self.step()
    }

    /// Wipes every persistent trace (save, history, unlocks, gate memory)
    /// and boots a fresh trial.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the fresh story fails while advancing.
    pub fn reset_all(&mut self) -> Result<SavePayload, GateError> {
        self.local.clear(SAVE_STORE);
        history::clear(self.local.as_ref());
        unlocks::clear(self.local.as_ref());
        gate_memory::reset(self.local.as_ref());
        self.restore(None);
        self.step()
    }

    /// Applies an observer refresh: derived state only, the engine is not
    /// touched. Fields missing from the snapshot keep their current values.
    pub fn apply_remote_refresh(&mut self, snapshot: UiSnapshot) {
        snapshot.apply_to(&mut self.state);
    }

    fn step(&mut self) -> Result<SavePayload, GateError> {
        let packet = advance_until_choice_or_end(self.engine.as_mut())?;
        self.state.log.extend(packet.lines);

        let drawn = apply_tags(
            &packet.tags,
            &mut self.state,
            self.engine.as_ref(),
            &self.deck,
            self.clock.as_ref(),
        );
        if let Some(record) = drawn {
            let ids: Vec<&str> = record.cards.iter().map(|c| c.id.as_str()).collect();
            if let Err(err) = unlocks::unlock_cards(self.local.as_ref(), self.clock.as_ref(), ids)
            {
                tracing::warn!(error = %err, "unlock ledger write failed");
            }
            self.run.seed = record.seed;
            self.run.card_ids = record.cards.into_iter().map(|c| c.id).collect();
        }

        self.choices = packet.choices;
        self.awaiting_name = packet.awaiting_name;
        self.ended = packet.ended;

        self.capture_realm_report_if_ready();
        self.autosave()
    }

    fn record_answer(&mut self, picked: &str, note: &str) {
        let Some(prompt_id) = self.state.prompt_id.clone() else {
            return;
        };
        let title = self
            .state
            .prompt_title
            .clone()
            .unwrap_or_else(|| prompt_id.clone());
        let note = note.trim();
        let entry = Answer {
            realm: self.state.realm_key.clone(),
            title: title.clone(),
            choice: picked.to_owned(),
            note: note.to_owned(),
            at: self.clock.now(),
        };
        self.state.answers_by_prompt.insert(prompt_id, entry);
        if !note.is_empty() {
            self.state.log.push(format!("({title}) — {note}"));
        }
    }

    /// Captures a realm report the first time a realm reaches its end
    /// scene, and tallies the realm's memories into the gate memory.
    fn capture_realm_report_if_ready(&mut self) {
        if self.state.scene != END_SCENE {
            return;
        }
        let realm = self.state.realm_key.clone();
        if realm == NO_REALM || self.state.realm_reports.contains_key(&realm) {
            return;
        }

        let report = build_reading(&ReadingInputs {
            realm_key: &realm,
            realm_filter: &realm,
            signal_events: &self.state.signal_events,
            memory_events: &self.state.memory_events,
            spread: &self.state.spread,
            answers_by_prompt: &self.state.answers_by_prompt,
        });
        self.state.realm_reports.insert(
            realm.clone(),
            RealmReport {
                captured_at: self.clock.now(),
                realm_key: realm.clone(),
                report,
            },
        );

        let memories: Vec<&str> = self
            .state
            .memory_events
            .iter()
            .filter(|e| e.realm == realm)
            .map(|e| e.value.as_str())
            .collect();
        if let Err(err) =
            gate_memory::record_completed_trial(self.local.as_ref(), self.clock.as_ref(), memories)
        {
            tracing::warn!(error = %err, "gate memory write failed");
        }
    }

    fn finalize_run(&mut self) {
        if self.run.finalized {
            return;
        }
        self.run.finalized = true;
        let record = history::RunRecord {
            id: self.run.id,
            started_at: self.run.started_at,
            ended_at: self.clock.now(),
            realm_key: self.state.realm_key.clone(),
            seed: self.run.seed,
            card_ids: self.run.card_ids.clone(),
            stats: self.stats(),
        };
        if let Err(err) = history::add_run(self.local.as_ref(), record) {
            tracing::warn!(error = %err, "run history write failed");
        }
    }

    fn autosave(&self) -> Result<SavePayload, GateError> {
        let payload = self.build_payload()?;
        match serde_json::to_value(&payload) {
            Ok(doc) => {
                if let Err(err) = self.local.save(SAVE_STORE, &doc) {
                    tracing::warn!(error = %err, "local autosave failed");
                }
            }
            Err(err) => tracing::warn!(error = %err, "local autosave failed"),
        }
        Ok(payload)
    }

    /// Builds the full save payload for the current position.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the engine state cannot be serialized.
    pub fn build_payload(&self) -> Result<SavePayload, GateError> {
        Ok(SavePayload {
            engine_state: Some(self.engine.state_json()?),
            saved_at: Some(self.clock.now()),
            ui: UiSnapshot::capture(&self.state),
        })
    }

    /// Synthesizes the current reading under the given realm filter. Before
    /// any realm has been entered the first realm stands in.
    #[must_use]
    pub fn reading(&self, realm_filter: &str) -> Reading {
        let realm_key = if self.state.realm_key == NO_REALM {
            FIRST_REALM
        } else {
            &self.state.realm_key
        };
        build_reading(&ReadingInputs {
            realm_key,
            realm_filter,
            signal_events: &self.state.signal_events,
            memory_events: &self.state.memory_events,
            spread: &self.state.spread,
            answers_by_prompt: &self.state.answers_by_prompt,
        })
    }

    /// The derived state.
    #[must_use]
    pub fn state(&self) -> &TrialState {
        &self.state
    }

    /// Choices currently on offer.
    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Whether the story is halted waiting for the player's name.
    #[must_use]
    pub fn awaiting_name(&self) -> bool {
        self.awaiting_name
    }

    /// Whether the story has exhausted all output and choices.
    #[must_use]
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Engine statistics at the current position.
    #[must_use]
    pub fn stats(&self) -> TrialStats {
        TrialStats::from_engine(self.engine.as_ref())
    }

    /// The local persistence behind this session.
    #[must_use]
    pub fn local_store(&self) -> &dyn DocumentStore {
        self.local.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use seergate_engine::scripted::ScriptedStory;
    use seergate_test_support::{FixedClock, MemoryDocumentStore};

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ))
    }

    fn session_with(doc: serde_json::Value, store: Arc<MemoryDocumentStore>) -> TrialSession {
        let engine = ScriptedStory::from_json(&doc.to_string()).unwrap();
        TrialSession::new(Box::new(engine), Deck::builtin(), store, clock())
    }

    fn prompt_script() -> serde_json::Value {
        serde_json::json!({
            "start": "gate",
            "vars": { "spread_seed": 42 },
            "passages": {
                "gate": {
                    "beats": [
                        { "text": "The Gate regards you.", "tags": ["gate:curious", "realm:threshold", "scene:trial"] },
                        { "text": "First question.", "tags": ["prompt:p1", "q:What do you carry?"] }
                    ],
                    "choices": [
                        { "text": "A secret", "target": "ending" },
                        { "text": "Nothing", "target": "ending" }
                    ]
                },
                "ending": {
                    "beats": [
                        { "text": "The realm closes.", "tags": ["scene:end", "mem:+truth", "draw:3"] }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_boot_fresh_advances_and_autosaves() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store.clone());

        let payload = session.boot().unwrap();

        assert_eq!(session.state().scene, "trial");
        assert_eq!(session.state().realm_key, "threshold");
        assert_eq!(session.choices().len(), 2);
        assert_eq!(
            session.state().log,
            vec!["The Gate regards you.", "First question."]
        );
        assert!(payload.engine_state.is_some());
        // The same payload landed in the local store.
        assert!(store.load(SAVE_STORE).is_some());
    }

    #[test]
    fn test_boot_restores_prior_session_from_autosave() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut first = session_with(prompt_script(), store.clone());
        first.boot().unwrap();
        first.commit_choice(0, "a whispered line").unwrap();

        let mut second = session_with(prompt_script(), store);
        second.boot().unwrap();

        assert_eq!(second.state().scene, "end");
        assert_eq!(second.state().answers_by_prompt.len(), 1);
        assert!(second.state().log.iter().any(|l| l.contains("whispered")));
    }

    #[test]
    fn test_corrupt_engine_snapshot_boots_fresh_without_error() {
        let store = Arc::new(MemoryDocumentStore::new());
        store.seed(
            SAVE_STORE,
            serde_json::json!({ "engineState": "{broken", "ui": {} }),
        );
        let mut session = session_with(prompt_script(), store);

        session.boot().unwrap();

        assert_eq!(session.state().scene, "trial");
        assert_eq!(session.choices().len(), 2);
    }

    #[test]
    fn test_commit_choice_records_answer_and_whisper_log_line() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store);
        session.boot().unwrap();

        session.commit_choice(0, "  the truth  ").unwrap();

        let answer = &session.state().answers_by_prompt["p1"];
        assert_eq!(answer.title, "What do you carry?");
        assert_eq!(answer.choice, "A secret");
        assert_eq!(answer.note, "the truth");
        assert_eq!(answer.realm, "threshold");
        assert!(session
            .state()
            .log
            .contains(&"(What do you carry?) — the truth".to_owned()));
    }

    #[test]
    fn test_blank_note_records_answer_without_log_line() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store);
        session.boot().unwrap();
        let lines_before = session.state().log.len();

        session.commit_choice(1, "   ").unwrap();

        assert_eq!(session.state().answers_by_prompt["p1"].note, "");
        // Only the ending's narrative line was appended.
        let new_lines: Vec<_> = session.state().log[lines_before..].to_vec();
        assert_eq!(new_lines, vec!["The realm closes."]);
    }

    #[test]
    fn test_draw_unlocks_cards_in_the_ledger() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store.clone());
        session.boot().unwrap();

        session.commit_choice(0, "").unwrap();

        assert_eq!(session.state().spread.len(), 3);
        let ledger = unlocks::load(store.as_ref());
        for card in &session.state().spread {
            assert!(ledger.is_unlocked(&card.id), "{}", card.id);
        }
    }

    #[test]
    fn test_realm_report_captured_once_and_gate_memory_tallied() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store.clone());
        session.boot().unwrap();

        session.commit_choice(0, "").unwrap();

        let report = &session.state().realm_reports["threshold"];
        assert_eq!(report.realm_key, "threshold");
        assert_eq!(report.report.realm_filter, "threshold");

        let memory = gate_memory::load(store.as_ref());
        assert_eq!(memory.trials, 1);
        assert_eq!(memory.counts["truth"], 1);

        // Advancing again at the same end scene must not re-capture.
        session.advance().unwrap();
        assert_eq!(gate_memory::load(store.as_ref()).trials, 1);
    }

    #[test]
    fn test_new_trial_finalizes_run_and_starts_fresh() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store.clone());
        session.boot().unwrap();
        session.commit_choice(0, "").unwrap();

        session.new_trial().unwrap();

        let runs = history::load(store.as_ref());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].realm_key, "threshold");
        assert_eq!(runs[0].seed, 42);
        assert_eq!(runs[0].card_ids.len(), 3);
        // Fresh trial back at the opening rest point.
        assert_eq!(session.state().scene, "trial");
        assert!(session.state().answers_by_prompt.is_empty());
    }

    #[test]
    fn test_reset_all_wipes_every_persistent_trace() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store.clone());
        session.boot().unwrap();
        session.commit_choice(0, "note").unwrap();
        session.new_trial().unwrap();

        session.reset_all().unwrap();

        assert!(history::load(store.as_ref()).is_empty());
        assert!(unlocks::load(store.as_ref()).cards.is_empty());
        assert_eq!(gate_memory::load(store.as_ref()).trials, 0);
        // The fresh trial autosaved again, so a save document exists.
        assert!(store.load(SAVE_STORE).is_some());
    }

    #[test]
    fn test_name_halt_and_resume() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = serde_json::json!({
            "start": "a",
            "vars": { "playerName": "Traveler" },
            "passages": {
                "a": {
                    "beats": [
                        { "text": "Speak your name.", "tags": ["input:name"] },
                        { "text": "Welcome." }
                    ]
                }
            }
        });
        let mut session = session_with(doc, store);

        session.boot().unwrap();
        assert!(session.awaiting_name());
        assert!(!session.ended());

        session.provide_name("Mara").unwrap();

        assert!(!session.awaiting_name());
        assert!(session.ended());
        assert!(session.state().log.contains(&"Welcome.".to_owned()));
    }

    #[test]
    fn test_reading_falls_back_to_first_realm_before_any_transition() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = serde_json::json!({
            "start": "a",
            "passages": { "a": { "beats": [ { "text": "Hello." } ] } }
        });
        let mut session = session_with(doc, store);
        session.boot().unwrap();

        let reading = session.reading("all");

        assert_eq!(reading.realm_key, "threshold");
        assert_eq!(reading.realm_filter, "all");
    }

    #[test]
    fn test_observer_refresh_updates_derived_state_only() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with(prompt_script(), store);
        session.boot().unwrap();

        session.apply_remote_refresh(UiSnapshot {
            gate_mood: Some("stern".to_owned()),
            ..UiSnapshot::default()
        });

        assert_eq!(session.state().mood, "stern");
        // The story position is untouched; choices still on offer.
        assert_eq!(session.choices().len(), 2);
    }
}
