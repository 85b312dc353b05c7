//! Interpreter for the compiled-script document format.
//!
//! This is the in-tree stand-in for the external story engine: a small
//! passage/beat machine with tags, variable effects, diverts, and a
//! serializable cursor. It implements [`StoryEngine`] and nothing else in
//! the workspace knows it exists.

use std::collections::BTreeMap;

use seergate_core::error::GateError;
use serde::{Deserialize, Serialize};

use crate::story::{Choice, StoryEngine};

/// A compiled script: named passages plus initial variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptDoc {
    /// Passage the story opens in.
    pub start: String,
    /// Initial named-variable values.
    #[serde(default)]
    pub vars: BTreeMap<String, serde_json::Value>,
    /// All passages by id.
    pub passages: BTreeMap<String, Passage>,
}

/// One passage: a run of beats followed by choices or a divert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Output units emitted in order.
    #[serde(default)]
    pub beats: Vec<Beat>,
    /// Choices offered once the beats are exhausted.
    #[serde(default)]
    pub choices: Vec<ScriptChoice>,
    /// Passage to fall through to when there are no choices.
    #[serde(default)]
    pub divert: Option<String>,
}

/// One unit of output with its tags and variable effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beat {
    /// Narrative text (may be empty for tag-only beats).
    #[serde(default)]
    pub text: String,
    /// Directives attached to this beat.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Variables assigned when the beat is emitted.
    #[serde(default)]
    pub set: BTreeMap<String, serde_json::Value>,
    /// Integer variables adjusted when the beat is emitted.
    #[serde(default)]
    pub add: BTreeMap<String, i64>,
}

/// A selectable branch out of a passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptChoice {
    /// Display text.
    pub text: String,
    /// Passage the choice diverts to.
    pub target: String,
    /// Variables assigned on selection.
    #[serde(default)]
    pub set: BTreeMap<String, serde_json::Value>,
    /// Integer variables adjusted on selection.
    #[serde(default)]
    pub add: BTreeMap<String, i64>,
}

/// Serializable execution position. This is the entire engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Cursor {
    passage: String,
    beat: usize,
    vars: BTreeMap<String, serde_json::Value>,
    last_tags: Vec<String>,
}

/// The scripted story engine.
#[derive(Debug, Clone)]
pub struct ScriptedStory {
    doc: ScriptDoc,
    cursor: Cursor,
}

impl ScriptedStory {
    /// Builds an engine from a compiled-script JSON document.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the document does not parse or its
    /// start passage is missing.
    pub fn from_json(script: &str) -> Result<Self, GateError> {
        let doc: ScriptDoc = serde_json::from_str(script)
            .map_err(|e| GateError::Engine(format!("script parse failed: {e}")))?;
        Self::from_doc(doc)
    }

    /// Builds an engine from an already-parsed document.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the start passage is missing.
    pub fn from_doc(doc: ScriptDoc) -> Result<Self, GateError> {
        if !doc.passages.contains_key(&doc.start) {
            return Err(GateError::Engine(format!(
                "script start passage not found: {}",
                doc.start
            )));
        }
        let cursor = Cursor {
            passage: doc.start.clone(),
            beat: 0,
            vars: doc.vars.clone(),
            last_tags: Vec::new(),
        };
        let mut story = Self { doc, cursor };
        story.settle();
        Ok(story)
    }

    /// The built-in demonstration trial shipped with the workspace.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the embedded script fails validation.
    pub fn demo() -> Result<Self, GateError> {
        Self::from_json(include_str!("../data/demo_trial.json"))
    }

    fn passage(&self) -> &Passage {
        // The cursor passage is validated on every transition.
        &self.doc.passages[&self.cursor.passage]
    }

    /// Follows empty diverts until the cursor rests on output or choices.
    fn settle(&mut self) {
        loop {
            let passage = self.passage();
            if self.cursor.beat < passage.beats.len() || !passage.choices.is_empty() {
                return;
            }
            let Some(next) = passage.divert.clone() else {
                return;
            };
            if !self.doc.passages.contains_key(&next) {
                tracing::warn!(divert = %next, "divert target missing; halting story");
                return;
            }
            self.cursor.passage = next;
            self.cursor.beat = 0;
        }
    }
}

impl StoryEngine for ScriptedStory {
    fn can_continue(&self) -> bool {
        self.cursor.beat < self.passage().beats.len()
    }

    fn next_line(&mut self) -> Result<String, GateError> {
        if !self.can_continue() {
            return Err(GateError::Engine("no pending output".to_owned()));
        }
        let beat = self.passage().beats[self.cursor.beat].clone();
        for (name, value) in &beat.set {
            self.cursor.vars.insert(name.clone(), value.clone());
        }
        for (name, delta) in &beat.add {
            let current = self
                .cursor
                .vars
                .get(name)
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);
            self.cursor
                .vars
                .insert(name.clone(), serde_json::Value::from(current + delta));
        }
        self.cursor.last_tags = beat.tags;
        self.cursor.beat += 1;
        self.settle();
        Ok(beat.text.trim().to_owned())
    }

    fn current_tags(&self) -> Vec<String> {
        self.cursor.last_tags.clone()
    }

    fn current_choices(&self) -> Vec<Choice> {
        if self.can_continue() {
            return Vec::new();
        }
        self.passage()
            .choices
            .iter()
            .enumerate()
            .map(|(index, c)| Choice {
                index,
                text: c.text.clone(),
            })
            .collect()
    }

    fn choose(&mut self, index: usize) -> Result<(), GateError> {
        if self.can_continue() {
            return Err(GateError::Engine(
                "cannot choose while output is pending".to_owned(),
            ));
        }
        let choice = self
            .passage()
            .choices
            .get(index)
            .cloned()
            .ok_or_else(|| GateError::Engine(format!("no choice at index {index}")))?;
        if !self.doc.passages.contains_key(&choice.target) {
            return Err(GateError::Engine(format!(
                "choice target not found: {}",
                choice.target
            )));
        }
        for (name, value) in &choice.set {
            self.cursor.vars.insert(name.clone(), value.clone());
        }
        for (name, delta) in &choice.add {
            let current = self
                .cursor
                .vars
                .get(name)
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);
            self.cursor
                .vars
                .insert(name.clone(), serde_json::Value::from(current + delta));
        }
        self.cursor.passage = choice.target;
        self.cursor.beat = 0;
        self.cursor.last_tags.clear();
        self.settle();
        Ok(())
    }

    fn reset(&mut self) {
        self.cursor = Cursor {
            passage: self.doc.start.clone(),
            beat: 0,
            vars: self.doc.vars.clone(),
            last_tags: Vec::new(),
        };
        self.settle();
    }

    fn get_var(&self, name: &str) -> Option<serde_json::Value> {
        self.cursor.vars.get(name).cloned()
    }

    fn set_var(&mut self, name: &str, value: serde_json::Value) {
        self.cursor.vars.insert(name.to_owned(), value);
    }

    fn state_json(&self) -> Result<String, GateError> {
        serde_json::to_string(&self.cursor)
            .map_err(|e| GateError::Engine(format!("state serialization failed: {e}")))
    }

    fn restore_state(&mut self, snapshot: &str) -> Result<(), GateError> {
        let cursor: Cursor = serde_json::from_str(snapshot)
            .map_err(|e| GateError::Engine(format!("state snapshot corrupt: {e}")))?;
        if !self.doc.passages.contains_key(&cursor.passage) {
            return Err(GateError::Engine(format!(
                "snapshot references unknown passage: {}",
                cursor.passage
            )));
        }
        self.cursor = cursor;
        self.settle();
        Ok(())
    }
}
