//! Recorded answers to narrative prompts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded answer, keyed externally by prompt id. A prompt holds one
/// slot; re-answering overwrites it (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Realm active when the answer was recorded.
    #[serde(default)]
    pub realm: String,
    /// The prompt's question text (falls back to the prompt id).
    #[serde(default)]
    pub title: String,
    /// Text of the choice the player picked.
    #[serde(default)]
    pub choice: String,
    /// Free-text whisper note, possibly empty.
    #[serde(default)]
    pub note: String,
    /// Timestamp of recording.
    pub at: DateTime<Utc>,
}
