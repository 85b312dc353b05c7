//! Derived statistics read from the engine's variable map.

use serde::{Deserialize, Serialize};

use crate::story::StoryEngine;

/// The HUD statistics plus the stored draw seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialStats {
    /// The Gate's favor toward the player.
    pub favor: i64,
    /// Remaining focus.
    pub focus: i64,
    /// Scars accumulated.
    pub scars: i64,
    /// Runes collected.
    pub runes: i64,
    /// Seed the next spread draw will use (0 means unset).
    pub spread_seed: u32,
}

impl TrialStats {
    /// Reads all stats from the engine, defaulting unset variables to zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_engine(engine: &dyn StoryEngine) -> Self {
        let int = |name: &str| {
            engine
                .get_var(name)
                .and_then(|v| v.as_i64())
                .unwrap_or(0)
        };
        Self {
            favor: int("favor"),
            focus: int("focus"),
            scars: int("scars"),
            runes: int("runes"),
            spread_seed: int("spread_seed").max(0) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedStory;

    #[test]
    fn test_reads_vars_with_zero_defaults() {
        let story = ScriptedStory::from_json(
            &serde_json::json!({
                "start": "a",
                "vars": { "favor": 3, "spread_seed": 12345 },
                "passages": { "a": { "beats": [ { "text": "x" } ] } }
            })
            .to_string(),
        )
        .unwrap();

        let stats = TrialStats::from_engine(&story);

        assert_eq!(stats.favor, 3);
        assert_eq!(stats.focus, 0);
        assert_eq!(stats.scars, 0);
        assert_eq!(stats.runes, 0);
        assert_eq!(stats.spread_seed, 12345);
    }
}
