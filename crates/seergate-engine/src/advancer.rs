//! The narrative advancer.
//!
//! Drives an engine forward until it exhausts output or exposes a choice
//! set, collecting text lines in emission order and the union of all tags
//! seen (first occurrence wins) across the whole run.

use seergate_core::error::GateError;

use crate::story::{Choice, StoryEngine};

/// Tag the script emits when it needs externally supplied text (the player's
/// name). The advancer halts immediately after the line carrying it.
pub const NAME_INPUT_TAG: &str = "input:name";

/// Everything one advance produced.
#[derive(Debug, Clone, Default)]
pub struct StepPacket {
    /// Non-empty text lines, in emission order.
    pub lines: Vec<String>,
    /// All tags seen this step, deduplicated in first-seen order.
    pub tags: Vec<String>,
    /// Choices now on offer (empty while awaiting name input).
    pub choices: Vec<Choice>,
    /// The engine asked for a name; resume by injecting `playerName` and
    /// advancing again.
    pub awaiting_name: bool,
    /// No output remains and no choices are on offer.
    pub ended: bool,
}

fn merge_tags(seen: &mut Vec<String>, incoming: Vec<String>) {
    for tag in incoming {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
}

/// Advances until a non-empty choice set appears, name input is requested,
/// or output is exhausted.
///
/// Calling this with no pending output and no choices is a no-op that
/// returns empty lines/choices with `ended` set; the presentation layer
/// hides the choice input on that condition.
///
/// # Errors
///
/// Returns `GateError::Engine` if the engine fails mid-stream.
pub fn advance_until_choice_or_end(
    engine: &mut dyn StoryEngine,
) -> Result<StepPacket, GateError> {
    let mut packet = StepPacket::default();

    // Tags already present at the current point count toward this step.
    merge_tags(&mut packet.tags, engine.current_tags());

    while engine.can_continue() {
        let text = engine.next_line()?;

        let current = engine.current_tags();
        let wants_name = current.iter().any(|t| t == NAME_INPUT_TAG);
        merge_tags(&mut packet.tags, current);

        if !text.is_empty() {
            packet.lines.push(text);
        }

        if wants_name {
            packet.awaiting_name = true;
            return Ok(packet);
        }

        // Stop once choices appear (nice beat for the UI).
        if !engine.current_choices().is_empty() {
            break;
        }
    }

    packet.choices = engine.current_choices();
    packet.ended = packet.choices.is_empty() && !engine.can_continue();
    Ok(packet)
}

/// Injects the supplied player name into the engine's variable state.
/// Blank input leaves the current name untouched, matching the original
/// confirm behavior.
pub fn supply_player_name(engine: &mut dyn StoryEngine, name: &str) {
    let trimmed = name.trim();
    if !trimmed.is_empty() {
        engine.set_var("playerName", serde_json::Value::from(trimmed));
    }
}
