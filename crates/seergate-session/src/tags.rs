//! The tag interpreter.
//!
//! The story script communicates with the session through string directives
//! of the form `namespace:payload` attached to narrative output. One batch
//! of tags (everything a single advance produced) is applied atomically to
//! the derived state.
//!
//! Recognized namespaces: `gate:` (mood), `scene:`, `realm:`, `prompt:`,
//! `q:` (prompt title), `mem:+X`, `sig:+X`, `draw:N`. Unknown namespaces
//! are ignored. Realm change detection runs before event tagging, so events
//! emitted in the same batch as a realm transition belong to the new realm.

use seergate_core::clock::Clock;
use seergate_core::event::TrialEvent;
use seergate_divination::deck::Deck;
use seergate_divination::draw::{DrawnCard, draw_spread};
use seergate_divination::reading::{ReadingInputs, build_reading};
use seergate_engine::stats::TrialStats;
use seergate_engine::story::StoryEngine;
use serde::{Deserialize, Serialize};

use crate::state::{RealmEndReading, TrialState};

/// Draw count used when `draw:` carries no usable number.
pub const DEFAULT_DRAW_COUNT: usize = 3;

/// Seed used when the script never assigned `spread_seed`.
pub const DEFAULT_SPREAD_SEED: u32 = 12345;

/// Bookkeeping produced when a batch triggered a draw. The controller uses
/// it for unlock tracking and the run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    /// Seed the spread was drawn with.
    pub seed: u32,
    /// The freshly drawn cards.
    pub cards: Vec<DrawnCard>,
}

/// First tag carrying `prefix`, with the prefix stripped.
#[must_use]
pub fn first_tag<'a>(tags: &'a [String], prefix: &str) -> Option<&'a str> {
    tags.iter()
        .find(|t| t.starts_with(prefix))
        .map(|t| &t[prefix.len()..])
}

/// All tags carrying `prefix`, with the prefix stripped, in batch order.
#[must_use]
pub fn all_tags<'a>(tags: &'a [String], prefix: &str) -> Vec<&'a str> {
    tags.iter()
        .filter(|t| t.starts_with(prefix))
        .map(|t| &t[prefix.len()..])
        .collect()
}

/// `mem:`/`sig:` payloads are additions written as `+value`.
fn additions<'a>(ops: &[&'a str]) -> Vec<&'a str> {
    ops.iter()
        .filter(|op| op.starts_with('+'))
        .map(|op| op[1..].trim())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Applies one tag batch to the derived state.
///
/// Returns a `DrawRecord` when the batch contained a draw directive. The
/// spread replacement and the returned record always commit; the realm-end
/// reading rides along with them and is synthesized against the effective
/// realm of this batch.
pub fn apply_tags(
    tags: &[String],
    state: &mut TrialState,
    engine: &dyn StoryEngine,
    deck: &Deck,
    clock: &dyn Clock,
) -> Option<DrawRecord> {
    let next_mood = first_tag(tags, "gate:");
    let next_scene = first_tag(tags, "scene:");
    let next_realm = first_tag(tags, "realm:");
    let next_prompt_id = first_tag(tags, "prompt:");
    let next_prompt_title = first_tag(tags, "q:");
    let draw_raw = first_tag(tags, "draw:");

    // Computed once per batch: events emitted alongside a realm transition
    // are attributed to the realm being entered.
    let effective_realm = next_realm.unwrap_or(&state.realm_key).to_owned();

    if let Some(realm) = next_realm
        && realm != state.realm_key
    {
        state.spread.clear();
        state.realm_end_reading = None;
    }

    let now = clock.now();

    for value in additions(&all_tags(tags, "mem:")) {
        state
            .memory_events
            .push(TrialEvent::new(value, effective_realm.clone(), now));
    }
    for value in additions(&all_tags(tags, "sig:")) {
        state
            .signal_events
            .push(TrialEvent::new(value, effective_realm.clone(), now));
    }

    if let Some(mood) = next_mood {
        state.mood = mood.to_owned();
    }
    if let Some(scene) = next_scene {
        state.scene = scene.to_owned();
    }
    if let Some(realm) = next_realm {
        state.realm_key = realm.to_owned();
    }
    if let Some(prompt_id) = next_prompt_id {
        state.prompt_id = Some(prompt_id.to_owned());
    }
    if let Some(title) = next_prompt_title {
        state.prompt_title = Some(title.to_owned());
    }

    let draw_raw = draw_raw?;
    let count = draw_raw
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n != 0)
        .unwrap_or(DEFAULT_DRAW_COUNT);

    let stats = TrialStats::from_engine(engine);
    let seed = if stats.spread_seed == 0 {
        DEFAULT_SPREAD_SEED
    } else {
        stats.spread_seed
    };

    let cards = draw_spread(seed, deck, count);
    state.spread = cards.clone();

    let reading = build_reading(&ReadingInputs {
        realm_key: &effective_realm,
        realm_filter: &effective_realm,
        signal_events: &state.signal_events,
        memory_events: &state.memory_events,
        spread: &state.spread,
        answers_by_prompt: &state.answers_by_prompt,
    });
    state.realm_end_reading = Some(RealmEndReading {
        realm: effective_realm,
        at: now,
        reading,
    });

    Some(DrawRecord { seed, cards })
}
