//! The reading synthesizer.
//!
//! `build_reading` is a pure function of its inputs: no clock, no
//! randomness, no side effects. It is recomputed on every render and also
//! snapshotted at realm completion as a realm report.

use std::collections::BTreeMap;

use seergate_core::answer::Answer;
use seergate_core::event::TrialEvent;
use serde::{Deserialize, Serialize};

use crate::draw::DrawnCard;
use crate::phrases;

/// Realm filter value meaning "no filtering".
pub const REALM_FILTER_ALL: &str = "all";

/// Everything a reading is derived from.
#[derive(Debug, Clone, Copy)]
pub struct ReadingInputs<'a> {
    /// Realm the reading is *about* (titles, next question, invitation).
    pub realm_key: &'a str,
    /// Realm the event/answer lists are filtered by (`"all"` passes through).
    pub realm_filter: &'a str,
    /// Accumulated signal events.
    pub signal_events: &'a [TrialEvent],
    /// Accumulated memory events.
    pub memory_events: &'a [TrialEvent],
    /// The current spread.
    pub spread: &'a [DrawnCard],
    /// Recorded answers keyed by prompt id.
    pub answers_by_prompt: &'a BTreeMap<String, Answer>,
}

/// A card as rendered inside a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingCard {
    /// Display name.
    pub name: String,
    /// Facing, rendered as `Upright`/`Reversed`.
    pub orientation: String,
    /// Keywords for the drawn facing.
    pub keywords: Vec<String>,
}

/// The synthesized reading. Field names follow the historical payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Heading, e.g. `Reading — Realm I: The Threshold`.
    pub title: String,
    /// Realm the reading is about.
    pub realm_key: String,
    /// Realm filter the lists were narrowed by.
    pub realm_filter: String,
    /// The composed voice line for the top vibe and edge.
    pub gate_voice: String,
    /// Top vibe phrases plus the top edge phrase.
    pub highlights: Vec<String>,
    /// Top memory categories, most frequent first.
    pub edge: Vec<String>,
    /// Top signal categories, most frequent first.
    pub vibe: Vec<String>,
    /// Up to five cards of the spread.
    pub cards: Vec<ReadingCard>,
    /// The spread rendered as one line.
    pub card_line: String,
    /// Follow-up question for this realm.
    pub next_question: String,
    /// Invitation toward the next realm in the sequence.
    pub invite_next_realm: String,
    /// Shareable summary text.
    pub text_to_send: String,
    /// The filtered answers, oldest first.
    pub answers: Vec<Answer>,
}

fn filtered_values(events: &[TrialEvent], realm_filter: &str) -> Vec<String> {
    let extract = |list: &mut dyn Iterator<Item = &TrialEvent>| -> Vec<String> {
        list.map(|e| e.value.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect()
    };

    if realm_filter.is_empty() || realm_filter == REALM_FILTER_ALL {
        return extract(&mut events.iter());
    }
    let narrowed = extract(&mut events.iter().filter(|e| e.realm == realm_filter));
    if narrowed.is_empty() {
        // A narrow filter must never produce an empty reading.
        extract(&mut events.iter())
    } else {
        narrowed
    }
}

/// Ranks values by descending frequency; ties keep first-seen order.
fn top_counts(values: &[String]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(k, _)| k == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn top_categories(values: &[String], take: usize, defaults: &[&str]) -> Vec<String> {
    let ranked: Vec<String> = top_counts(values)
        .into_iter()
        .take(take)
        .map(|(k, _)| k)
        .collect();
    if ranked.is_empty() {
        defaults.iter().map(|&d| d.to_owned()).collect()
    } else {
        ranked
    }
}

fn best_note(answers: &[Answer]) -> Option<String> {
    answers
        .iter()
        .rev()
        .map(|a| a.note.trim())
        .find(|n| !n.is_empty())
        .map(str::to_owned)
}

/// Synthesizes a reading. Pure and idempotent: identical inputs always
/// produce an identical record.
#[must_use]
pub fn build_reading(inputs: &ReadingInputs<'_>) -> Reading {
    let mut answers: Vec<Answer> = inputs
        .answers_by_prompt
        .values()
        .filter(|a| {
            inputs.realm_filter == REALM_FILTER_ALL || a.realm == inputs.realm_filter
        })
        .cloned()
        .collect();
    answers.sort_by_key(|a| a.at);

    let sig_values = filtered_values(inputs.signal_events, inputs.realm_filter);
    let mem_values = filtered_values(inputs.memory_events, inputs.realm_filter);

    let vibe = top_categories(&sig_values, 3, &phrases::DEFAULT_VIBE);
    let edge = top_categories(&mem_values, 2, &phrases::DEFAULT_EDGE);

    let note = best_note(&answers);

    let cards: Vec<ReadingCard> = inputs
        .spread
        .iter()
        .take(5)
        .map(|c: &DrawnCard| ReadingCard {
            name: c.name.clone(),
            orientation: c.orientation.to_string(),
            keywords: c.keywords.clone(),
        })
        .collect();

    let card_line = if cards.is_empty() {
        phrases::NO_SPREAD_LINE.to_owned()
    } else {
        cards
            .iter()
            .map(|c| format!("{} ({})", c.name, c.orientation))
            .collect::<Vec<_>>()
            .join(" • ")
    };

    let title = format!(
        "Reading — {}",
        phrases::realm_name(inputs.realm_key).unwrap_or("Seer's Trial")
    );

    let gate_voice = format!(
        "{} {}",
        phrases::vibe_line(&vibe[0]).unwrap_or("You have a signature energy."),
        phrases::edge_line(&edge[0]).unwrap_or("And you don't tolerate nonsense.")
    );

    let mut highlights = vec![
        phrases::vibe_line(&vibe[0])
            .map_or_else(|| format!("Primary: {}", vibe[0]), str::to_owned),
    ];
    if let Some(second) = vibe.get(1) {
        highlights.push(
            phrases::vibe_line(second)
                .map_or_else(|| format!("Secondary: {second}"), str::to_owned),
        );
    }
    highlights.push(
        phrases::edge_line(&edge[0]).map_or_else(|| format!("Edge: {}", edge[0]), str::to_owned),
    );

    let invite_next_realm = match phrases::next_realm(inputs.realm_key) {
        Some(next) => format!(
            "If you want to keep going: the Gate just unlocked **{}**. Want the next trial?",
            phrases::realm_name(next).unwrap_or(next)
        ),
        None => "The Gate has no further Realms to open... yet.".to_owned(),
    };

    let next_question = phrases::next_question(inputs.realm_key).to_owned();

    let verdict = format!("Seer's Trial verdict: you give off {} energy.", vibe.join(", "));
    let text_to_send = match &note {
        Some(note) => format!(
            "{verdict} And that line you wrote, \"{note}\", stuck with me. {invite_next_realm} (Also... {next_question})"
        ),
        None => format!("{verdict} {invite_next_realm} (Also... {next_question})"),
    };

    Reading {
        title,
        realm_key: inputs.realm_key.to_owned(),
        realm_filter: inputs.realm_filter.to_owned(),
        gate_voice,
        highlights,
        edge,
        vibe,
        cards,
        card_line,
        next_question,
        invite_next_realm,
        text_to_send,
        answers,
    }
}

/// Renders a reading as shareable plain text.
#[must_use]
pub fn reading_to_text(reading: &Reading) -> String {
    let mut lines = Vec::new();
    lines.push(reading.title.clone());
    lines.push(String::new());
    lines.push(format!("Gate Voice: {}", reading.gate_voice));
    lines.push(String::new());
    lines.push("Highlights:".to_owned());
    for h in &reading.highlights {
        lines.push(format!("• {h}"));
    }
    lines.push(String::new());
    lines.push(format!("Spread: {}", reading.card_line));
    lines.push(String::new());
    lines.push(format!("Next question: {}", reading.next_question));
    lines.push(String::new());
    lines.push("Text to send:".to_owned());
    lines.push(reading.text_to_send.clone());
    lines.push(String::new());
    lines.push("Captured answers:".to_owned());
    if reading.answers.is_empty() {
        lines.push("• (No typed answers captured.)".to_owned());
    } else {
        for a in &reading.answers {
            let title = if a.title.is_empty() { "Question" } else { &a.title };
            let choice = if a.choice.is_empty() {
                String::new()
            } else {
                format!(" (picked: {})", a.choice)
            };
            let note = if a.note.is_empty() {
                String::new()
            } else {
                format!(" — {}", a.note)
            };
            lines.push(format!("• {title}{choice}{note}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DrawnCard, Orientation};
    use chrono::{TimeZone, Utc};

    fn event(value: &str, realm: &str) -> TrialEvent {
        TrialEvent::new(value, realm, Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn answer(realm: &str, note: &str, minute: u32) -> Answer {
        Answer {
            realm: realm.to_owned(),
            title: "Q".to_owned(),
            choice: "picked".to_owned(),
            note: note.to_owned(),
            at: Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap(),
        }
    }

    fn empty_inputs<'a>(
        answers: &'a BTreeMap<String, Answer>,
    ) -> ReadingInputs<'a> {
        ReadingInputs {
            realm_key: "threshold",
            realm_filter: REALM_FILTER_ALL,
            signal_events: &[],
            memory_events: &[],
            spread: &[],
            answers_by_prompt: answers,
        }
    }

    #[test]
    fn test_empty_inputs_substitute_fixed_defaults() {
        let answers = BTreeMap::new();

        let reading = build_reading(&empty_inputs(&answers));

        assert_eq!(reading.vibe, vec!["playful", "symbolic", "intuitive"]);
        assert_eq!(reading.edge, vec!["truth"]);
        assert_eq!(reading.card_line, "No spread captured.");
        assert_eq!(reading.title, "Reading — Realm I: The Threshold");
    }

    #[test]
    fn test_synthesis_is_pure() {
        let answers = BTreeMap::from([("p1".to_owned(), answer("threshold", "a line", 1))]);
        let signals = vec![event("playful", "threshold"), event("guarded", "lantern")];
        let memories = vec![event("truth", "threshold")];
        let spread = vec![DrawnCard {
            id: "fool".to_owned(),
            name: "The Fool".to_owned(),
            orientation: Orientation::Reversed,
            keywords: vec!["recklessness".to_owned()],
        }];
        let inputs = ReadingInputs {
            realm_key: "threshold",
            realm_filter: "threshold",
            signal_events: &signals,
            memory_events: &memories,
            spread: &spread,
            answers_by_prompt: &answers,
        };

        let first = build_reading(&inputs);
        let second = build_reading(&inputs);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_narrow_filter_with_no_matches_falls_back_to_full_lists() {
        let answers = BTreeMap::new();
        let signals = vec![event("guarded", "threshold"), event("guarded", "threshold")];
        let inputs = ReadingInputs {
            realm_filter: "veil",
            signal_events: &signals,
            ..empty_inputs(&answers)
        };

        let reading = build_reading(&inputs);

        // Not the defaults: the unfiltered list was used.
        assert_eq!(reading.vibe, vec!["guarded"]);
    }

    #[test]
    fn test_frequency_ranking_breaks_ties_by_first_seen() {
        let answers = BTreeMap::new();
        let signals = vec![
            event("symbolic", "threshold"),
            event("playful", "threshold"),
            event("playful", "threshold"),
            event("grounded", "threshold"),
        ];
        let inputs = ReadingInputs {
            signal_events: &signals,
            ..empty_inputs(&answers)
        };

        let reading = build_reading(&inputs);

        assert_eq!(reading.vibe, vec!["playful", "symbolic", "grounded"]);
    }

    #[test]
    fn test_best_note_is_most_recent_non_empty() {
        let answers = BTreeMap::from([
            ("p1".to_owned(), answer("threshold", "older line", 1)),
            ("p2".to_owned(), answer("threshold", "newest line", 9)),
            ("p3".to_owned(), answer("threshold", "   ", 20)),
        ]);

        let reading = build_reading(&empty_inputs(&answers));

        assert!(reading.text_to_send.contains("\"newest line\""));
    }

    #[test]
    fn test_card_line_renders_name_and_orientation() {
        let answers = BTreeMap::new();
        let spread = vec![
            DrawnCard {
                id: "fool".to_owned(),
                name: "The Fool".to_owned(),
                orientation: Orientation::Upright,
                keywords: vec![],
            },
            DrawnCard {
                id: "moon".to_owned(),
                name: "The Moon".to_owned(),
                orientation: Orientation::Reversed,
                keywords: vec![],
            },
        ];
        let inputs = ReadingInputs {
            spread: &spread,
            ..empty_inputs(&answers)
        };

        let reading = build_reading(&inputs);

        assert_eq!(reading.card_line, "The Fool (Upright) • The Moon (Reversed)");
    }

    #[test]
    fn test_final_realm_has_no_further_invitation() {
        let answers = BTreeMap::new();
        let inputs = ReadingInputs {
            realm_key: "veil",
            ..empty_inputs(&answers)
        };

        let reading = build_reading(&inputs);

        assert_eq!(
            reading.invite_next_realm,
            "The Gate has no further Realms to open... yet."
        );
    }

    #[test]
    fn test_plain_text_export_lists_answers() {
        let answers = BTreeMap::from([("p1".to_owned(), answer("threshold", "my line", 1))]);

        let text = reading_to_text(&build_reading(&empty_inputs(&answers)));

        assert!(text.starts_with("Reading — "));
        assert!(text.contains("• Q (picked: picked) — my line"));
    }
}
