//! The seeded draw generator.
//!
//! Identical seed + deck + count must always yield an identical sequence:
//! the same cards, in the same order, with the same orientations. Stored
//! seeds replay spreads across sessions and in the observer view.

use seergate_core::rng::{DeterministicRng, Mulberry32};
use serde::{Deserialize, Serialize};

use crate::deck::Deck;

/// Probability that a drawn card lands reversed.
pub const REVERSED_PROBABILITY: f64 = 0.45;

/// Card facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// The card's upright meaning applies.
    Upright,
    /// The card's reversed meaning applies.
    Reversed,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upright => f.write_str("Upright"),
            Self::Reversed => f.write_str("Reversed"),
        }
    }
}

/// One card as drawn: identity plus orientation plus the keyword set the
/// orientation selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    /// Stable card identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Facing decided by the per-card coin flip.
    pub orientation: Orientation,
    /// Keywords for the drawn facing.
    pub keywords: Vec<String>,
}

/// Draws `count` distinct cards from the deck using the mulberry32 stream
/// seeded by `seed`. Returns fewer than `count` cards when the deck is
/// smaller; never errors.
#[must_use]
pub fn draw_spread(seed: u32, deck: &Deck, count: usize) -> Vec<DrawnCard> {
    let mut rng = Mulberry32::new(seed);
    draw_spread_with(&mut rng, deck, count)
}

/// Draw against an injected generator (tests use a `SequenceRng`).
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn draw_spread_with(
    rng: &mut dyn DeterministicRng,
    deck: &Deck,
    count: usize,
) -> Vec<DrawnCard> {
    let mut pool: Vec<usize> = (0..deck.len()).collect();
    let mut spread = Vec::with_capacity(count.min(deck.len()));

    for _ in 0..count {
        if pool.is_empty() {
            break;
        }
        let index = (rng.next_f64() * pool.len() as f64) as usize;
        let picked = &deck.cards[pool.remove(index)];

        let reversed = rng.next_f64() < REVERSED_PROBABILITY;
        let (orientation, keywords) = if reversed {
            (Orientation::Reversed, picked.keywords_reversed.clone())
        } else {
            (Orientation::Upright, picked.keywords_upright.clone())
        };

        spread.push(DrawnCard {
            id: picked.id.clone(),
            name: picked.name.clone(),
            orientation,
            keywords,
        });
    }

    spread
}
