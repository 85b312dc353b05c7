//! The card deck.

use seergate_core::error::GateError;
use serde::{Deserialize, Serialize};

/// One card template with both keyword sets. The wire field names match the
/// historical deck document format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    /// Stable card identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Keywords shown when drawn upright.
    #[serde(rename = "keywordsUpright")]
    pub keywords_upright: Vec<String>,
    /// Keywords shown when drawn reversed.
    #[serde(rename = "keywordsReversed")]
    pub keywords_reversed: Vec<String>,
}

/// An ordered deck of card templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    /// The templates, in authored order.
    pub cards: Vec<CardTemplate>,
}

impl Deck {
    /// Parses a deck document (a JSON array of card templates).
    ///
    /// # Errors
    ///
    /// Returns `GateError::Validation` if the document does not parse or
    /// contains duplicate card ids.
    pub fn from_json(doc: &str) -> Result<Self, GateError> {
        let deck: Self = serde_json::from_str(doc)
            .map_err(|e| GateError::Validation(format!("deck parse failed: {e}")))?;
        let mut seen = std::collections::HashSet::new();
        for card in &deck.cards {
            if !seen.insert(card.id.as_str()) {
                return Err(GateError::Validation(format!(
                    "duplicate card id: {}",
                    card.id
                )));
            }
        }
        Ok(deck)
    }

    /// The built-in major-arcana deck shipped with the workspace.
    ///
    /// # Panics
    ///
    /// Panics if the embedded deck asset is invalid, which is a build defect.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(include_str!("../data/deck.json"))
            .expect("embedded deck asset is valid")
    }

    /// Number of cards in the deck.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the deck is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Looks up a card template by id.
    #[must_use]
    pub fn card(&self, id: &str) -> Option<&CardTemplate> {
        self.cards.iter().find(|c| c.id == id)
    }
}
