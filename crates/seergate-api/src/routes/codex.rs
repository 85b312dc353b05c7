//! Codex endpoints: the deck with unlock status, run history, and the
//! Gate's long memory.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use seergate_session::gate_memory::{self, GateMemory};
use seergate_session::history::{self, RunRecord};
use seergate_session::unlocks::{self, CardUnlock};

use crate::state::AppState;

/// One deck entry with its unlock status. Locked cards stay shrouded: no
/// name or keywords until the card has appeared in a spread.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodexCard {
    /// Stable card id.
    pub id: String,
    /// Display name, absent while locked.
    pub name: Option<String>,
    /// Upright keywords, absent while locked.
    pub keywords_upright: Option<Vec<String>>,
    /// Reversed keywords, absent while locked.
    pub keywords_reversed: Option<Vec<String>>,
    /// Unlock record, absent while locked.
    pub unlock: Option<CardUnlock>,
}

/// Response for GET /cards.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodexResponse {
    /// Cards discovered so far.
    pub discovered: usize,
    /// Deck size.
    pub total: usize,
    /// All cards in authored order.
    pub cards: Vec<CodexCard>,
}

/// GET /cards
async fn cards(State(state): State<AppState>) -> Json<CodexResponse> {
    let ledger = unlocks::load(state.local.as_ref());
    let cards: Vec<CodexCard> = state
        .deck
        .cards
        .iter()
        .map(|card| {
            let unlock = ledger.cards.get(&card.id).cloned();
            if let Some(unlock) = unlock {
                CodexCard {
                    id: card.id.clone(),
                    name: Some(card.name.clone()),
                    keywords_upright: Some(card.keywords_upright.clone()),
                    keywords_reversed: Some(card.keywords_reversed.clone()),
                    unlock: Some(unlock),
                }
            } else {
                CodexCard {
                    id: card.id.clone(),
                    name: None,
                    keywords_upright: None,
                    keywords_reversed: None,
                    unlock: None,
                }
            }
        })
        .collect();
    Json(CodexResponse {
        discovered: ledger.cards.len(),
        total: state.deck.len(),
        cards,
    })
}

/// GET /history
async fn run_history(State(state): State<AppState>) -> Json<Vec<RunRecord>> {
    Json(history::load(state.local.as_ref()))
}

/// GET /memory
async fn memory(State(state): State<AppState>) -> Json<GateMemory> {
    Json(gate_memory::load(state.local.as_ref()))
}

/// Returns the router for the codex surface.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cards", get(cards))
        .route("/history", get(run_history))
        .route("/memory", get(memory))
}
