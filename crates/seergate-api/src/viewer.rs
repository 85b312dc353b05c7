//! Viewer context resolution.
//!
//! Share links carry up to four query parameters: `code`, `mode`, `admin`,
//! and `whisper`. This module resolves them into the context a client
//! renders under. Anything unrecognized falls back to the player defaults,
//! so a mangled link still opens a playable trial.

use serde::{Deserialize, Serialize};

/// Who is looking at the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerMode {
    /// The player taking the trial.
    Player,
    /// A read-only observer watching results.
    Observer,
}

/// Raw query parameters as they arrive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewerParams {
    /// Session code.
    pub code: Option<String>,
    /// `observer` selects observer mode; anything else is player.
    pub mode: Option<String>,
    /// `1` enables the admin surfaces.
    pub admin: Option<String>,
    /// `0` disables the whisper prompt.
    pub whisper: Option<String>,
}

/// The resolved context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerContext {
    /// Resolved mode.
    pub mode: ViewerMode,
    /// Whether admin surfaces are visible.
    pub admin: bool,
    /// Whether choices on a prompt should collect a whisper note.
    pub whisper: bool,
    /// Normalized session code, if one was supplied.
    pub code: Option<String>,
    /// Observers watch live; players do not.
    pub live_watch: bool,
    /// Tab the client should open on.
    pub active_tab: &'static str,
}

impl ViewerContext {
    /// Resolves raw parameters into a context.
    #[must_use]
    pub fn resolve(params: &ViewerParams) -> Self {
        let mode = if params.mode.as_deref() == Some("observer") {
            ViewerMode::Observer
        } else {
            ViewerMode::Player
        };
        let code = params
            .code
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        Self {
            mode,
            admin: params.admin.as_deref() == Some("1"),
            whisper: params.whisper.as_deref() != Some("0"),
            code,
            live_watch: mode == ViewerMode::Observer,
            active_tab: match mode {
                ViewerMode::Observer => "results",
                ViewerMode::Player => "trial",
            },
        }
    }
}
