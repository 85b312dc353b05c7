//! Domain error types.

use thiserror::Error;

/// Top-level error type shared across the Seergate crates.
///
/// Play-path failures (persistence, reading synthesis, engine restore) are
/// deliberately swallowed and logged at their call sites; this type covers
/// the operations that legitimately fail outward, such as session lookup.
#[derive(Debug, Error)]
pub enum GateError {
    /// No session row exists for the given code.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A request or document failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The story engine rejected an operation (bad choice index, corrupt
    /// script, malformed state snapshot).
    #[error("story engine error: {0}")]
    Engine(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Infrastructure(format!("serialization failed: {err}"))
    }
}
