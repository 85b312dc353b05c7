//! Seergate Core — shared ports and domain types.
//!
//! This crate defines the capability traits and fundamental types every other
//! crate depends on. It contains no infrastructure code: clocks, random
//! sources, and stores are injected at the composition root.

pub mod answer;
pub mod clock;
pub mod error;
pub mod event;
pub mod rng;
pub mod store;

/// Sentinel realm key used before any realm has been entered, and for events
/// restored from payloads that predate realm tagging.
pub const NO_REALM: &str = "—";
