//! Seergate — story-engine boundary.
//!
//! The narrative itself lives in an externally authored, compiled script.
//! This crate defines the boundary trait the rest of the system talks to,
//! a compact interpreter for the compiled-script document format, and the
//! advancer that drives an engine until it yields choices or ends.

pub mod advancer;
pub mod scripted;
pub mod stats;
pub mod story;
