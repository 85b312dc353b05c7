//! Seergate — Session & Progress.
//!
//! Everything that turns raw narrative steps into a persistent trial: the
//! tag interpreter, the session controller, save payloads, run history,
//! card unlocks, gate memory, session codes, cloud sync, and the observer
//! live-watch poller.

pub mod cloud;
pub mod codes;
pub mod controller;
pub mod gate_memory;
pub mod history;
pub mod live_watch;
pub mod payload;
pub mod state;
pub mod tags;
pub mod unlocks;
