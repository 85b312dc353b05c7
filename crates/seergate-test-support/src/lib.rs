//! Shared test mocks and utilities for the Seergate workspace.

mod clock;
mod rng;
mod store;

pub use clock::FixedClock;
pub use rng::{FixedRandomSource, SequenceRng};
pub use store::{
    FailingSessionStore, GatedSessionStore, MemoryDocumentStore, RecordingSessionStore,
};
