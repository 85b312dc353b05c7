//! Seergate — divination.
//!
//! Everything here is pure: the deck model, the seeded draw generator, the
//! phrase tables, and the reading synthesizer. No clock, no I/O, no ambient
//! environment. The session layer injects the inputs and owns the effects.

pub mod deck;
pub mod draw;
pub mod phrases;
pub mod reading;
