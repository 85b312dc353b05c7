//! Route modules organized by surface.

pub mod codex;
pub mod health;
pub mod reading;
pub mod session;
pub mod trial;
pub mod viewer;
