//! Seergate — Persistence adapters.
//!
//! Concrete implementations of the core persistence ports: a JSON-file
//! `DocumentStore` for the local save/ledger documents and a `PostgreSQL`
//! `SessionStore` for shared session rows.

pub mod fs;
pub mod pg;
pub mod schema;

pub use fs::JsonFileStore;
pub use pg::PgSessionStore;
