//! SQLite backend for the AskMate forum store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each logical operation is a single
//! `call` on that thread; operations touching more than one row open a
//! transaction inside the call and commit only after every step succeeded.
//!
//! Referential integrity is procedural: the schema declares no foreign keys,
//! and the [`cascade`] plans remove dependents before their parents.

mod aggregate;
mod cascade;
mod encode;
mod repository;
mod schema;
mod search;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
