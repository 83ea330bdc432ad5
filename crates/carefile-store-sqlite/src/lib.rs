//! SQLite backend for the Carefile record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The field-history engine's upsert runs
//! inside a single rusqlite transaction: change detection, history append,
//! metadata upsert, and the live-value replacement commit or roll back
//! together.

mod encode;
mod schema;
mod seed;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
