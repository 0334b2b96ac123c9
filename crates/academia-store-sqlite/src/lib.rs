//! SQLite backend for Academia.
//!
//! Implements every capability in [`academia_core::store`]: one table per
//! role partition, a credentials table standing in for the identity provider,
//! and a sessions table. Wraps [`tokio_rusqlite`] so all database access runs
//! on a dedicated thread without blocking the async runtime.

mod encode;
mod schema;
mod store;
mod token;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqlitePartition, SqliteStore};

#[cfg(test)]
mod tests;
