//! Batch Store Module
//!
//! This module persists committed batches keyed by block height:
//! - `KvStore`: the byte-level key-value seam the node's state tree provides
//! - `MemoryStore` / `SqliteStore`: the two backends the node can run on
//! - `BatchStore`: height-keyed batch storage on top of any `KvStore`

mod kv;
mod sqlite;
mod batch_store;

#[cfg(test)]
pub(crate) mod testing;

pub use kv::{KvStore, MemoryStore};
pub use sqlite::SqliteStore;
pub use batch_store::{BatchStore, batch_key};
