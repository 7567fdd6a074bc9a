//! Store fixtures for unit tests

use super::{KvStore, MemoryStore};
use crate::{LastLookError, Result};

/// Store whose reads and deletes succeed but whose writes always fail
///
/// Wraps a `MemoryStore` so tests can seed it before handing it over.
#[derive(Clone, Default)]
pub struct ReadOnlyStore {
    pub inner: MemoryStore,
}

impl ReadOnlyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner }
    }
}

impl KvStore for ReadOnlyStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &[u8], _value: Vec<u8>) -> Result<()> {
        Err(LastLookError::Store(sqlx::Error::PoolClosed))
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(key).await
    }
}
