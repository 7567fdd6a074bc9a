//! Key-value store seam
//!
//! The batch store only needs three operations from the underlying state
//! tree. Backends are cheap to clone so every pipeline stage can hold its own
//! handle onto the same data.

use crate::Result;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Byte-level key-value store
pub trait KvStore: Clone + Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if absent
    fn get(&self, key: &[u8]) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &[u8], value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    /// Remove `key`; removing an absent key is not an error
    fn delete(&self, key: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

/// In-process store
///
/// Backed by an ordered map so iteration order (and therefore any debugging
/// dump) is deterministic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_vec(), value);
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}
