//! Height-keyed batch storage
//!
//! Holds at most one batch per height. A later write at the same height
//! replaces the earlier one.

use super::KvStore;
use crate::{Batch, LastLookError, Result, codec};
use ethers::types::Bytes;
use tracing::debug;

/// Key prefix for queued batches
const BATCH_QUEUE_PREFIX: &[u8] = b"lastlook/batch/";

/// Store key for the batch queued at `height`
pub fn batch_key(height: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(BATCH_QUEUE_PREFIX.len() + 8);
    key.extend_from_slice(BATCH_QUEUE_PREFIX);
    key.extend_from_slice(&height.to_be_bytes());
    key
}

/// Batch storage shared by the scheduler, validator and committer
#[derive(Clone)]
pub struct BatchStore<S> {
    store: S,
}

impl<S: KvStore> BatchStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying key-value store
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Persist `batch` at `height`, overwriting any existing entry
    pub async fn put(&self, height: u64, batch: &Batch) -> Result<()> {
        let bytes = codec::marshal(batch)?;
        self.store.set(&batch_key(height), bytes).await?;
        debug!(
            "Stored batch for height {} with {} txs",
            height,
            batch.transactions.len()
        );
        Ok(())
    }

    /// Batch that must be executed at `height`
    ///
    /// Heights 0 and 1 have no prior round and always resolve to the empty
    /// batch without touching storage.
    pub async fn get(&self, height: u64) -> Result<Batch> {
        if height <= 1 {
            return Ok(Batch::empty());
        }

        let bytes = self
            .store
            .get(&batch_key(height))
            .await?
            .ok_or(LastLookError::BatchNotFound { height })?;

        codec::unmarshal(&bytes)
    }

    /// Proposer who committed the batch due at `height`
    ///
    /// Empty for the bootstrap heights and for degraded finalizations.
    pub async fn proposer_for(&self, height: u64) -> Result<Bytes> {
        Ok(self.get(height).await?.proposer)
    }

    pub async fn delete(&self, height: u64) -> Result<()> {
        self.store.delete(&batch_key(height)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn batch(proposer: &[u8], txs: &[&[u8]]) -> Batch {
        Batch::new(
            Bytes::from(proposer.to_vec()),
            txs.iter().map(|tx| Bytes::from(tx.to_vec())).collect(),
        )
    }

    #[tokio::test]
    async fn bootstrap_heights_are_empty_without_a_write() {
        let store = BatchStore::new(MemoryStore::new());

        assert_eq!(store.get(1).await.unwrap(), Batch::empty());
        assert_eq!(store.get(0).await.unwrap(), Batch::empty());
        assert!(store.inner().is_empty().await);
    }

    #[tokio::test]
    async fn missing_height_is_not_found() {
        let store = BatchStore::new(MemoryStore::new());

        let err = store.get(5).await.unwrap_err();
        assert!(matches!(err, LastLookError::BatchNotFound { height: 5 }));
    }

    #[tokio::test]
    async fn later_write_wins() {
        let store = BatchStore::new(MemoryStore::new());
        store.put(3, &batch(b"a", &[b"1", b"2"])).await.unwrap();
        store.put(3, &batch(b"b", &[b"3"])).await.unwrap();

        assert_eq!(store.get(3).await.unwrap(), batch(b"b", &[b"3"]));
        assert_eq!(store.proposer_for(3).await.unwrap(), Bytes::from(b"b".to_vec()));
    }

    #[tokio::test]
    async fn delete_removes_the_entry() {
        let store = BatchStore::new(MemoryStore::new());
        store.put(4, &batch(b"a", &[b"x"])).await.unwrap();

        store.delete(4).await.unwrap();
        assert!(matches!(
            store.get(4).await,
            Err(LastLookError::BatchNotFound { height: 4 })
        ));
        // Deleting again is harmless.
        store.delete(4).await.unwrap();
    }

    #[test]
    fn keys_sort_by_height() {
        assert!(batch_key(2) < batch_key(10));
        assert!(batch_key(255) < batch_key(256));
    }
}
