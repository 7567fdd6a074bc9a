//! Batch Committer Module
//!
//! Runs on every validator once a block is finalized, before any of its
//! transactions are executed.
//!
//! # Failure Handling
//! A block that carries no decodable commitment still finalizes: an empty
//! batch is queued for the next height and a warning is logged. Halting
//! finalization over a decoding issue would stop the chain. Store write
//! failures are returned, since the next round cannot be verified without
//! the commitment.
//!
//! The batch due at the finalized height is only removed after the next
//! commitment has been written, so a failed call leaves it in place and
//! replaying `pre_block` for the same height produces the same result.

use super::FeatureFlags;
use crate::{
    Batch, FinalizedBatch, LastLookError, NUM_INJECTED_TXS, RawTx, Result, codec,
    store::{BatchStore, KvStore},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Committer<S> {
    store: BatchStore<S>,
    flags: Arc<dyn FeatureFlags>,
}

impl<S: KvStore> Committer<S> {
    pub fn new(store: BatchStore<S>, flags: Arc<dyn FeatureFlags>) -> Self {
        Self { store, flags }
    }

    /// Finalize the block at `height`
    ///
    /// # Arguments
    /// * `height` - Height of the finalized block
    /// * `txs` - The finalized block's transactions, injected slots included
    ///
    /// # Returns
    /// The batch to execute at `height` and the batch queued for `height + 1`
    pub async fn pre_block(&self, height: u64, txs: &[RawTx]) -> Result<FinalizedBatch> {
        debug!("Executing the pre-finalize block hook for height {}", height);

        let execute = match self.store.get(height).await {
            Ok(batch) => batch,
            Err(LastLookError::BatchNotFound { .. }) => {
                warn!("No batch committed for height {}, executing nothing", height);
                Batch::empty()
            }
            Err(e) => return Err(e),
        };

        let queued = self.announced_batch(height, txs);
        self.store.put(height + 1, &queued).await?;

        // Dequeue only once the next commitment is safely stored.
        self.store.delete(height).await?;

        info!(
            "Finalized height {}: {} txs to execute, {} txs queued for height {}",
            height,
            execute.transactions.len(),
            queued.transactions.len(),
            height + 1
        );

        Ok(FinalizedBatch {
            height,
            execute,
            queued,
        })
    }

    /// Batch announced by the block, or the empty batch if there is none
    fn announced_batch(&self, height: u64, txs: &[RawTx]) -> Batch {
        if txs.len() < NUM_INJECTED_TXS {
            warn!("Block at height {} doesn't contain a txs batch", height);
            return Batch::empty();
        }

        let mut index = self.flags.commit_slot_offset(height);
        // Vote extensions may be enabled without their transaction being
        // present; the commitment is then the first transaction.
        if txs.len() <= index {
            index = 0;
        }

        match codec::unmarshal(&txs[index]) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    "Failed to unmarshal txs batch at index {} for height {}: {}",
                    index, height, e
                );
                Batch::empty()
            }
        }
    }
}
