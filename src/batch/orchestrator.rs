//! Batch Orchestrator Module
//!
//! This module wires the three consensus callbacks onto one shared batch
//! store. The consensus engine calls them in order for every height:
//!
//! # Per-Height Flow
//! 1. `prepare_proposal` (proposer only): echo the batch due now, commit the
//!    mempool candidates for the next height
//! 2. `process_proposal` (every validator): verify the echo and the commitment
//! 3. `finalize_block` (every validator): hand the due batch to execution and
//!    queue the commitment from the canonical block

use crate::{
    Batch, FinalizedBatch, RawTx, Result, Verdict,
    batch::{Committer, FeatureFlags},
    scheduler::{ProposalRequest, Scheduler},
    store::{BatchStore, KvStore},
    validation::{ProcessRequest, Validator},
};
use ethers::types::Bytes;
use std::sync::Arc;

/// Delayed-commit pipeline for one node
///
/// All three stages share the same `BatchStore`, so the batch the scheduler
/// or committer writes at `h + 1` is the one the validator reads next height.
pub struct BatchOrchestrator<S> {
    /// Store read directly by the query methods
    store: BatchStore<S>,
    /// Builds proposals when this node is the proposer
    scheduler: Scheduler<S>,
    /// Verifies proposals from any proposer
    validator: Validator<S>,
    /// Moves batches along the queue once a block is final
    committer: Committer<S>,
}

impl<S: KvStore> BatchOrchestrator<S> {
    /// Creates a new orchestrator over `store`
    ///
    /// # Arguments
    /// * `store` - The node's key-value store; every stage shares it
    /// * `flags` - Consensus parameters that decide the commitment slot index
    pub fn new(store: S, flags: Arc<dyn FeatureFlags>) -> Self {
        let store = BatchStore::new(store);
        Self {
            scheduler: Scheduler::new(store.clone()),
            validator: Validator::new(store.clone()),
            committer: Committer::new(store.clone(), flags),
            store,
        }
    }

    /// PrepareProposal for the block at `req.height`
    ///
    /// # Returns
    /// The proposal's transactions: the commitment slot followed by the
    /// committed batch due at `req.height`
    pub async fn prepare_proposal(&self, req: ProposalRequest) -> Result<Vec<RawTx>> {
        self.scheduler.prepare_proposal(req).await
    }

    /// ProcessProposal for a received block
    ///
    /// # Returns
    /// `Accepted`, `Rejected` with the reason, or `Fatal` if the committed
    /// batch could not be loaded
    pub async fn process_proposal(&self, req: &ProcessRequest) -> Verdict {
        self.validator.process_proposal(req).await
    }

    /// Finalization hook for the block decided at `height`
    ///
    /// # Arguments
    /// * `height` - Height of the finalized block
    /// * `txs` - The finalized block's transactions
    ///
    /// # Returns
    /// The batch to execute now and the batch queued for `height + 1`
    pub async fn finalize_block(&self, height: u64, txs: &[RawTx]) -> Result<FinalizedBatch> {
        self.committer.pre_block(height, txs).await
    }

    /// Batch currently due at `height`
    pub async fn batch(&self, height: u64) -> Result<Batch> {
        self.store.get(height).await
    }

    /// Proposer who committed the batch due at `height`
    pub async fn proposer(&self, height: u64) -> Result<Bytes> {
        self.store.proposer_for(height).await
    }
}
