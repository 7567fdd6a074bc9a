//! Proposal Scheduler Module
//!
//! Runs on the proposer only, once per height.
//!
//! # Proposal Layout
//! 1. Slot 0: the serialized commitment for the next height (always present)
//! 2. The transactions committed one round earlier, in their committed order
//!
//! Mempool candidates seen this round are never executed in this block; they
//! are only committed to, and get executed one height later.

use super::packing::{filter_committed, inject_and_resize, total_bytes};
use crate::{
    Batch, LastLookError, RawTx, Result, codec,
    store::{BatchStore, KvStore},
};
use ethers::types::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Inputs handed over by the consensus engine for PrepareProposal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub height: u64,
    pub proposer_address: Bytes,
    /// Mempool candidates in reap order
    pub txs: Vec<RawTx>,
    pub max_tx_bytes: u64,
}

/// Proposal builder
pub struct Scheduler<S> {
    store: BatchStore<S>,
}

impl<S: KvStore> Scheduler<S> {
    pub fn new(store: BatchStore<S>) -> Self {
        Self { store }
    }

    /// Build the transaction list for the block at `req.height`
    ///
    /// Packing ends at the first committed transaction that does not fit in
    /// `max_tx_bytes`; the commitment slot itself is never cut, so the whole
    /// list may exceed `max_tx_bytes` by at most the slot's own size.
    ///
    /// The new commitment is written at `req.height + 1` before returning,
    /// except at height 0: height 1 is a bootstrap height whose batch is
    /// always empty, so nothing committed at height 0 is ever executed.
    ///
    /// # Errors
    /// * `InvalidRequest` if the request carries no proposer address
    /// * `BatchNotFound` if nothing was committed for `req.height` (height > 1)
    /// * `Codec` / `Store` if the new commitment cannot be encoded or written
    pub async fn prepare_proposal(&self, req: ProposalRequest) -> Result<Vec<RawTx>> {
        if req.proposer_address.is_empty() {
            error!("PrepareProposal received a request without a proposer address");
            return Err(LastLookError::InvalidRequest(
                "missing proposer address".to_string(),
            ));
        }

        let current = self.store.get(req.height).await.inspect_err(|e| {
            error!("Failed to load committed batch for height {}: {}", req.height, e);
        })?;

        let candidates = req.txs.len();
        let fresh = filter_committed(req.txs, &current.transactions);
        if fresh.len() != candidates {
            debug!(
                "Dropped {} mempool candidates already committed for height {}",
                candidates - fresh.len(),
                req.height
            );
        }

        let next = Batch::new(req.proposer_address, fresh);
        let next_bz = Bytes::from(codec::marshal(&next)?);

        let txs = inject_and_resize(&current.transactions, &next_bz, req.max_tx_bytes);

        // Slot 0 plus whatever prefix of the committed batch fit.
        let echoed = txs.len() - 1;
        if echoed < current.transactions.len() {
            warn!(
                "Byte budget of {} fits only {} of {} committed txs for height {}",
                req.max_tx_bytes,
                echoed,
                current.transactions.len(),
                req.height
            );
        }

        // Height 1 always executes the empty bootstrap batch, so a commitment
        // made at height 0 is never executed and is not stored.
        if req.height == 0 {
            warn!(
                "Commitment of {} txs made at height 0 will never be executed",
                next.transactions.len()
            );
        } else {
            self.store.put(req.height + 1, &next).await?;
        }

        info!(
            "Prepared proposal for height {}: {} committed txs echoed, {} txs committed for height {}, {} bytes",
            req.height,
            echoed,
            next.transactions.len(),
            req.height + 1,
            total_bytes(&txs)
        );

        Ok(txs)
    }
}
