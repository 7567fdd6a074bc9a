use crate::{
    BATCH_TX_INDEX, NUM_INJECTED_TXS, RawTx, RejectReason, Verdict, codec,
    store::{BatchStore, KvStore},
    tx_hash,
};
use ethers::types::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Proposal handed over by the consensus engine for ProcessProposal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub height: u64,
    pub proposer_address: Bytes,
    pub txs: Vec<RawTx>,
}

/// Read-only proposal verifier
pub struct Validator<S> {
    store: BatchStore<S>,
}

impl<S: KvStore> Validator<S> {
    pub fn new(store: BatchStore<S>) -> Self {
        Self { store }
    }

    /// Verify a proposal
    ///
    /// Returns `Accepted` only if the proposal echoes the committed batch
    /// exactly and its injected batch belongs to the declared proposer
    pub async fn process_proposal(&self, req: &ProcessRequest) -> Verdict {
        debug!(
            "Validating proposal for height {} with {} txs",
            req.height,
            req.txs.len()
        );

        // 1. The proposal must name its proposer
        if req.proposer_address.is_empty() {
            warn!("Proposal for height {} has no proposer address", req.height);
            return Verdict::Rejected {
                reason: RejectReason::MissingProposer,
            };
        }

        // 2. Decode the injected commitment
        let Some(slot) = req.txs.get(BATCH_TX_INDEX) else {
            warn!("Proposal for height {} has no commitment slot", req.height);
            return Verdict::Rejected {
                reason: RejectReason::MissingBatch,
            };
        };
        let injected = match codec::unmarshal(slot) {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Failed to unmarshal txs batch at height {}: {}", req.height, e);
                return Verdict::Rejected {
                    reason: RejectReason::MalformedBatch {
                        message: e.to_string(),
                    },
                };
            }
        };

        // 3. Everything after the injected slots is meant for execution now
        let proposed = &req.txs[NUM_INJECTED_TXS..];

        // 4. Load what was committed for this height
        let expected = match self.store.get(req.height).await {
            Ok(batch) => batch,
            Err(cause) => {
                error!("Failed to load committed batch for height {}: {}", req.height, cause);
                return Verdict::Fatal { cause };
            }
        };

        // 5. Echoed transactions must match exactly, in order
        if let Some(reason) = self.check_transactions(proposed, &expected.transactions) {
            warn!("Rejecting proposal for height {}: {}", req.height, reason);
            return Verdict::Rejected { reason };
        }

        // 6. The injected batch must be attributable to the proposer
        if req.proposer_address != injected.proposer {
            let reason = RejectReason::ProposerMismatch {
                declared: req.proposer_address.clone(),
                injected: injected.proposer,
            };
            warn!("Rejecting proposal for height {}: {}", req.height, reason);
            return Verdict::Rejected { reason };
        }

        debug!("Proposal for height {} accepted", req.height);
        Verdict::Accepted
    }

    /// Compare the proposed transactions with the committed ones
    fn check_transactions(&self, proposed: &[RawTx], committed: &[RawTx]) -> Option<RejectReason> {
        if let Some(index) = proposed
            .iter()
            .zip(committed)
            .position(|(got, expected)| got != expected)
        {
            return Some(RejectReason::TxMismatch {
                index,
                expected: tx_hash(&committed[index]),
                got: tx_hash(&proposed[index]),
            });
        }

        if proposed.len() != committed.len() {
            return Some(RejectReason::LengthMismatch {
                expected: committed.len(),
                got: proposed.len(),
            });
        }

        None
    }
}
