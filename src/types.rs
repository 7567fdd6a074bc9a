use ethers::types::{Bytes, H256};
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};

/// Raw transaction bytes as reaped from the mempool or carried in a block
pub type RawTx = Bytes;

/// Number of transactions the scheduler injects in front of a proposal
pub const NUM_INJECTED_TXS: usize = 1;

/// Index of the commitment slot inside a proposal
pub const BATCH_TX_INDEX: usize = 0;

/// Ordered transaction commitment for one block height
///
/// The order of `transactions` is exactly the order the proposer chose.
/// An empty `proposer` means no proposer, which is only the case for the
/// bootstrap heights and for batches queued after a degraded finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub proposer: Bytes,
    pub transactions: Vec<RawTx>,
}

impl Batch {
    pub fn new(proposer: Bytes, transactions: Vec<RawTx>) -> Self {
        Self {
            proposer,
            transactions,
        }
    }

    /// The implicit batch for heights that have no prior round
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Hash a raw transaction for logging and diagnostics
pub fn tx_hash(tx: &[u8]) -> H256 {
    H256::from(keccak256(tx))
}

/// Errors surfaced by the store, codec and consensus callbacks
#[derive(Debug, thiserror::Error)]
pub enum LastLookError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no txs batch found for a block {height}")]
    BatchNotFound { height: u64 },
    #[error("batch codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("batch store failure: {0}")]
    Store(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, LastLookError>;

/// Why a proposal was rejected
///
/// Rejections are expected when a proposer is faulty or adversarial, so they
/// are carried as data instead of as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RejectReason {
    #[error("proposal carries no commitment slot")]
    MissingBatch,
    #[error("proposal carries no proposer address")]
    MissingProposer,
    #[error("failed to unmarshal txs batch: {message}")]
    MalformedBatch { message: String },
    #[error("proposal txs count != committed txs count: {got} != {expected}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("proposal tx {index} differs from committed tx: {got:?} != {expected:?}")]
    TxMismatch {
        index: usize,
        expected: H256,
        got: H256,
    },
    #[error("proposer address != proposer in injected batch: {declared} != {injected}")]
    ProposerMismatch { declared: Bytes, injected: Bytes },
}

/// Outcome of verifying a proposal
#[derive(Debug)]
pub enum Verdict {
    Accepted,
    Rejected { reason: RejectReason },
    Fatal { cause: LastLookError },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// What finalization hands to the execution layer for one height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedBatch {
    pub height: u64,
    /// Batch committed one round earlier, due for execution at `height`
    pub execute: Batch,
    /// Batch announced by the finalized block for `height + 1`
    pub queued: Batch,
}
