//! Proposal Packing Module
//!
//! Pure functions used by the scheduler. Both are deterministic so that any
//! validator can reproduce the proposer's output from the same inputs.

use crate::RawTx;
use std::collections::HashSet;

/// Drop candidates that were already committed for this round
///
/// Propagation delay means a transaction committed one round ago can still be
/// sitting in the local mempool; proposing it again would execute it twice.
/// Candidate order is preserved.
pub fn filter_committed(candidates: Vec<RawTx>, committed: &[RawTx]) -> Vec<RawTx> {
    if committed.is_empty() {
        return candidates;
    }

    let seen: HashSet<&[u8]> = committed.iter().map(|tx| &tx[..]).collect();
    candidates
        .into_iter()
        .filter(|tx| !seen.contains(&tx[..]))
        .collect()
}

/// Place `inject_tx` in front of as much of `app_txs` as fits in `max_app_bytes`
///
/// `inject_tx` always lands at index 0 and does not count against
/// `max_app_bytes`. `app_txs` are added as a prefix: the first one that does
/// not fit ends packing, nothing after it is considered. The content of
/// `app_txs` is never inspected, so a committed transaction that happens to
/// equal `inject_tx` is packed like any other.
pub fn inject_and_resize(app_txs: &[RawTx], inject_tx: &RawTx, max_app_bytes: u64) -> Vec<RawTx> {
    let mut returned = Vec::with_capacity(app_txs.len() + 1);
    returned.push(inject_tx.clone());

    let mut consumed: u64 = 0;
    for tx in app_txs {
        consumed += tx.len() as u64;
        if consumed > max_app_bytes {
            break;
        }
        returned.push(tx.clone());
    }

    returned
}

/// Sum of raw transaction sizes
pub fn total_bytes(txs: &[RawTx]) -> u64 {
    txs.iter().map(|tx| tx.len() as u64).sum()
}
