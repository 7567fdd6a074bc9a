//! Tests for proposal scheduling
//!
//! Covers the packing helpers and the full PrepareProposal flow against an
//! in-memory store.

#[cfg(test)]
mod tests {
    use crate::{
        Batch, LastLookError, RawTx, codec,
        scheduler::{ProposalRequest, Scheduler, filter_committed, inject_and_resize, total_bytes},
        store::{BatchStore, MemoryStore, testing::ReadOnlyStore},
        validation::{ProcessRequest, Validator},
    };
    use ethers::types::Bytes;

    const PROPOSER: &[u8] = b"ProposerAddress";

    /// Helper producing `n` distinct transactions of `size` bytes
    ///
    /// `seed` separates sets from one another so that queued transactions and
    /// mempool candidates never collide by accident.
    fn txs_with_size(n: usize, size: usize, seed: u8) -> Vec<RawTx> {
        (0..n)
            .map(|i| {
                let mut buf = vec![seed; size];
                buf[size - 1] = seed.wrapping_mul(16).wrapping_add(i as u8);
                if size > 1 {
                    buf[size - 2] = (i >> 8) as u8 ^ seed;
                }
                Bytes::from(buf)
            })
            .collect()
    }

    fn request(height: u64, txs: Vec<RawTx>, max_tx_bytes: u64) -> ProposalRequest {
        ProposalRequest {
            height,
            proposer_address: Bytes::from(PROPOSER.to_vec()),
            txs,
            max_tx_bytes,
        }
    }

    fn scheduler() -> (Scheduler<MemoryStore>, BatchStore<MemoryStore>) {
        let store = BatchStore::new(MemoryStore::new());
        (Scheduler::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_empty_queue_commits_all_candidates() {
        let (scheduler, store) = scheduler();
        let candidates = txs_with_size(10, 1, 0);

        let txs = scheduler
            .prepare_proposal(request(0, candidates.clone(), 100))
            .await
            .unwrap();

        // Nothing was committed for height 0, so only the commitment slot remains.
        assert_eq!(txs.len(), 1);
        let injected = codec::unmarshal(&txs[0]).unwrap();
        assert_eq!(injected.proposer, Bytes::from(PROPOSER.to_vec()));
        assert_eq!(injected.transactions, candidates);

        // Height 1 always executes the empty bootstrap batch.
        assert!(store.inner().is_empty().await);
        assert_eq!(store.get(1).await.unwrap(), Batch::empty());
    }

    #[tokio::test]
    async fn test_queued_batch_follows_commitment_slot() {
        let (scheduler, store) = scheduler();
        let queued = txs_with_size(5, 2, 1);
        store
            .put(2, &Batch::new(Bytes::from(PROPOSER.to_vec()), queued.clone()))
            .await
            .unwrap();
        let candidates = txs_with_size(10, 1, 2);

        let txs = scheduler
            .prepare_proposal(request(2, candidates.clone(), 10_000))
            .await
            .unwrap();

        let expected_slot = codec::marshal(&Batch::new(
            Bytes::from(PROPOSER.to_vec()),
            candidates.clone(),
        ))
        .unwrap();
        assert_eq!(txs.len(), 1 + queued.len());
        assert_eq!(txs[0].to_vec(), expected_slot);
        assert_eq!(&txs[1..], &queued[..]);

        // 10 committed for later plus 5 executed now.
        let injected = codec::unmarshal(&txs[0]).unwrap();
        assert_eq!(injected.transactions.len() + txs.len() - 1, 15);
        assert_eq!(store.get(3).await.unwrap().transactions, candidates);
    }

    #[tokio::test]
    async fn test_budget_truncates_queued_tail() {
        let (scheduler, store) = scheduler();
        let queued = txs_with_size(100, 1, 3);
        store
            .put(2, &Batch::new(Bytes::from(PROPOSER.to_vec()), queued.clone()))
            .await
            .unwrap();
        let candidates = txs_with_size(100, 2, 4);

        let txs = scheduler
            .prepare_proposal(request(2, candidates.clone(), 11))
            .await
            .unwrap();

        assert_eq!(txs.len(), 1 + 11);
        assert_eq!(&txs[1..], &queued[..11]);
        // Candidates are committed in full regardless of the budget.
        assert_eq!(codec::unmarshal(&txs[0]).unwrap().transactions, candidates);
    }

    #[tokio::test]
    async fn test_budget_bound_holds_for_every_budget() {
        let queued = txs_with_size(20, 3, 5);
        let candidates = txs_with_size(4, 2, 6);

        for max_tx_bytes in 0..70u64 {
            let (scheduler, store) = scheduler();
            store
                .put(7, &Batch::new(Bytes::from(PROPOSER.to_vec()), queued.clone()))
                .await
                .unwrap();

            let txs = scheduler
                .prepare_proposal(request(7, candidates.clone(), max_tx_bytes))
                .await
                .unwrap();

            assert!(total_bytes(&txs[1..]) <= max_tx_bytes);
            assert!(total_bytes(&txs) <= max_tx_bytes + txs[0].len() as u64);
            assert_eq!(&txs[1..], &queued[..txs.len() - 1]);
        }
    }

    #[tokio::test]
    async fn test_prepare_is_deterministic() {
        let queued = txs_with_size(6, 4, 7);
        let candidates = txs_with_size(8, 3, 8);

        let mut outputs = Vec::new();
        for _ in 0..2 {
            let (scheduler, store) = scheduler();
            store
                .put(9, &Batch::new(Bytes::from(b"other".to_vec()), queued.clone()))
                .await
                .unwrap();
            outputs.push(
                scheduler
                    .prepare_proposal(request(9, candidates.clone(), 13))
                    .await
                    .unwrap(),
            );
        }

        assert_eq!(outputs[0], outputs[1]);
    }

    #[tokio::test]
    async fn test_already_committed_candidates_are_not_recommitted() {
        let (scheduler, store) = scheduler();
        let queued = txs_with_size(5, 2, 9);
        store
            .put(4, &Batch::new(Bytes::from(PROPOSER.to_vec()), queued.clone()))
            .await
            .unwrap();
        let fresh = txs_with_size(3, 2, 10);
        let mut candidates = vec![queued[1].clone(), fresh[0].clone()];
        candidates.extend(fresh[1..].iter().cloned());
        candidates.push(queued[4].clone());

        let txs = scheduler
            .prepare_proposal(request(4, candidates, 10_000))
            .await
            .unwrap();

        let injected = codec::unmarshal(&txs[0]).unwrap();
        assert_eq!(injected.transactions, fresh);
        for tx in &queued {
            assert!(!injected.transactions.contains(tx));
        }
    }

    #[tokio::test]
    async fn test_missing_commitment_is_fatal() {
        let (scheduler, store) = scheduler();

        let err = scheduler
            .prepare_proposal(request(3, txs_with_size(2, 1, 11), 100))
            .await
            .unwrap_err();

        assert!(matches!(err, LastLookError::BatchNotFound { height: 3 }));
        // Nothing is committed for the next height when preparation fails.
        assert!(store.inner().is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_proposer_is_invalid_request() {
        let (scheduler, _) = scheduler();
        let mut req = request(1, Vec::new(), 100);
        req.proposer_address = Bytes::default();

        let err = scheduler.prepare_proposal(req).await.unwrap_err();
        assert!(matches!(err, LastLookError::InvalidRequest(_)));
    }

    #[test]
    fn test_filter_keeps_candidate_order() {
        let committed = txs_with_size(3, 1, 12);
        let others = txs_with_size(3, 1, 13);
        let candidates = vec![
            others[2].clone(),
            committed[0].clone(),
            others[0].clone(),
            others[1].clone(),
        ];

        let filtered = filter_committed(candidates, &committed);
        assert_eq!(filtered, vec![others[2].clone(), others[0].clone(), others[1].clone()]);
    }

    #[tokio::test]
    async fn test_committed_tx_equal_to_a_commitment_is_still_echoed() {
        let (scheduler, store) = scheduler();
        // A user transaction whose bytes happen to decode as a commitment.
        let crafted = Bytes::from(
            codec::marshal(&Batch::new(Bytes::from(PROPOSER.to_vec()), Vec::new())).unwrap(),
        );
        let committed = vec![crafted.clone(), Bytes::from(vec![0x07])];
        store
            .put(2, &Batch::new(Bytes::from(PROPOSER.to_vec()), committed.clone()))
            .await
            .unwrap();

        let txs = scheduler
            .prepare_proposal(request(2, vec![crafted], 10_000))
            .await
            .unwrap();

        assert_eq!(txs.len(), 1 + committed.len());
        assert_eq!(&txs[1..], &committed[..]);
        let injected = codec::unmarshal(&txs[0]).unwrap();
        assert!(injected.transactions.is_empty());

        let verdict = Validator::new(store)
            .process_proposal(&ProcessRequest {
                height: 2,
                proposer_address: Bytes::from(PROPOSER.to_vec()),
                txs,
            })
            .await;
        assert!(verdict.is_accepted(), "{:?}", verdict);
    }

    #[tokio::test]
    async fn test_store_write_failure_is_returned() {
        let inner = MemoryStore::new();
        BatchStore::new(inner.clone())
            .put(2, &Batch::new(Bytes::from(PROPOSER.to_vec()), txs_with_size(2, 1, 14)))
            .await
            .unwrap();
        let scheduler = Scheduler::new(BatchStore::new(ReadOnlyStore::new(inner)));

        let err = scheduler
            .prepare_proposal(request(2, txs_with_size(3, 1, 15), 100))
            .await
            .unwrap_err();

        assert!(matches!(err, LastLookError::Store(_)));
    }

    #[test]
    fn test_packing_stops_at_first_overflow() {
        let inject = Bytes::from(vec![0xAA; 4]);
        let app_txs = vec![
            Bytes::from(vec![1u8]),
            Bytes::from(vec![2u8; 5]),
            Bytes::from(vec![3u8]),
        ];

        // 1 byte fits, the 5-byte tx does not, and the trailing 1-byte tx is
        // not considered.
        let packed = inject_and_resize(&app_txs, &inject, 3);
        assert_eq!(packed, vec![inject.clone(), app_txs[0].clone()]);
    }

    #[test]
    fn test_slot_zero_is_always_the_injected_tx() {
        let inject = Bytes::from(vec![0xAA; 4]);
        let app_txs = vec![inject.clone(), Bytes::from(vec![1u8])];

        let packed = inject_and_resize(&app_txs, &inject, 100);
        assert_eq!(packed, vec![inject.clone(), inject.clone(), Bytes::from(vec![1u8])]);
    }

    #[test]
    fn test_injected_tx_does_not_count_against_budget() {
        let inject = Bytes::from(vec![0xAA; 10]);
        let app_txs = vec![Bytes::from(vec![1u8])];

        assert_eq!(inject_and_resize(&app_txs, &inject, 5), vec![inject, app_txs[0].clone()]);
        assert_eq!(inject_and_resize(&[], &Bytes::default(), 0), vec![Bytes::default()]);
    }
}
