//! Batch Codec Module
//!
//! Every validator must produce byte-identical encodings of the same batch,
//! otherwise the commitment slot of one proposer's block cannot be compared
//! against anyone else's. The JSON form has a fixed field order and renders
//! all byte fields as lowercase hex, which keeps it deterministic.

use crate::{Batch, Result};

/// Encode a batch for the commitment slot or the store
pub fn marshal(batch: &Batch) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(batch)?)
}

/// Decode a batch previously produced by [`marshal`]
pub fn unmarshal(bytes: &[u8]) -> Result<Batch> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Bytes;

    #[test]
    fn encoding_is_stable_for_equal_batches() {
        let a = Batch::new(
            Bytes::from(b"ProposerAddress".to_vec()),
            vec![Bytes::from(vec![1u8, 2]), Bytes::from(vec![3u8])],
        );
        let b = a.clone();

        assert_eq!(marshal(&a).unwrap(), marshal(&b).unwrap());
    }

    #[test]
    fn transaction_order_survives_decoding() {
        let batch = Batch::new(
            Bytes::from(b"p".to_vec()),
            vec![Bytes::from(vec![9u8]), Bytes::from(vec![1u8]), Bytes::from(vec![5u8])],
        );

        let decoded = unmarshal(&marshal(&batch).unwrap()).unwrap();
        assert_eq!(decoded.transactions, batch.transactions);
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let err = unmarshal(b"\x00\x01not a batch").unwrap_err();
        assert!(matches!(err, crate::LastLookError::Codec(_)));
    }
}
