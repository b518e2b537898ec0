//! Resolved operations and the aggregate invocation payload.
//!
//! These types define the serialized boundary between the compiler and
//! the external chain client. [`Operation`] is intentionally minimal: it
//! carries exactly what the on-chain verifier recombines: the inclusion
//! proof plus the `(decoder, target, op id, calldata)` tuple the leaf
//! commitment binds.
//!
//! Operations are created fresh per request and never persisted or
//! reused across requests.

use crate::felt::Felt;
use serde::{Deserialize, Serialize};

/// Ordered sibling commitments from the leaf layer up to (not including)
/// the root. The pair hash is commutative, so no left/right flags.
pub type Proof = Vec<Felt>;

/// One resolved, encoded, proof-attached action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Inclusion proof for the leaf this operation was resolved to.
    pub proof: Proof,
    /// Decoder/sanitizer contract from the leaf.
    pub decoder_and_sanitizer: Felt,
    /// Target contract from the leaf.
    pub target: Felt,
    /// Operation identifier from the leaf.
    pub op_id: Felt,
    /// Variable parameters in the exact slot order the decoder expects.
    pub calldata: Vec<Felt>,
}

impl Operation {
    /// Wrap the components into the canonical record.
    ///
    /// Structural completeness only; resolution and encoding have
    /// already validated everything that can be validated off-chain.
    #[inline]
    #[must_use]
    pub fn new(
        proof: Proof,
        decoder_and_sanitizer: Felt,
        target: Felt,
        op_id: Felt,
        calldata: Vec<Felt>,
    ) -> Self {
        Self {
            proof,
            decoder_and_sanitizer,
            target,
            op_id,
            calldata,
        }
    }
}

/// The aggregate payload handed to the external chain client.
///
/// The client owns signing, nonce management, broadcast, and receipt
/// polling; this type is only the wire-exact call description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Contract to call (the manager).
    pub contract: Felt,
    /// Entry-point identifier on that contract.
    pub entry_point: Felt,
    /// Positionally aligned, length-prefixed argument slots.
    pub calldata: Vec<Felt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_serde_roundtrip() {
        let op = Operation::new(
            vec![Felt::from_u64(1), Felt::from_u64(2)],
            Felt::from_u64(3),
            Felt::from_u64(4),
            Felt::from_u64(5),
            vec![Felt::from_u64(6)],
        );
        let ser = serde_json::to_vec(&op).unwrap();
        let back: Operation = serde_json::from_slice(&ser).unwrap();
        assert_eq!(back, op);
    }
}
