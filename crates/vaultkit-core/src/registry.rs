//! Registry documents: the committed action set a vault manager accepts.
//!
//! A [`Registry`] is produced once by an external tree-construction
//! pipeline, committed on-chain, and consumed read-only here. Nothing in
//! this workspace mutates one after load.

use crate::felt::Felt;
use crate::tree::TreeLayers;
use serde::{Deserialize, Serialize};

/// Contract addresses and tree bookkeeping committed alongside the leaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMetadata {
    /// The access-control manager contract receiving invocations.
    pub manager: Felt,
    /// Allocator account used as refund address by bridge sends.
    pub vault_allocator: Felt,
    /// The managed vault contract.
    pub vault: Felt,
    /// The vault's underlying asset token.
    pub underlying_asset: Felt,
    /// Root committed on-chain; every proof must recombine to this.
    pub committed_root: Felt,
    /// Total leaf slots the committed tree was built with.
    pub capacity: u32,
    /// Leaf slots actually populated.
    pub used: u32,
}

/// One pre-authorized action committed into the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSpec {
    /// Decoder/sanitizer contract the verifier routes calldata through.
    pub decoder_and_sanitizer: Felt,
    /// Target contract the action ultimately calls.
    pub target: Felt,
    /// Operation identifier (hash of the action's canonical name).
    pub op_id: Felt,
    /// Parameters fixed at commitment time, in committed slot order.
    ///
    /// Disambiguates leaves sharing the same `(op_id, target)`; 256-bit
    /// values appear pre-split into (low, high) limb slots.
    pub fixed_arguments: Vec<Felt>,
    /// Human-readable description from the commitment pipeline.
    pub description: String,
    /// Position of this leaf at layer 0.
    pub index: u32,
    /// Precomputed leaf commitment (identity at layer 0).
    pub commitment: Felt,
}

/// The full committed action set: metadata, leaves, and hash layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Contract metadata and tree bookkeeping.
    pub metadata: RegistryMetadata,
    /// Ordered leaf specifications.
    pub leaves: Vec<LeafSpec>,
    /// Validated hash layers (leaf layer first).
    pub tree: TreeLayers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_json_roundtrip() {
        let reg = Registry {
            metadata: RegistryMetadata {
                manager: Felt::from_u64(1),
                vault_allocator: Felt::from_u64(2),
                vault: Felt::from_u64(3),
                underlying_asset: Felt::from_u64(4),
                committed_root: Felt::from_u64(99),
                capacity: 2,
                used: 1,
            },
            leaves: vec![LeafSpec {
                decoder_and_sanitizer: Felt::from_u64(10),
                target: Felt::from_u64(11),
                op_id: Felt::from_u64(12),
                fixed_arguments: vec![Felt::from_u64(13)],
                description: "approve underlying for vault".to_owned(),
                index: 0,
                commitment: Felt::from_u64(7),
            }],
            tree: TreeLayers::new(vec![vec![Felt::from_u64(7), Felt::from_u64(8)], vec![Felt::from_u64(99)]])
                .unwrap(),
        };

        let ser = serde_json::to_string_pretty(&reg).unwrap();
        let back: Registry = serde_json::from_str(&ser).unwrap();
        assert_eq!(back, reg);
    }
}
