// crates/vaultkit-merkle/src/lib.rs

//! Hashing substrate and inclusion proofs over committed action trees.
//!
//! - Canonical leaf commitment: BLAKE3 over a compact encoding of the
//!   leaf fields the on-chain verifier binds (decoder, target, op id,
//!   count-prefixed fixed arguments).
//! - Commutative pair hash: operands are sorted numerically before
//!   combining, so proofs carry no left/right position flags.
//! - Proof derivation walks parity siblings from layer 0 up to the root;
//!   recombination folds the proof back with the same pair hash.
//! - Registry validation recomputes every commitment, every layer, and
//!   the root against the committed metadata.
//!
//! Every digest is clamped to 252 bits so results are always canonical
//! field elements. These conventions must stay bit-for-bit identical to
//! the on-chain verifier's, or every proof it checks is rejected.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use blake3::Hasher;
use vaultkit_core::{Error, Felt, LeafSpec, Proof, Registry, Result, TreeLayers};

/// Domain prefix for leaf commitments.
const LEAF_DOMAIN: &[u8] = b"vaultkit.leaf.v1";
/// Domain prefix for interior pair hashes.
const NODE_DOMAIN: &[u8] = b"vaultkit.node.v1";
/// Domain prefix for operation identifiers.
const OPID_DOMAIN: &[u8] = b"vaultkit.opid.v1";

/// Clamp a digest to 252 bits so it is a canonical field element.
#[inline]
fn clamp(mut bytes: [u8; 32]) -> Felt {
    bytes[0] &= 0x0f;
    Felt::from_be_bytes(bytes)
}

/// Commutative pair hash: sort the operands numerically, then combine.
///
/// `pair_hash(a, b) == pair_hash(b, a)` for all field elements, which is
/// what lets proofs omit position flags.
#[must_use]
pub fn pair_hash(a: Felt, b: Felt) -> Felt {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut h = Hasher::new();
    h.update(NODE_DOMAIN);
    h.update(first.as_bytes());
    h.update(second.as_bytes());
    clamp(*h.finalize().as_bytes())
}

/// Deterministic operation identifier from an action's canonical name.
#[must_use]
pub fn op_id(name: &str) -> Felt {
    let mut h = Hasher::new();
    h.update(OPID_DOMAIN);
    h.update(&(name.len() as u64).to_le_bytes());
    h.update(name.as_bytes());
    clamp(*h.finalize().as_bytes())
}

/// Canonical commitment of a leaf: the hash the verifier recomputes from
/// `(decoder_and_sanitizer, target, op_id, fixed arguments)`.
#[must_use]
pub fn leaf_commitment(leaf: &LeafSpec) -> Felt {
    let mut h = Hasher::new();
    h.update(LEAF_DOMAIN);
    h.update(leaf.decoder_and_sanitizer.as_bytes());
    h.update(leaf.target.as_bytes());
    h.update(leaf.op_id.as_bytes());
    h.update(&(leaf.fixed_arguments.len() as u64).to_le_bytes());
    for arg in &leaf.fixed_arguments {
        h.update(arg.as_bytes());
    }
    clamp(*h.finalize().as_bytes())
}

/// Build validated layers from a power-of-two leaf layer.
///
/// Used by fixtures and registry pipelines that agree with the on-chain
/// builder; the committed trees this crate consumes are padded to a
/// power-of-two capacity, so no odd-tail rule is implemented.
pub fn build_layers(leaves: &[Felt]) -> Result<TreeLayers> {
    if leaves.is_empty() {
        return Err(Error::MalformedTree {
            detail: "cannot build a tree from zero leaves".to_owned(),
        });
    }
    if !leaves.len().is_power_of_two() {
        return Err(Error::MalformedTree {
            detail: format!("leaf count {} is not a power of two", leaves.len()),
        });
    }
    let mut layers = vec![leaves.to_vec()];
    while layers[layers.len() - 1].len() > 1 {
        let prev = &layers[layers.len() - 1];
        let mut next = Vec::with_capacity(prev.len() / 2);
        for pair in prev.chunks_exact(2) {
            next.push(pair_hash(pair[0], pair[1]));
        }
        layers.push(next);
    }
    TreeLayers::new(layers)
}

/// Derive an inclusion proof for `commitment` against a validated tree.
pub fn derive_proof(tree: &TreeLayers, commitment: Felt) -> Result<Proof> {
    derive_proof_layers(tree.as_layers(), commitment)
}

/// Derive an inclusion proof against raw layers.
///
/// [`TreeLayers`] cannot hold an unpaired node, so prefer
/// [`derive_proof`]; this entry point keeps the sibling check for shapes
/// that never went through the validating constructor.
pub fn derive_proof_layers(layers: &[Vec<Felt>], commitment: Felt) -> Result<Proof> {
    let Some(leaf_layer) = layers.first() else {
        return Err(Error::MalformedTree {
            detail: "tree has no layers".to_owned(),
        });
    };
    if !leaf_layer.contains(&commitment) {
        return Err(Error::LeafNotFound { commitment });
    }

    let mut proof = Vec::with_capacity(layers.len().saturating_sub(1));
    let mut current = commitment;
    for (level, layer) in layers.iter().enumerate().take(layers.len() - 1) {
        let index = layer
            .iter()
            .position(|&h| h == current)
            .ok_or_else(|| Error::MalformedTree {
                detail: format!("hash {current} not found at layer {level}"),
            })?;

        // Parity sibling: even -> index + 1, odd -> index - 1.
        let sibling_index = index ^ 1;
        let Some(&sibling) = layer.get(sibling_index) else {
            return Err(Error::SiblingMissing {
                layer: level,
                index,
            });
        };

        proof.push(sibling);
        current = pair_hash(current, sibling);
    }
    Ok(proof)
}

/// Fold a proof back onto a commitment with the commutative pair hash.
///
/// For any proof produced by [`derive_proof`], the result equals the
/// tree's root.
#[must_use]
pub fn recombine(commitment: Felt, proof: &[Felt]) -> Felt {
    proof
        .iter()
        .fold(commitment, |acc, &sibling| pair_hash(acc, sibling))
}

/// Validate a registry document end to end.
///
/// Recomputes every leaf commitment from its fields, checks it against
/// both the recorded `commitment` and the tree's layer 0 at the leaf's
/// index, recomputes every interior layer with the pair hash, and
/// requires the root to equal `metadata.committed_root`.
pub fn validate_registry(reg: &Registry) -> Result<()> {
    let layers = reg.tree.as_layers();
    let leaf_layer = &layers[0];

    if reg.metadata.capacity as usize != leaf_layer.len() {
        return Err(Error::MalformedTree {
            detail: format!(
                "metadata capacity {} does not match layer-0 size {}",
                reg.metadata.capacity,
                leaf_layer.len()
            ),
        });
    }
    if reg.metadata.used as usize != reg.leaves.len() {
        return Err(Error::MalformedTree {
            detail: format!(
                "metadata used {} does not match leaf count {}",
                reg.metadata.used,
                reg.leaves.len()
            ),
        });
    }

    for leaf in &reg.leaves {
        let recomputed = leaf_commitment(leaf);
        if recomputed != leaf.commitment {
            return Err(Error::MalformedTree {
                detail: format!(
                    "leaf {} ({}) commitment mismatch: recorded {}, recomputed {recomputed}",
                    leaf.index, leaf.description, leaf.commitment
                ),
            });
        }
        match leaf_layer.get(leaf.index as usize) {
            Some(&at_index) if at_index == recomputed => {}
            Some(&at_index) => {
                return Err(Error::MalformedTree {
                    detail: format!(
                        "layer 0 index {} holds {at_index}, expected {recomputed}",
                        leaf.index
                    ),
                });
            }
            None => {
                return Err(Error::MalformedTree {
                    detail: format!("leaf index {} is outside layer 0", leaf.index),
                });
            }
        }
    }

    for level in 0..layers.len() - 1 {
        for (i, pair) in layers[level].chunks_exact(2).enumerate() {
            let parent = pair_hash(pair[0], pair[1]);
            if layers[level + 1][i] != parent {
                return Err(Error::MalformedTree {
                    detail: format!(
                        "layer {} index {i} holds {}, expected {parent}",
                        level + 1,
                        layers[level + 1][i]
                    ),
                });
            }
        }
    }

    let root = reg.tree.root();
    if root != reg.metadata.committed_root {
        return Err(Error::MalformedTree {
            detail: format!(
                "tree root {root} does not equal committed root {}",
                reg.metadata.committed_root
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vaultkit_core::RegistryMetadata;

    fn f(v: u64) -> Felt {
        Felt::from_u64(v)
    }

    #[test]
    fn pair_hash_is_commutative() {
        let a = f(123);
        let b = f(456);
        assert_eq!(pair_hash(a, b), pair_hash(b, a));
        assert_ne!(pair_hash(a, b), pair_hash(a, a));
    }

    #[test]
    fn op_id_is_deterministic_and_canonical() {
        let id = op_id("deposit");
        assert_eq!(id, op_id("deposit"));
        assert_ne!(id, op_id("withdraw"));
        // Clamped to 252 bits.
        assert!(id.as_bytes()[0] <= 0x0f);
    }

    #[test]
    fn four_leaf_proof_and_recombination() {
        // layer0 = [h0, h1, h2, h3]; proof for h2 must be
        // [h3, pair_hash(h0, h1)] and recombine to the root.
        let (h0, h1, h2, h3) = (f(10), f(11), f(12), f(13));
        let tree = build_layers(&[h0, h1, h2, h3]).unwrap();

        let proof = derive_proof(&tree, h2).unwrap();
        assert_eq!(proof, vec![h3, pair_hash(h0, h1)]);
        assert_eq!(recombine(h2, &proof), tree.root());

        // Every leaf recombines to the same root.
        for leaf in [h0, h1, h2, h3] {
            let p = derive_proof(&tree, leaf).unwrap();
            assert_eq!(recombine(leaf, &p), tree.root());
        }
    }

    #[test]
    fn absent_leaf_is_not_found() {
        let tree = build_layers(&[f(1), f(2)]).unwrap();
        let err = derive_proof(&tree, f(3)).unwrap_err();
        assert!(matches!(err, Error::LeafNotFound { .. }));
    }

    #[test]
    fn unpaired_node_fails_sibling_missing() {
        // Raw layers that never went through the validating constructor.
        let layers = vec![vec![f(1), f(2), f(3)], vec![pair_hash(f(1), f(2))]];
        let err = derive_proof_layers(&layers, f(3)).unwrap_err();
        assert!(matches!(
            err,
            Error::SiblingMissing { layer: 0, index: 2 }
        ));
    }

    #[test]
    fn odd_leaf_count_is_rejected() {
        let err = build_layers(&[f(1), f(2), f(3)]).unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }));
    }

    fn mk_leaf(index: u32, op: &str, target: Felt, fixed: Vec<Felt>) -> LeafSpec {
        let mut leaf = LeafSpec {
            decoder_and_sanitizer: f(0xdec0),
            target,
            op_id: op_id(op),
            fixed_arguments: fixed,
            description: format!("{op} on {target}"),
            index,
            commitment: Felt::ZERO,
        };
        leaf.commitment = leaf_commitment(&leaf);
        leaf
    }

    #[test]
    fn registry_validation_roundtrip() {
        let leaves = vec![
            mk_leaf(0, "deposit", f(0xaaaa), vec![]),
            mk_leaf(1, "approve", f(0xbbbb), vec![f(0xcccc)]),
        ];
        let tree = build_layers(&[leaves[0].commitment, leaves[1].commitment]).unwrap();
        let mut reg = Registry {
            metadata: RegistryMetadata {
                manager: f(1),
                vault_allocator: f(2),
                vault: f(3),
                underlying_asset: f(4),
                committed_root: tree.root(),
                capacity: 2,
                used: 2,
            },
            leaves,
            tree,
        };
        validate_registry(&reg).unwrap();

        // Tamper with a recorded commitment and validation must fail.
        reg.leaves[0].commitment = f(0xdead);
        let err = validate_registry(&reg).unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn prop_pair_hash_commutes(a in any::<u64>(), b in any::<u64>()) {
            prop_assert_eq!(pair_hash(f(a), f(b)), pair_hash(f(b), f(a)));
        }

        #[test]
        fn prop_every_leaf_recombines_to_root(
            seed in any::<u64>(),
            log2 in 0u32..=5,
        ) {
            let n = 1usize << log2;
            let leaves: Vec<Felt> = (0..n as u64).map(|i| f(seed.wrapping_add(i))).collect();
            let tree = build_layers(&leaves).unwrap();
            for &leaf in &leaves {
                let proof = derive_proof(&tree, leaf).unwrap();
                prop_assert_eq!(proof.len(), log2 as usize);
                prop_assert_eq!(recombine(leaf, &proof), tree.root());
            }
        }
    }
}
