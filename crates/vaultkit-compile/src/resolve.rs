//! Leaf resolution: mapping a semantic action request to the single
//! pre-authorized leaf it corresponds to.
//!
//! Each action family declares its predicate as one variant of the
//! closed [`LeafMatcher`] set, so the comparison logic is typed and
//! statically laid out instead of assembled ad hoc at call sites.
//!
//! Resolution requires exactly one satisfying leaf. Zero matches is
//! [`Error::ActionNotAuthorized`]; two or more is
//! [`Error::AmbiguousAuthorization`]; near-duplicate registry entries
//! must never be silently disambiguated by list order.

use std::fmt;
use vaultkit_core::{Error, Felt, LeafSpec, Registry, Result};

/// The closed set of per-family match predicates.
///
/// Every variant anchors on committed leaf identity; the fixed-argument
/// checks below the anchor are positional or set-membership exactly as
/// the committing pipeline laid the slots out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafMatcher {
    /// Case-insensitive substring of the leaf description.
    ///
    /// Used only by the allocator's bring-liquidity entry, whose leaf
    /// carries no operation anchor of its own.
    Description {
        /// Substring to look for.
        needle: String,
    },

    /// `(op_id, target)` equality, nothing else.
    OpTarget {
        /// Operation identifier.
        op_id: Felt,
        /// Target contract.
        target: Felt,
    },

    /// `(op_id, target)` plus a spender among the fixed arguments.
    Approval {
        /// Operation identifier.
        op_id: Felt,
        /// Token contract.
        target: Felt,
        /// Spender that must appear in `fixed_arguments`.
        spender: Felt,
    },

    /// `op_id` anchor plus set membership: every listed address must
    /// appear somewhere in the fixed arguments.
    AddressSet {
        /// Operation identifier.
        op_id: Felt,
        /// Addresses that must all be members.
        members: Vec<Felt>,
    },

    /// `op_id` anchor (optionally with target) plus positional equality
    /// of the leading fixed-argument slots. 256-bit values appear here
    /// pre-split into (low, high) limbs, matching the committed layout.
    SlotPrefix {
        /// Operation identifier.
        op_id: Felt,
        /// Target contract, when the family pins one.
        target: Option<Felt>,
        /// Leading slots that must match positionally.
        slots: Vec<Felt>,
    },

    /// `(op_id, target)` plus full positional equality of the fixed
    /// arguments.
    SlotsExact {
        /// Operation identifier.
        op_id: Felt,
        /// Target contract.
        target: Felt,
        /// The complete expected fixed-argument vector.
        slots: Vec<Felt>,
    },
}

impl LeafMatcher {
    /// Whether `leaf` satisfies this predicate.
    #[must_use]
    pub fn matches(&self, leaf: &LeafSpec) -> bool {
        match self {
            Self::Description { needle } => leaf
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::OpTarget { op_id, target } => leaf.op_id == *op_id && leaf.target == *target,
            Self::Approval {
                op_id,
                target,
                spender,
            } => {
                leaf.op_id == *op_id
                    && leaf.target == *target
                    && leaf.fixed_arguments.contains(spender)
            }
            Self::AddressSet { op_id, members } => {
                leaf.op_id == *op_id
                    && members.iter().all(|m| leaf.fixed_arguments.contains(m))
            }
            Self::SlotPrefix {
                op_id,
                target,
                slots,
            } => {
                leaf.op_id == *op_id
                    && target.map_or(true, |t| leaf.target == t)
                    && leaf.fixed_arguments.len() >= slots.len()
                    && leaf.fixed_arguments[..slots.len()] == slots[..]
            }
            Self::SlotsExact {
                op_id,
                target,
                slots,
            } => {
                leaf.op_id == *op_id
                    && leaf.target == *target
                    && leaf.fixed_arguments == *slots
            }
        }
    }
}

impl fmt::Display for LeafMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Description { needle } => write!(f, "description ~ {needle:?}"),
            Self::OpTarget { op_id, target } => write!(f, "op {op_id} on {target}"),
            Self::Approval {
                op_id,
                target,
                spender,
            } => write!(f, "op {op_id} on {target} for spender {spender}"),
            Self::AddressSet { op_id, members } => {
                write!(f, "op {op_id} with {} committed addresses", members.len())
            }
            Self::SlotPrefix { op_id, target, slots } => match target {
                Some(t) => write!(f, "op {op_id} on {t} with {}-slot prefix", slots.len()),
                None => write!(f, "op {op_id} with {}-slot prefix", slots.len()),
            },
            Self::SlotsExact { op_id, target, slots } => {
                write!(f, "op {op_id} on {target} with {} exact slots", slots.len())
            }
        }
    }
}

/// Resolve a matcher to the unique leaf it authorizes.
pub fn resolve<'a>(registry: &'a Registry, matcher: &LeafMatcher) -> Result<&'a LeafSpec> {
    let mut hits = registry.leaves.iter().filter(|leaf| matcher.matches(leaf));
    let Some(first) = hits.next() else {
        return Err(Error::ActionNotAuthorized {
            detail: matcher.to_string(),
        });
    };
    let extra = hits.count();
    if extra > 0 {
        return Err(Error::AmbiguousAuthorization {
            matches: extra + 1,
            detail: matcher.to_string(),
        });
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultkit_core::{RegistryMetadata, TreeLayers};
    use vaultkit_merkle::{build_layers, leaf_commitment, op_id};

    fn a(v: u64) -> Felt {
        Felt::from_u64(v)
    }

    fn mk_leaf(index: u32, op: &str, target: Felt, fixed: Vec<Felt>, desc: &str) -> LeafSpec {
        let mut leaf = LeafSpec {
            decoder_and_sanitizer: a(0xdec0),
            target,
            op_id: op_id(op),
            fixed_arguments: fixed,
            description: desc.to_owned(),
            index,
            commitment: Felt::ZERO,
        };
        leaf.commitment = leaf_commitment(&leaf);
        leaf
    }

    fn mk_registry(leaves: Vec<LeafSpec>) -> Registry {
        let mut commitments: Vec<Felt> = leaves.iter().map(|l| l.commitment).collect();
        while !commitments.len().is_power_of_two() {
            commitments.push(Felt::ZERO);
        }
        let tree: TreeLayers = build_layers(&commitments).unwrap();
        Registry {
            metadata: RegistryMetadata {
                manager: a(1),
                vault_allocator: a(2),
                vault: a(3),
                underlying_asset: a(4),
                committed_root: tree.root(),
                capacity: commitments.len() as u32,
                used: leaves.len() as u32,
            },
            leaves,
            tree,
        }
    }

    #[test]
    fn approval_resolves_by_spender_membership() {
        let reg = mk_registry(vec![
            mk_leaf(0, "approve", a(100), vec![a(200)], "approve for router"),
            mk_leaf(1, "approve", a(100), vec![a(201)], "approve for vault"),
        ]);
        let leaf = resolve(
            &reg,
            &LeafMatcher::Approval {
                op_id: op_id("approve"),
                target: a(100),
                spender: a(201),
            },
        )
        .unwrap();
        assert_eq!(leaf.index, 1);

        // Unknown spender: nothing was committed for it.
        let err = resolve(
            &reg,
            &LeafMatcher::Approval {
                op_id: op_id("approve"),
                target: a(100),
                spender: a(999),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::ActionNotAuthorized { .. }));
    }

    #[test]
    fn duplicate_leaves_are_ambiguous_not_first_match() {
        let reg = mk_registry(vec![
            mk_leaf(0, "approve", a(100), vec![a(200), a(300)], "approve a"),
            mk_leaf(1, "approve", a(100), vec![a(200), a(301)], "approve b"),
        ]);
        let err = resolve(
            &reg,
            &LeafMatcher::Approval {
                op_id: op_id("approve"),
                target: a(100),
                spender: a(200),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousAuthorization { matches: 2, .. }
        ));
    }

    #[test]
    fn slot_prefix_compares_positionally() {
        let reg = mk_registry(vec![
            mk_leaf(0, "send", a(50), vec![a(1), a(2), a(3), a(4)], "oft A"),
            mk_leaf(1, "send", a(50), vec![a(1), a(2), a(9), a(4)], "oft B"),
        ]);
        let leaf = resolve(
            &reg,
            &LeafMatcher::SlotPrefix {
                op_id: op_id("send"),
                target: Some(a(50)),
                slots: vec![a(1), a(2), a(9)],
            },
        )
        .unwrap();
        assert_eq!(leaf.index, 1);
    }

    #[test]
    fn address_set_ignores_slot_order() {
        let reg = mk_registry(vec![mk_leaf(
            0,
            "initiate_token_withdraw",
            a(60),
            vec![a(7), a(8)],
            "gateway",
        )]);
        let leaf = resolve(
            &reg,
            &LeafMatcher::AddressSet {
                op_id: op_id("initiate_token_withdraw"),
                members: vec![a(8), a(7)],
            },
        )
        .unwrap();
        assert_eq!(leaf.index, 0);
    }

    #[test]
    fn description_match_is_case_insensitive() {
        let reg = mk_registry(vec![mk_leaf(
            0,
            "bring_liquidity",
            a(3),
            vec![],
            "Bring Liquidity into the vault",
        )]);
        let leaf = resolve(
            &reg,
            &LeafMatcher::Description {
                needle: "bring liquidity".to_owned(),
            },
        )
        .unwrap();
        assert_eq!(leaf.index, 0);
    }

    #[test]
    fn slots_exact_requires_full_equality() {
        let reg = mk_registry(vec![mk_leaf(
            0,
            "modify_position",
            a(70),
            vec![a(1), a(2), a(3)],
            "lending pair",
        )]);
        assert!(resolve(
            &reg,
            &LeafMatcher::SlotsExact {
                op_id: op_id("modify_position"),
                target: a(70),
                slots: vec![a(1), a(2), a(3)],
            },
        )
        .is_ok());
        assert!(matches!(
            resolve(
                &reg,
                &LeafMatcher::SlotsExact {
                    op_id: op_id("modify_position"),
                    target: a(70),
                    slots: vec![a(1), a(2)],
                },
            ),
            Err(Error::ActionNotAuthorized { .. })
        ));
    }
}
