//! Batch compilation: N operations into one aggregate invocation.
//!
//! The receiving contract takes five parallel arrays (proofs,
//! decoders, targets, op ids, calldatas) and executes position k of
//! each as one verified call. Operations execute in caller-supplied
//! order; no reordering, deduplication, or dependency analysis happens
//! here. Sequencing prerequisites (an approval before the action that
//! spends it) is the caller's job.

use crate::encode::Calldata;
use vaultkit_core::{Error, Invocation, Operation, RegistryMetadata, Result};
use vaultkit_merkle::op_id;

/// Canonical name of the manager's verified-execution entry point.
pub const MANAGE_ENTRY_POINT: &str = "manage_vault_with_merkle_verification";

/// Merge an ordered list of operations into one aggregate invocation.
///
/// Every top-level array and every inner variable-length span (proof
/// length, calldata length) carries its own explicit count prefix.
pub fn compile_batch(metadata: &RegistryMetadata, ops: &[Operation]) -> Result<Invocation> {
    if ops.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let mut cd = Calldata::new();

    cd.count(ops.len());
    for op in ops {
        cd.count(op.proof.len()).extend(&op.proof);
    }

    cd.count(ops.len());
    for op in ops {
        cd.felt(op.decoder_and_sanitizer);
    }

    cd.count(ops.len());
    for op in ops {
        cd.felt(op.target);
    }

    cd.count(ops.len());
    for op in ops {
        cd.felt(op.op_id);
    }

    cd.count(ops.len());
    for op in ops {
        cd.count(op.calldata.len()).extend(&op.calldata);
    }

    Ok(Invocation {
        contract: metadata.manager,
        entry_point: op_id(MANAGE_ENTRY_POINT),
        calldata: cd.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vaultkit_core::Felt;

    fn a(v: u64) -> Felt {
        Felt::from_u64(v)
    }

    fn metadata() -> RegistryMetadata {
        RegistryMetadata {
            manager: a(0x111),
            vault_allocator: a(2),
            vault: a(3),
            underlying_asset: a(4),
            committed_root: a(5),
            capacity: 4,
            used: 4,
        }
    }

    fn op(tag: u64, proof_len: u64, calldata_len: u64) -> Operation {
        Operation::new(
            (0..proof_len).map(|i| a(tag * 100 + i)).collect(),
            a(tag * 100 + 50),
            a(tag * 100 + 51),
            a(tag * 100 + 52),
            (0..calldata_len).map(|i| a(tag * 100 + 60 + i)).collect(),
        )
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            compile_batch(&metadata(), &[]),
            Err(Error::EmptyBatch)
        ));
    }

    #[test]
    fn single_operation_layout() {
        let o = op(1, 2, 3);
        let inv = compile_batch(&metadata(), std::slice::from_ref(&o)).unwrap();
        assert_eq!(inv.contract, a(0x111));
        assert_eq!(inv.entry_point, op_id(MANAGE_ENTRY_POINT));
        let mut expected = vec![a(1), a(2)];
        expected.extend(&o.proof);
        expected.extend([a(1), o.decoder_and_sanitizer]);
        expected.extend([a(1), o.target]);
        expected.extend([a(1), o.op_id]);
        expected.extend([a(1), a(3)]);
        expected.extend(&o.calldata);
        assert_eq!(inv.calldata, expected);
    }

    #[test]
    fn positions_stay_aligned_across_all_five_arrays() {
        let ops = vec![op(1, 2, 1), op(2, 3, 0), op(3, 1, 4)];
        let inv = compile_batch(&metadata(), &ops).unwrap();
        let cd = &inv.calldata;

        // Walk the payload and re-extract each array, checking position
        // k of every array against source operation k.
        let mut i = 0usize;
        let n = 3usize;
        assert_eq!(cd[i], a(n as u64));
        i += 1;
        for o in &ops {
            assert_eq!(cd[i], a(o.proof.len() as u64));
            i += 1;
            assert_eq!(&cd[i..i + o.proof.len()], &o.proof[..]);
            i += o.proof.len();
        }
        let fields: [fn(&Operation) -> Felt; 3] = [
            |o| o.decoder_and_sanitizer,
            |o| o.target,
            |o| o.op_id,
        ];
        for field in fields {
            assert_eq!(cd[i], a(n as u64));
            i += 1;
            for o in &ops {
                assert_eq!(cd[i], field(o));
                i += 1;
            }
        }
        assert_eq!(cd[i], a(n as u64));
        i += 1;
        for o in &ops {
            assert_eq!(cd[i], a(o.calldata.len() as u64));
            i += 1;
            assert_eq!(&cd[i..i + o.calldata.len()], &o.calldata[..]);
            i += o.calldata.len();
        }
        assert_eq!(i, cd.len());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

        // Position k of every array belongs to source operation k, for
        // every batch size >= 1 and arbitrary proof/calldata lengths.
        #[test]
        fn prop_arrays_stay_parallel(sizes in proptest::collection::vec((0u64..4, 0u64..6), 1..8)) {
            let ops: Vec<Operation> = sizes
                .iter()
                .enumerate()
                .map(|(k, &(p, c))| op(k as u64 + 1, p, c))
                .collect();
            let inv = compile_batch(&metadata(), &ops).unwrap();
            let cd = &inv.calldata;

            let n = ops.len();
            let mut i = 0usize;
            prop_assert_eq!(cd[i], a(n as u64));
            i += 1;
            for o in &ops {
                prop_assert_eq!(cd[i], a(o.proof.len() as u64));
                i += 1 + o.proof.len();
            }
            for _ in 0..3 {
                prop_assert_eq!(cd[i], a(n as u64));
                i += 1 + n;
            }
            prop_assert_eq!(cd[i], a(n as u64));
            i += 1;
            for o in &ops {
                prop_assert_eq!(cd[i], a(o.calldata.len() as u64));
                i += 1 + o.calldata.len();
            }
            prop_assert_eq!(i, cd.len());
        }
    }

    #[test]
    fn caller_order_is_reproduced_verbatim() {
        let forward = vec![op(1, 1, 1), op(2, 1, 1)];
        let reversed: Vec<Operation> = forward.iter().rev().cloned().collect();
        let a_inv = compile_batch(&metadata(), &forward).unwrap();
        let b_inv = compile_batch(&metadata(), &reversed).unwrap();
        assert_ne!(a_inv.calldata, b_inv.calldata);
    }
}
