//! Concentrated-liquidity adapter layouts.

use super::Calldata;
use vaultkit_core::{Felt, Uint256};

/// deposit_liquidity: amount0, amount1 (4 slots).
#[must_use]
pub fn deposit_liquidity(amount0: Uint256, amount1: Uint256) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(amount0).uint256(amount1);
    cd.finish()
}

/// withdraw_liquidity: ratio (wad), min token0, min token1 (4 slots).
///
/// The minimums are single slots, unlike the ratio.
#[must_use]
pub fn withdraw_liquidity(ratio_wad: Uint256, min_token0: Felt, min_token1: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(ratio_wad).felt(min_token0).felt(min_token1);
    cd.finish()
}

/// collect_fees takes no parameters.
#[must_use]
pub fn collect_fees() -> Vec<Felt> {
    Vec::new()
}

/// harvest: reward contract, amount, count-prefixed reward proof,
/// reward token. The reward proof is the distributor's own inclusion
/// proof, carried verbatim.
#[must_use]
pub fn harvest(
    reward_contract: Felt,
    amount: Felt,
    reward_proof: &[Felt],
    reward_token: Felt,
) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(reward_contract)
        .felt(amount)
        .count(reward_proof.len())
        .extend(reward_proof)
        .felt(reward_token);
    cd.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(v: u64) -> Felt {
        Felt::from_u64(v)
    }

    #[test]
    fn slot_counts() {
        assert_eq!(
            deposit_liquidity(Uint256::from_u64(1), Uint256::from_u64(2)).len(),
            4
        );
        assert_eq!(
            withdraw_liquidity(Uint256::from_u64(1), a(2), a(3)).len(),
            4
        );
        assert!(collect_fees().is_empty());
    }

    #[test]
    fn harvest_proof_is_count_prefixed() {
        let slots = harvest(a(1), a(500), &[a(7), a(8), a(9)], a(2));
        assert_eq!(slots.len(), 7);
        assert_eq!(slots[2], a(3));
        assert_eq!(&slots[3..6], &[a(7), a(8), a(9)]);
        assert_eq!(slots[6], a(2));
    }
}
