//! Vault-share operation layouts.
//!
//! The synchronous quartet (deposit/mint/withdraw/redeem), the async
//! redeem pair, token approvals, and the allocator's bring-liquidity
//! entry. All amounts are 256-bit magnitudes in the token's native
//! units.

use super::Calldata;
use vaultkit_core::{Felt, Uint256};

/// approve: spender, amount (3 slots).
#[must_use]
pub fn approve(spender: Felt, amount: Uint256) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(spender).uint256(amount);
    cd.finish()
}

/// bring_liquidity: amount (2 slots).
#[must_use]
pub fn bring_liquidity(amount: Uint256) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(amount);
    cd.finish()
}

/// deposit: assets, receiver (3 slots).
#[must_use]
pub fn deposit(assets: Uint256, receiver: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(assets).felt(receiver);
    cd.finish()
}

/// mint: shares, receiver (3 slots).
#[must_use]
pub fn mint(shares: Uint256, receiver: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(shares).felt(receiver);
    cd.finish()
}

/// withdraw: assets, receiver, owner (4 slots).
#[must_use]
pub fn withdraw(assets: Uint256, receiver: Felt, owner: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(assets).felt(receiver).felt(owner);
    cd.finish()
}

/// redeem: shares, receiver, owner (4 slots).
#[must_use]
pub fn redeem(shares: Uint256, receiver: Felt, owner: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(shares).felt(receiver).felt(owner);
    cd.finish()
}

/// request_redeem: shares, receiver, owner (4 slots).
#[must_use]
pub fn request_redeem(shares: Uint256, receiver: Felt, owner: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(shares).felt(receiver).felt(owner);
    cd.finish()
}

/// claim_redeem: request id (2 slots).
#[must_use]
pub fn claim_redeem(id: Uint256) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(id);
    cd.finish()
}
