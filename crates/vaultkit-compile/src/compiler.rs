//! The compiler façade: one method per pre-authorized action.
//!
//! Every method runs the same pipeline: resolve the unique leaf,
//! derive its inclusion proof against the registry tree, encode the
//! variable parameters, and assemble the [`Operation`]. Batch helpers
//! sequence an approval in front of the action that spends it; the
//! ordering inside a batch is otherwise entirely the caller's.

use crate::batch::compile_batch;
use crate::encode::bridge::{self, BurnMintTransfer, MessageBridgeTransfer, OftSend};
use crate::encode::liquidity;
use crate::encode::position::{self, AmountV1, AmountV2};
use crate::encode::swap::{self, MultiRouteSwap};
use crate::encode::vault;
use crate::resolve::{resolve, LeafMatcher};
use anyhow::Context;
use std::path::Path;
use vaultkit_core::{
    io::read_registry_auto, Felt, Invocation, LeafSpec, Operation, Registry, Result, Uint256,
};
use vaultkit_merkle::{derive_proof, op_id, validate_registry};

/// Canonical operation names. The committed trees and this compiler
/// must agree on these strings exactly; an op id is their hash.
pub mod ops {
    /// Token approval.
    pub const APPROVE: &str = "approve";
    /// Vault-share deposit.
    pub const DEPOSIT: &str = "deposit";
    /// Vault-share mint.
    pub const MINT: &str = "mint";
    /// Vault-share withdraw.
    pub const WITHDRAW: &str = "withdraw";
    /// Vault-share redeem.
    pub const REDEEM: &str = "redeem";
    /// Async redeem request.
    pub const REQUEST_REDEEM: &str = "request_redeem";
    /// Async redeem claim.
    pub const CLAIM_REDEEM: &str = "claim_redeem";
    /// Router multi-route swap.
    pub const MULTI_ROUTE_SWAP: &str = "multi_route_swap";
    /// Gateway withdraw (direct and middleware variants).
    pub const INITIATE_TOKEN_WITHDRAW: &str = "initiate_token_withdraw";
    /// Gateway claim of a transfer bridged back.
    pub const CLAIM_TOKEN_BRIDGED_BACK: &str = "claim_token_bridged_back";
    /// Message-bridge transfer.
    pub const BRIDGE_TOKEN: &str = "bridge_token";
    /// Burn-and-mint transfer.
    pub const DEPOSIT_FOR_BURN: &str = "deposit_for_burn";
    /// OFT send (direct and middleware variants).
    pub const SEND: &str = "send";
    /// Lending position delta.
    pub const MODIFY_POSITION: &str = "modify_position";
    /// Liquidity deposit.
    pub const DEPOSIT_LIQUIDITY: &str = "deposit_liquidity";
    /// Liquidity withdrawal.
    pub const WITHDRAW_LIQUIDITY: &str = "withdraw_liquidity";
    /// Liquidity fee collection.
    pub const COLLECT_FEES: &str = "collect_fees";
    /// Reward harvest.
    pub const HARVEST: &str = "harvest";
}

/// An approval to sequence in front of a dependent action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApprovalSpec {
    /// Token contract.
    pub target: Felt,
    /// Spender being approved.
    pub spender: Felt,
    /// Allowance amount.
    pub amount: Uint256,
}

/// Compiles semantic action requests into proof-attached operations
/// against one registry.
#[derive(Clone, Debug)]
pub struct VaultCompiler {
    registry: Registry,
}

impl VaultCompiler {
    /// Wrap an already-validated registry.
    #[must_use]
    pub const fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Load a registry document (JSON/CBOR by extension) and validate
    /// it end to end before accepting any requests against it.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let registry = read_registry_auto(&path)
            .with_context(|| format!("reading registry {}", path.as_ref().display()))?;
        validate_registry(&registry).context("validating registry against its committed root")?;
        Ok(Self::new(registry))
    }

    /// The registry this compiler resolves against.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve, prove, and wrap in one step.
    fn operation(&self, leaf: &LeafSpec, calldata: Vec<Felt>) -> Result<Operation> {
        let proof = derive_proof(&self.registry.tree, leaf.commitment)?;
        Ok(Operation::new(
            proof,
            leaf.decoder_and_sanitizer,
            leaf.target,
            leaf.op_id,
            calldata,
        ))
    }

    fn resolved(&self, matcher: &LeafMatcher, calldata: Vec<Felt>) -> Result<Operation> {
        let leaf = resolve(&self.registry, matcher)?;
        self.operation(leaf, calldata)
    }

    /* ---------------- vault-share operations ---------------- */

    /// Approve `spender` on the token `target`.
    pub fn approve(&self, target: Felt, spender: Felt, amount: Uint256) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::Approval {
                op_id: op_id(ops::APPROVE),
                target,
                spender,
            },
            vault::approve(spender, amount),
        )
    }

    /// Move idle liquidity from the allocator into the vault.
    pub fn bring_liquidity(&self, amount: Uint256) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::Description {
                needle: "bring liquidity".to_owned(),
            },
            vault::bring_liquidity(amount),
        )
    }

    /// Deposit `assets` into the share vault `target`.
    pub fn deposit(&self, target: Felt, assets: Uint256, receiver: Felt) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::DEPOSIT),
                target,
            },
            vault::deposit(assets, receiver),
        )
    }

    /// Mint `shares` from the share vault `target`.
    pub fn mint(&self, target: Felt, shares: Uint256, receiver: Felt) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::MINT),
                target,
            },
            vault::mint(shares, receiver),
        )
    }

    /// Withdraw `assets` from the share vault `target`.
    pub fn withdraw(
        &self,
        target: Felt,
        assets: Uint256,
        receiver: Felt,
        owner: Felt,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::WITHDRAW),
                target,
            },
            vault::withdraw(assets, receiver, owner),
        )
    }

    /// Redeem `shares` at the share vault `target`.
    pub fn redeem(
        &self,
        target: Felt,
        shares: Uint256,
        receiver: Felt,
        owner: Felt,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::REDEEM),
                target,
            },
            vault::redeem(shares, receiver, owner),
        )
    }

    /// Open an async redemption request.
    pub fn request_redeem(
        &self,
        target: Felt,
        shares: Uint256,
        receiver: Felt,
        owner: Felt,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::REQUEST_REDEEM),
                target,
            },
            vault::request_redeem(shares, receiver, owner),
        )
    }

    /// Claim a settled async redemption by request id.
    pub fn claim_redeem(&self, target: Felt, id: Uint256) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::CLAIM_REDEEM),
                target,
            },
            vault::claim_redeem(id),
        )
    }

    /* ---------------- swaps ---------------- */

    /// Swap through the router `target`. The beneficiary is always the
    /// vault; swap proceeds never leave managed custody.
    pub fn multi_route_swap(&self, target: Felt, params: &MultiRouteSwap) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::MULTI_ROUTE_SWAP),
                target,
            },
            swap::multi_route_swap(params, self.registry.metadata.vault),
        )
    }

    /* ---------------- cross-domain bridges ---------------- */

    /// Withdraw through a gateway bridge to the settlement layer.
    pub fn bridge_gateway(
        &self,
        l1_token: Felt,
        l1_recipient: Felt,
        amount: Uint256,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::AddressSet {
                op_id: op_id(ops::INITIATE_TOKEN_WITHDRAW),
                members: vec![l1_token, l1_recipient],
            },
            bridge::gateway_withdraw(l1_token, l1_recipient, amount),
        )
    }

    /// Withdraw through the gateway middleware, claiming `token_to_claim`
    /// on completion.
    pub fn bridge_gateway_middleware(
        &self,
        gateway: Felt,
        l1_token: Felt,
        l1_recipient: Felt,
        amount: Uint256,
        token_to_claim: Felt,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::AddressSet {
                op_id: op_id(ops::INITIATE_TOKEN_WITHDRAW),
                members: vec![gateway, l1_token, l1_recipient, token_to_claim],
            },
            bridge::gateway_middleware_withdraw(gateway, l1_token, l1_recipient, amount, token_to_claim),
        )
    }

    /// Claim a transfer bridged back through the gateway.
    pub fn claim_gateway_bridged_back(&self) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::AddressSet {
                op_id: op_id(ops::CLAIM_TOKEN_BRIDGED_BACK),
                members: vec![],
            },
            bridge::claim_bridged_back(),
        )
    }

    /// Bridge through the message-passing middleware.
    pub fn bridge_message(&self, p: &MessageBridgeTransfer) -> Result<Operation> {
        let [rcpt_low, rcpt_high] = p.recipient.limbs();
        self.resolved(
            &LeafMatcher::SlotPrefix {
                op_id: op_id(ops::BRIDGE_TOKEN),
                target: None,
                slots: vec![
                    p.source_token,
                    p.destination_token,
                    p.destination_domain,
                    rcpt_low,
                    rcpt_high,
                ],
            },
            bridge::message_bridge(p),
        )
    }

    /// Bridge through the burn-and-mint middleware.
    pub fn bridge_burn_mint(&self, p: &BurnMintTransfer) -> Result<Operation> {
        let [mint_low, mint_high] = p.mint_recipient.limbs();
        let [caller_low, caller_high] = p.destination_caller.limbs();
        self.resolved(
            &LeafMatcher::SlotPrefix {
                op_id: op_id(ops::DEPOSIT_FOR_BURN),
                target: None,
                slots: vec![
                    p.destination_domain,
                    mint_low,
                    mint_high,
                    p.burn_token,
                    p.token_to_claim,
                    caller_low,
                    caller_high,
                ],
            },
            bridge::burn_mint(p),
        )
    }

    /// Send directly through an OFT. The refund address is always the
    /// vault allocator.
    pub fn bridge_oft(&self, oft: Felt, p: &OftSend) -> Result<Operation> {
        let allocator = self.registry.metadata.vault_allocator;
        let [to_low, to_high] = p.to.limbs();
        self.resolved(
            &LeafMatcher::SlotPrefix {
                op_id: op_id(ops::SEND),
                target: Some(oft),
                slots: vec![p.dst_eid, to_low, to_high, allocator],
            },
            bridge::oft_send(p, allocator),
        )
    }

    /// Send through the OFT middleware, claiming `token_to_claim` on
    /// completion.
    pub fn bridge_oft_middleware(
        &self,
        oft: Felt,
        underlying_token: Felt,
        token_to_claim: Felt,
        p: &OftSend,
    ) -> Result<Operation> {
        let allocator = self.registry.metadata.vault_allocator;
        let [to_low, to_high] = p.to.limbs();
        self.resolved(
            &LeafMatcher::SlotPrefix {
                op_id: op_id(ops::SEND),
                target: None,
                slots: vec![
                    oft,
                    underlying_token,
                    token_to_claim,
                    p.dst_eid,
                    to_low,
                    to_high,
                    allocator,
                ],
            },
            bridge::oft_middleware_send(oft, underlying_token, token_to_claim, p, allocator),
        )
    }

    /* ---------------- position deltas ---------------- */

    /// Adjust a v1 lending position. The position user is always the
    /// vault.
    pub fn modify_position_v1(
        &self,
        target: Felt,
        pool_id: Felt,
        collateral_asset: Felt,
        debt_asset: Felt,
        collateral: &AmountV1,
        debt: &AmountV1,
        data: &[Felt],
    ) -> Result<Operation> {
        let user = self.registry.metadata.vault;
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::MODIFY_POSITION),
                target,
            },
            position::modify_position_v1(
                pool_id,
                collateral_asset,
                debt_asset,
                user,
                collateral,
                debt,
                data,
            ),
        )
    }

    /// Adjust a v2 lending position. The committed leaf pins the asset
    /// pair and the user (the vault) positionally.
    pub fn modify_position_v2(
        &self,
        target: Felt,
        collateral_asset: Felt,
        debt_asset: Felt,
        collateral: &AmountV2,
        debt: &AmountV2,
    ) -> Result<Operation> {
        let user = self.registry.metadata.vault;
        self.resolved(
            &LeafMatcher::SlotsExact {
                op_id: op_id(ops::MODIFY_POSITION),
                target,
                slots: vec![collateral_asset, debt_asset, user],
            },
            position::modify_position_v2(collateral_asset, debt_asset, user, collateral, debt),
        )
    }

    /* ---------------- liquidity ---------------- */

    /// Deposit both pool tokens into the liquidity adapter `target`.
    pub fn deposit_liquidity(
        &self,
        target: Felt,
        amount0: Uint256,
        amount1: Uint256,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::DEPOSIT_LIQUIDITY),
                target,
            },
            liquidity::deposit_liquidity(amount0, amount1),
        )
    }

    /// Withdraw a wad-scaled ratio of the position.
    pub fn withdraw_liquidity(
        &self,
        target: Felt,
        ratio_wad: Uint256,
        min_token0: Felt,
        min_token1: Felt,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::WITHDRAW_LIQUIDITY),
                target,
            },
            liquidity::withdraw_liquidity(ratio_wad, min_token0, min_token1),
        )
    }

    /// Collect accrued pool fees.
    pub fn collect_fees(&self, target: Felt) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::COLLECT_FEES),
                target,
            },
            liquidity::collect_fees(),
        )
    }

    /// Harvest distributor rewards, carrying the distributor's own
    /// inclusion proof verbatim.
    pub fn harvest(
        &self,
        target: Felt,
        reward_contract: Felt,
        amount: Felt,
        reward_proof: &[Felt],
        reward_token: Felt,
    ) -> Result<Operation> {
        self.resolved(
            &LeafMatcher::OpTarget {
                op_id: op_id(ops::HARVEST),
                target,
            },
            liquidity::harvest(reward_contract, amount, reward_proof, reward_token),
        )
    }

    /* ---------------- batching ---------------- */

    /// Compile a single operation into an invocation.
    pub fn invoke(&self, op: Operation) -> Result<Invocation> {
        compile_batch(&self.registry.metadata, std::slice::from_ref(&op))
    }

    /// Compile an ordered batch into one invocation.
    pub fn invoke_batch(&self, ops: &[Operation]) -> Result<Invocation> {
        compile_batch(&self.registry.metadata, ops)
    }

    /* ---------------- approval bundles ---------------- */

    /// Approve the vault on the underlying asset, then bring liquidity.
    pub fn bring_liquidity_with_approval(&self, amount: Uint256) -> Result<Vec<Operation>> {
        let md = &self.registry.metadata;
        Ok(vec![
            self.approve(md.underlying_asset, md.vault, amount)?,
            self.bring_liquidity(amount)?,
        ])
    }

    /// Approve the share vault on the underlying asset, then deposit.
    pub fn deposit_with_approval(
        &self,
        target: Felt,
        assets: Uint256,
        receiver: Felt,
    ) -> Result<Vec<Operation>> {
        let underlying = self.registry.metadata.underlying_asset;
        Ok(vec![
            self.approve(underlying, target, assets)?,
            self.deposit(target, assets, receiver)?,
        ])
    }

    /// Approve the vault on the underlying asset, then mint.
    pub fn mint_with_approval(
        &self,
        target: Felt,
        shares: Uint256,
        receiver: Felt,
    ) -> Result<Vec<Operation>> {
        let md = &self.registry.metadata;
        Ok(vec![
            self.approve(md.underlying_asset, md.vault, shares)?,
            self.mint(target, shares, receiver)?,
        ])
    }

    /// Approve the router on the sell token, then swap.
    pub fn swap_with_approval(
        &self,
        target: Felt,
        params: &MultiRouteSwap,
    ) -> Result<Vec<Operation>> {
        Ok(vec![
            self.approve(params.sell_token, target, params.sell_amount)?,
            self.multi_route_swap(target, params)?,
        ])
    }

    /// Optionally approve, then adjust a v1 position.
    #[allow(clippy::too_many_arguments)]
    pub fn modify_position_v1_with_approval(
        &self,
        target: Felt,
        pool_id: Felt,
        collateral_asset: Felt,
        debt_asset: Felt,
        collateral: &AmountV1,
        debt: &AmountV1,
        data: &[Felt],
        approval: Option<&ApprovalSpec>,
    ) -> Result<Vec<Operation>> {
        let mut ops = Vec::with_capacity(2);
        if let Some(ap) = approval {
            ops.push(self.approve(ap.target, ap.spender, ap.amount)?);
        }
        ops.push(self.modify_position_v1(
            target,
            pool_id,
            collateral_asset,
            debt_asset,
            collateral,
            debt,
            data,
        )?);
        Ok(ops)
    }

    /// Optionally approve, then adjust a v2 position.
    pub fn modify_position_v2_with_approval(
        &self,
        target: Felt,
        collateral_asset: Felt,
        debt_asset: Felt,
        collateral: &AmountV2,
        debt: &AmountV2,
        approval: Option<&ApprovalSpec>,
    ) -> Result<Vec<Operation>> {
        let mut ops = Vec::with_capacity(2);
        if let Some(ap) = approval {
            ops.push(self.approve(ap.target, ap.spender, ap.amount)?);
        }
        ops.push(self.modify_position_v2(target, collateral_asset, debt_asset, collateral, debt)?);
        Ok(ops)
    }

    /* ---------------- vault-owned conveniences ---------------- */

    /// Withdraw with both receiver and owner defaulted to the vault.
    pub fn withdraw_for_vault(&self, target: Felt, assets: Uint256) -> Result<Operation> {
        let vault = self.registry.metadata.vault;
        self.withdraw(target, assets, vault, vault)
    }

    /// Redeem with both receiver and owner defaulted to the vault.
    pub fn redeem_for_vault(&self, target: Felt, shares: Uint256) -> Result<Operation> {
        let vault = self.registry.metadata.vault;
        self.redeem(target, shares, vault, vault)
    }

    /// Request an async redemption for the vault itself.
    pub fn request_redeem_for_vault(&self, target: Felt, shares: Uint256) -> Result<Operation> {
        let vault = self.registry.metadata.vault;
        self.request_redeem(target, shares, vault, vault)
    }
}
