//! Request documents: a whole batch described as data.
//!
//! An [`ActionRequest`] is the serde-tagged form of one compiler call,
//! so a file like
//!
//! ```json
//! [
//!   { "action": "approve", "target": "0x4", "spender": "0x64", "amount": "1000000" },
//!   { "action": "deposit", "target": "0x64", "assets": "1000000", "receiver": "0x3" }
//! ]
//! ```
//!
//! compiles to one aggregate invocation. Amounts are strings (decimal
//! or `0x` hex) and parse through the strict [`Uint256`]/[`Signed256`]
//! parsers, so a negative or out-of-range value fails with
//! `InvalidParameter` before anything is encoded.

use crate::compiler::{ApprovalSpec, VaultCompiler};
use crate::encode::bridge::{BurnMintTransfer, MessageBridgeTransfer, OftSend};
use crate::encode::position::{AmountKind, AmountV1, AmountV2, Denomination};
use crate::encode::swap::{MultiRouteSwap, Route};
use crate::encode::ByteArray;
use serde::{Deserialize, Serialize};
use vaultkit_core::{Felt, Invocation, Operation, Result, Signed256, Uint256};

/// One route of a swap request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Token sold on this hop.
    pub sell_token: Felt,
    /// Token bought on this hop.
    pub buy_token: Felt,
    /// Exchange executing the hop.
    pub exchange_address: Felt,
    /// Percent share in the router's denomination.
    pub percent: String,
    /// Exchange-specific extra parameters.
    #[serde(default)]
    pub extra_params: Vec<Felt>,
}

/// A v1 position amount in document form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AmountRequestV1 {
    /// Delta or target.
    pub kind: AmountKind,
    /// Units flag.
    pub denomination: Denomination,
    /// Signed magnitude, e.g. `"-2500000"`.
    pub value: String,
}

/// A v2 position amount in document form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AmountRequestV2 {
    /// Units flag.
    pub denomination: Denomination,
    /// Signed magnitude.
    pub value: String,
}

/// An approval to sequence before a position adjustment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Token contract.
    pub target: Felt,
    /// Spender being approved.
    pub spender: Felt,
    /// Allowance amount.
    pub amount: String,
}

/// One semantic action request, tagged by family.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    /// Token approval.
    Approve {
        /// Token contract.
        target: Felt,
        /// Spender being approved.
        spender: Felt,
        /// Allowance amount.
        amount: String,
    },
    /// Allocator bring-liquidity.
    BringLiquidity {
        /// Amount moved into the vault.
        amount: String,
        /// Prepend an approval of the vault on the underlying asset.
        #[serde(default)]
        with_approval: bool,
    },
    /// Share-vault deposit.
    Deposit {
        /// Share vault.
        target: Felt,
        /// Assets deposited.
        assets: String,
        /// Share receiver.
        receiver: Felt,
        /// Prepend an approval of the target on the underlying asset.
        #[serde(default)]
        with_approval: bool,
    },
    /// Share-vault mint.
    Mint {
        /// Share vault.
        target: Felt,
        /// Shares minted.
        shares: String,
        /// Share receiver.
        receiver: Felt,
        /// Prepend an approval of the vault on the underlying asset.
        #[serde(default)]
        with_approval: bool,
    },
    /// Share-vault withdraw.
    Withdraw {
        /// Share vault.
        target: Felt,
        /// Assets withdrawn.
        assets: String,
        /// Asset receiver.
        receiver: Felt,
        /// Share owner.
        owner: Felt,
    },
    /// Share-vault redeem.
    Redeem {
        /// Share vault.
        target: Felt,
        /// Shares redeemed.
        shares: String,
        /// Asset receiver.
        receiver: Felt,
        /// Share owner.
        owner: Felt,
    },
    /// Async redemption request.
    RequestRedeem {
        /// Share vault.
        target: Felt,
        /// Shares to redeem.
        shares: String,
        /// Asset receiver.
        receiver: Felt,
        /// Share owner.
        owner: Felt,
    },
    /// Async redemption claim.
    ClaimRedeem {
        /// Share vault.
        target: Felt,
        /// Request id.
        id: String,
    },
    /// Router multi-route swap.
    MultiRouteSwap {
        /// Router contract.
        target: Felt,
        /// Token sold.
        sell_token: Felt,
        /// Amount sold.
        sell_amount: String,
        /// Token bought.
        buy_token: Felt,
        /// Expected buy amount.
        buy_amount: String,
        /// Minimum acceptable buy amount.
        buy_min_amount: String,
        /// Integrator fee in basis points.
        integrator_fee_bps: Felt,
        /// Integrator fee recipient.
        integrator_fee_recipient: Felt,
        /// Ordered routes.
        routes: Vec<RouteRequest>,
        /// Prepend an approval of the router on the sell token.
        #[serde(default)]
        with_approval: bool,
    },
    /// Gateway bridge withdraw.
    BridgeGateway {
        /// Token on the settlement layer.
        l1_token: Felt,
        /// Recipient on the settlement layer.
        l1_recipient: Felt,
        /// Amount bridged.
        amount: String,
    },
    /// Gateway middleware withdraw.
    BridgeGatewayMiddleware {
        /// Gateway bridge contract.
        gateway: Felt,
        /// Token on the settlement layer.
        l1_token: Felt,
        /// Recipient on the settlement layer.
        l1_recipient: Felt,
        /// Amount bridged.
        amount: String,
        /// Token the middleware releases on claim.
        token_to_claim: Felt,
    },
    /// Gateway claim of a transfer bridged back.
    ClaimGatewayBridgedBack,
    /// Message-bridge transfer.
    BridgeMessage {
        /// Token on this domain.
        source_token: Felt,
        /// Token on the destination domain.
        destination_token: Felt,
        /// Destination domain id.
        destination_domain: Felt,
        /// Recipient (full 256-bit address space).
        recipient: String,
        /// Amount bridged.
        amount: String,
        /// Native-token fee.
        fee: String,
    },
    /// Burn-and-mint transfer.
    BridgeBurnMint {
        /// Token burned on this domain.
        burn_token: Felt,
        /// Token the middleware releases on claim.
        token_to_claim: Felt,
        /// Amount burned.
        amount: String,
        /// Destination domain id.
        destination_domain: Felt,
        /// Mint recipient on the destination domain.
        mint_recipient: String,
        /// Caller restriction on the destination domain.
        destination_caller: String,
        /// Maximum fee.
        max_fee: String,
        /// Attestation finality threshold.
        min_finality_threshold: Felt,
    },
    /// Direct OFT send.
    BridgeOft {
        /// OFT contract.
        oft: Felt,
        /// Destination endpoint id.
        dst_eid: Felt,
        /// Recipient on the destination endpoint.
        to: String,
        /// Amount sent.
        amount: String,
        /// Minimum amount after fees.
        min_amount: String,
        /// Native-token fee.
        native_fee: String,
        /// Bridge-token fee; defaults to zero.
        #[serde(default)]
        lz_token_fee: Option<String>,
        /// Executor options hex; defaults to empty.
        #[serde(default)]
        extra_options: Option<String>,
        /// Compose message hex; defaults to empty.
        #[serde(default)]
        compose_msg: Option<String>,
        /// OFT command hex; defaults to empty.
        #[serde(default)]
        oft_cmd: Option<String>,
    },
    /// OFT middleware send.
    BridgeOftMiddleware {
        /// OFT contract.
        oft: Felt,
        /// Underlying token being sent.
        underlying_token: Felt,
        /// Token the middleware releases on claim.
        token_to_claim: Felt,
        /// Destination endpoint id.
        dst_eid: Felt,
        /// Recipient on the destination endpoint.
        to: String,
        /// Amount sent.
        amount: String,
        /// Minimum amount after fees.
        min_amount: String,
        /// Native-token fee.
        native_fee: String,
        /// Bridge-token fee; defaults to zero.
        #[serde(default)]
        lz_token_fee: Option<String>,
        /// Executor options hex; defaults to empty.
        #[serde(default)]
        extra_options: Option<String>,
        /// Compose message hex; defaults to empty.
        #[serde(default)]
        compose_msg: Option<String>,
        /// OFT command hex; defaults to empty.
        #[serde(default)]
        oft_cmd: Option<String>,
    },
    /// v1 position adjustment.
    ModifyPositionV1 {
        /// Lending market contract.
        target: Felt,
        /// Pool identifier.
        pool_id: Felt,
        /// Collateral asset.
        collateral_asset: Felt,
        /// Debt asset.
        debt_asset: Felt,
        /// Collateral amount.
        collateral: AmountRequestV1,
        /// Debt amount.
        debt: AmountRequestV1,
        /// Market-specific data slots.
        #[serde(default)]
        data: Vec<Felt>,
        /// Optional approval sequenced first.
        #[serde(default)]
        approval: Option<ApprovalRequest>,
    },
    /// v2 position adjustment.
    ModifyPositionV2 {
        /// Lending market contract.
        target: Felt,
        /// Collateral asset.
        collateral_asset: Felt,
        /// Debt asset.
        debt_asset: Felt,
        /// Collateral amount.
        collateral: AmountRequestV2,
        /// Debt amount.
        debt: AmountRequestV2,
        /// Optional approval sequenced first.
        #[serde(default)]
        approval: Option<ApprovalRequest>,
    },
    /// Liquidity deposit.
    DepositLiquidity {
        /// Liquidity adapter.
        target: Felt,
        /// Amount of token0.
        amount0: String,
        /// Amount of token1.
        amount1: String,
    },
    /// Liquidity withdrawal.
    WithdrawLiquidity {
        /// Liquidity adapter.
        target: Felt,
        /// Wad-scaled withdrawal ratio.
        ratio_wad: String,
        /// Minimum token0 out.
        min_token0: Felt,
        /// Minimum token1 out.
        min_token1: Felt,
    },
    /// Fee collection.
    CollectFees {
        /// Liquidity adapter.
        target: Felt,
    },
    /// Reward harvest.
    Harvest {
        /// Liquidity adapter.
        target: Felt,
        /// Reward distributor contract.
        reward_contract: Felt,
        /// Claimed amount.
        amount: Felt,
        /// Distributor inclusion proof, carried verbatim.
        #[serde(default)]
        reward_proof: Vec<Felt>,
        /// Reward token.
        reward_token: Felt,
    },
}

fn uint(s: &str) -> Result<Uint256> {
    Uint256::parse(s)
}

fn signed(s: &str) -> Result<Signed256> {
    Signed256::parse(s)
}

fn bytes(opt: Option<&String>) -> Result<ByteArray> {
    opt.map_or_else(|| Ok(ByteArray::empty()), |s| ByteArray::from_hex(s))
}

fn oft_params(
    dst_eid: Felt,
    to: &str,
    amount: &str,
    min_amount: &str,
    native_fee: &str,
    lz_token_fee: Option<&String>,
    extra_options: Option<&String>,
    compose_msg: Option<&String>,
    oft_cmd: Option<&String>,
) -> Result<OftSend> {
    Ok(OftSend {
        dst_eid,
        to: uint(to)?,
        amount: uint(amount)?,
        min_amount: uint(min_amount)?,
        extra_options: bytes(extra_options)?,
        compose_msg: bytes(compose_msg)?,
        oft_cmd: bytes(oft_cmd)?,
        native_fee: uint(native_fee)?,
        lz_token_fee: lz_token_fee.map_or(Ok(Uint256::ZERO), |s| uint(s))?,
    })
}

impl ActionRequest {
    /// Compile this request into its operations (one, or two when an
    /// approval is bundled).
    #[allow(clippy::too_many_lines)]
    pub fn compile(&self, c: &VaultCompiler) -> Result<Vec<Operation>> {
        match self {
            Self::Approve {
                target,
                spender,
                amount,
            } => Ok(vec![c.approve(*target, *spender, uint(amount)?)?]),
            Self::BringLiquidity {
                amount,
                with_approval,
            } => {
                let amount = uint(amount)?;
                if *with_approval {
                    c.bring_liquidity_with_approval(amount)
                } else {
                    Ok(vec![c.bring_liquidity(amount)?])
                }
            }
            Self::Deposit {
                target,
                assets,
                receiver,
                with_approval,
            } => {
                let assets = uint(assets)?;
                if *with_approval {
                    c.deposit_with_approval(*target, assets, *receiver)
                } else {
                    Ok(vec![c.deposit(*target, assets, *receiver)?])
                }
            }
            Self::Mint {
                target,
                shares,
                receiver,
                with_approval,
            } => {
                let shares = uint(shares)?;
                if *with_approval {
                    c.mint_with_approval(*target, shares, *receiver)
                } else {
                    Ok(vec![c.mint(*target, shares, *receiver)?])
                }
            }
            Self::Withdraw {
                target,
                assets,
                receiver,
                owner,
            } => Ok(vec![c.withdraw(*target, uint(assets)?, *receiver, *owner)?]),
            Self::Redeem {
                target,
                shares,
                receiver,
                owner,
            } => Ok(vec![c.redeem(*target, uint(shares)?, *receiver, *owner)?]),
            Self::RequestRedeem {
                target,
                shares,
                receiver,
                owner,
            } => Ok(vec![c.request_redeem(*target, uint(shares)?, *receiver, *owner)?]),
            Self::ClaimRedeem { target, id } => Ok(vec![c.claim_redeem(*target, uint(id)?)?]),
            Self::MultiRouteSwap {
                target,
                sell_token,
                sell_amount,
                buy_token,
                buy_amount,
                buy_min_amount,
                integrator_fee_bps,
                integrator_fee_recipient,
                routes,
                with_approval,
            } => {
                let params = MultiRouteSwap {
                    sell_token: *sell_token,
                    sell_amount: uint(sell_amount)?,
                    buy_token: *buy_token,
                    buy_amount: uint(buy_amount)?,
                    buy_min_amount: uint(buy_min_amount)?,
                    integrator_fee_bps: *integrator_fee_bps,
                    integrator_fee_recipient: *integrator_fee_recipient,
                    routes: routes
                        .iter()
                        .map(|r| {
                            Ok(Route {
                                sell_token: r.sell_token,
                                buy_token: r.buy_token,
                                exchange_address: r.exchange_address,
                                percent: uint(&r.percent)?,
                                extra_params: r.extra_params.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                };
                if *with_approval {
                    c.swap_with_approval(*target, &params)
                } else {
                    Ok(vec![c.multi_route_swap(*target, &params)?])
                }
            }
            Self::BridgeGateway {
                l1_token,
                l1_recipient,
                amount,
            } => Ok(vec![c.bridge_gateway(*l1_token, *l1_recipient, uint(amount)?)?]),
            Self::BridgeGatewayMiddleware {
                gateway,
                l1_token,
                l1_recipient,
                amount,
                token_to_claim,
            } => Ok(vec![c.bridge_gateway_middleware(
                *gateway,
                *l1_token,
                *l1_recipient,
                uint(amount)?,
                *token_to_claim,
            )?]),
            Self::ClaimGatewayBridgedBack => Ok(vec![c.claim_gateway_bridged_back()?]),
            Self::BridgeMessage {
                source_token,
                destination_token,
                destination_domain,
                recipient,
                amount,
                fee,
            } => Ok(vec![c.bridge_message(&MessageBridgeTransfer {
                source_token: *source_token,
                destination_token: *destination_token,
                destination_domain: *destination_domain,
                recipient: uint(recipient)?,
                amount: uint(amount)?,
                fee: uint(fee)?,
            })?]),
            Self::BridgeBurnMint {
                burn_token,
                token_to_claim,
                amount,
                destination_domain,
                mint_recipient,
                destination_caller,
                max_fee,
                min_finality_threshold,
            } => Ok(vec![c.bridge_burn_mint(&BurnMintTransfer {
                amount: uint(amount)?,
                destination_domain: *destination_domain,
                mint_recipient: uint(mint_recipient)?,
                burn_token: *burn_token,
                token_to_claim: *token_to_claim,
                destination_caller: uint(destination_caller)?,
                max_fee: uint(max_fee)?,
                min_finality_threshold: *min_finality_threshold,
            })?]),
            Self::BridgeOft {
                oft,
                dst_eid,
                to,
                amount,
                min_amount,
                native_fee,
                lz_token_fee,
                extra_options,
                compose_msg,
                oft_cmd,
            } => {
                let params = oft_params(
                    *dst_eid,
                    to,
                    amount,
                    min_amount,
                    native_fee,
                    lz_token_fee.as_ref(),
                    extra_options.as_ref(),
                    compose_msg.as_ref(),
                    oft_cmd.as_ref(),
                )?;
                Ok(vec![c.bridge_oft(*oft, &params)?])
            }
            Self::BridgeOftMiddleware {
                oft,
                underlying_token,
                token_to_claim,
                dst_eid,
                to,
                amount,
                min_amount,
                native_fee,
                lz_token_fee,
                extra_options,
                compose_msg,
                oft_cmd,
            } => {
                let params = oft_params(
                    *dst_eid,
                    to,
                    amount,
                    min_amount,
                    native_fee,
                    lz_token_fee.as_ref(),
                    extra_options.as_ref(),
                    compose_msg.as_ref(),
                    oft_cmd.as_ref(),
                )?;
                Ok(vec![c.bridge_oft_middleware(
                    *oft,
                    *underlying_token,
                    *token_to_claim,
                    &params,
                )?])
            }
            Self::ModifyPositionV1 {
                target,
                pool_id,
                collateral_asset,
                debt_asset,
                collateral,
                debt,
                data,
                approval,
            } => {
                let col = AmountV1 {
                    kind: collateral.kind,
                    denomination: collateral.denomination,
                    value: signed(&collateral.value)?,
                };
                let dbt = AmountV1 {
                    kind: debt.kind,
                    denomination: debt.denomination,
                    value: signed(&debt.value)?,
                };
                let approval = approval
                    .as_ref()
                    .map(|ap| {
                        Ok(ApprovalSpec {
                            target: ap.target,
                            spender: ap.spender,
                            amount: uint(&ap.amount)?,
                        })
                    })
                    .transpose()?;
                c.modify_position_v1_with_approval(
                    *target,
                    *pool_id,
                    *collateral_asset,
                    *debt_asset,
                    &col,
                    &dbt,
                    data,
                    approval.as_ref(),
                )
            }
            Self::ModifyPositionV2 {
                target,
                collateral_asset,
                debt_asset,
                collateral,
                debt,
                approval,
            } => {
                let col = AmountV2 {
                    denomination: collateral.denomination,
                    value: signed(&collateral.value)?,
                };
                let dbt = AmountV2 {
                    denomination: debt.denomination,
                    value: signed(&debt.value)?,
                };
                let approval = approval
                    .as_ref()
                    .map(|ap| {
                        Ok(ApprovalSpec {
                            target: ap.target,
                            spender: ap.spender,
                            amount: uint(&ap.amount)?,
                        })
                    })
                    .transpose()?;
                c.modify_position_v2_with_approval(
                    *target,
                    *collateral_asset,
                    *debt_asset,
                    &col,
                    &dbt,
                    approval.as_ref(),
                )
            }
            Self::DepositLiquidity {
                target,
                amount0,
                amount1,
            } => Ok(vec![c.deposit_liquidity(*target, uint(amount0)?, uint(amount1)?)?]),
            Self::WithdrawLiquidity {
                target,
                ratio_wad,
                min_token0,
                min_token1,
            } => Ok(vec![c.withdraw_liquidity(
                *target,
                uint(ratio_wad)?,
                *min_token0,
                *min_token1,
            )?]),
            Self::CollectFees { target } => Ok(vec![c.collect_fees(*target)?]),
            Self::Harvest {
                target,
                reward_contract,
                amount,
                reward_proof,
                reward_token,
            } => Ok(vec![c.harvest(
                *target,
                *reward_contract,
                *amount,
                reward_proof,
                *reward_token,
            )?]),
        }
    }
}

/// Compile an ordered request batch into one aggregate invocation.
///
/// Requests expand in order (an approval bundle contributes two
/// operations) and the expanded order is reproduced verbatim in the
/// payload.
pub fn compile_requests(
    compiler: &VaultCompiler,
    requests: &[ActionRequest],
) -> Result<Invocation> {
    let mut ops = Vec::with_capacity(requests.len());
    for req in requests {
        ops.extend(req.compile(compiler)?);
    }
    compiler.invoke_batch(&ops)
}
