//! Cross-domain bridge transfer layouts.
//!
//! Recipients and destination-restriction values that live on another
//! domain are 256-bit quantities: they are split into (low, high) limbs
//! the same way on the resolver-matching side and in the final calldata.
//! A limb-order mismatch shows up as either a leaf-resolution failure or
//! an on-chain decode failure, so both sides go through [`Uint256`].

use super::{ByteArray, Calldata};
use serde::{Deserialize, Serialize};
use vaultkit_core::{Felt, Uint256};

/// gateway withdraw: l1 token, l1 recipient, amount (4 slots).
#[must_use]
pub fn gateway_withdraw(l1_token: Felt, l1_recipient: Felt, amount: Uint256) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(l1_token).felt(l1_recipient).uint256(amount);
    cd.finish()
}

/// gateway middleware withdraw: bridge, l1 token, l1 recipient, amount,
/// token to claim (6 slots).
#[must_use]
pub fn gateway_middleware_withdraw(
    bridge: Felt,
    l1_token: Felt,
    l1_recipient: Felt,
    amount: Uint256,
    token_to_claim: Felt,
) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(bridge)
        .felt(l1_token)
        .felt(l1_recipient)
        .uint256(amount)
        .felt(token_to_claim);
    cd.finish()
}

/// claim_token_bridged_back takes no parameters.
#[must_use]
pub fn claim_bridged_back() -> Vec<Felt> {
    Vec::new()
}

/// A message-bridge transfer to another domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBridgeTransfer {
    /// Token on this domain.
    pub source_token: Felt,
    /// Token on the destination domain.
    pub destination_token: Felt,
    /// Destination domain identifier.
    pub destination_domain: Felt,
    /// Recipient on the destination domain (full 256-bit address space).
    pub recipient: Uint256,
    /// Amount bridged.
    pub amount: Uint256,
    /// Fee paid in the native gas token.
    pub fee: Uint256,
}

/// message bridge: source token, destination token, domain, recipient
/// limbs, amount, fee (9 slots).
#[must_use]
pub fn message_bridge(p: &MessageBridgeTransfer) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(p.source_token)
        .felt(p.destination_token)
        .felt(p.destination_domain)
        .uint256(p.recipient)
        .uint256(p.amount)
        .uint256(p.fee);
    cd.finish()
}

/// A burn-and-mint transfer (deposit-for-burn style).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnMintTransfer {
    /// Amount burned on this domain.
    pub amount: Uint256,
    /// Destination domain identifier.
    pub destination_domain: Felt,
    /// Mint recipient on the destination domain.
    pub mint_recipient: Uint256,
    /// Token burned here.
    pub burn_token: Felt,
    /// Token the middleware releases on claim.
    pub token_to_claim: Felt,
    /// Caller restriction on the destination domain (zero = anyone).
    pub destination_caller: Uint256,
    /// Maximum fee the transfer may pay.
    pub max_fee: Uint256,
    /// Attestation finality threshold.
    pub min_finality_threshold: Felt,
}

/// burn-and-mint: amount, domain, mint recipient limbs, burn token,
/// token to claim, destination caller limbs, max fee, threshold
/// (12 slots).
#[must_use]
pub fn burn_mint(p: &BurnMintTransfer) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.uint256(p.amount)
        .felt(p.destination_domain)
        .uint256(p.mint_recipient)
        .felt(p.burn_token)
        .felt(p.token_to_claim)
        .uint256(p.destination_caller)
        .uint256(p.max_fee)
        .felt(p.min_finality_threshold);
    cd.finish()
}

/// An OFT send: the SendParam/MessagingFee pair minus the refund
/// address, which the compiler pins to the vault allocator.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OftSend {
    /// Destination endpoint id.
    pub dst_eid: Felt,
    /// Recipient on the destination endpoint (256-bit).
    pub to: Uint256,
    /// Amount in local decimals.
    pub amount: Uint256,
    /// Minimum amount accepted after fees.
    pub min_amount: Uint256,
    /// Executor options; usually empty.
    pub extra_options: ByteArray,
    /// Compose message; usually empty.
    pub compose_msg: ByteArray,
    /// OFT command; usually empty.
    pub oft_cmd: ByteArray,
    /// Fee paid in the native gas token.
    pub native_fee: Uint256,
    /// Fee paid in the bridge's own token; usually zero.
    pub lz_token_fee: Uint256,
}

/// Append SendParam then MessagingFee then the refund address.
fn send_tail(cd: &mut Calldata, p: &OftSend, refund_address: Felt) {
    cd.felt(p.dst_eid)
        .uint256(p.to)
        .uint256(p.amount)
        .uint256(p.min_amount)
        .byte_array(&p.extra_options)
        .byte_array(&p.compose_msg)
        .byte_array(&p.oft_cmd)
        .uint256(p.native_fee)
        .uint256(p.lz_token_fee)
        .felt(refund_address);
}

/// OFT send: SendParam, MessagingFee, refund address.
#[must_use]
pub fn oft_send(p: &OftSend, refund_address: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    send_tail(&mut cd, p, refund_address);
    cd.finish()
}

/// OFT middleware send: oft, underlying token, token to claim, then the
/// direct layout.
#[must_use]
pub fn oft_middleware_send(
    oft: Felt,
    underlying_token: Felt,
    token_to_claim: Felt,
    p: &OftSend,
    refund_address: Felt,
) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(oft).felt(underlying_token).felt(token_to_claim);
    send_tail(&mut cd, p, refund_address);
    cd.finish()
}
