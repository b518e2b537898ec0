//! Calldata encoding: the ordered field-element layouts each action's
//! on-chain decoder expects.
//!
//! Encoders are pure, order-preserving transforms. The rules, applied
//! uniformly across every family:
//! - a 256-bit unsigned magnitude is exactly two slots, low limb first;
//! - a signed magnitude is (low, high, sign flag);
//! - every variable-length list is prefixed by its element count;
//! - composite parameters flatten in declaration order, no padding.
//!
//! A reordering or width mistake here does not crash; it produces an
//! on-chain revert or, worse, a misinterpreted but accepted call. Slot
//! layouts are therefore pinned by tests per family.

use vaultkit_core::{Error, Felt, Result, Signed256, Uint256};

/// Vault-share operations (deposit/mint/withdraw/redeem, async redeem,
/// approvals, bring-liquidity).
pub mod vault;

/// Router-style multi-route swaps.
pub mod swap;

/// Cross-domain bridge transfers.
pub mod bridge;

/// Collateral/debt position deltas.
pub mod position;

/// Liquidity add/remove/fee-collect/harvest.
pub mod liquidity;

/// Append-only slot builder shared by every encoder.
#[derive(Clone, Debug, Default)]
pub struct Calldata {
    slots: Vec<Felt>,
}

impl Calldata {
    /// Start an empty calldata sequence.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single slot.
    #[inline]
    pub fn felt(&mut self, v: Felt) -> &mut Self {
        self.slots.push(v);
        self
    }

    /// Append a 256-bit magnitude as (low, high).
    #[inline]
    pub fn uint256(&mut self, v: Uint256) -> &mut Self {
        let [low, high] = v.limbs();
        self.slots.push(low);
        self.slots.push(high);
        self
    }

    /// Append a signed magnitude as (low, high, sign flag).
    #[inline]
    pub fn signed(&mut self, v: Signed256) -> &mut Self {
        self.uint256(v.magnitude);
        self.slots.push(Felt::from_u64(u64::from(v.negative)));
        self
    }

    /// Append a list-length prefix.
    #[inline]
    pub fn count(&mut self, n: usize) -> &mut Self {
        self.slots.push(Felt::from_u128(n as u128));
        self
    }

    /// Append pre-encoded slots verbatim.
    #[inline]
    pub fn extend(&mut self, felts: &[Felt]) -> &mut Self {
        self.slots.extend_from_slice(felts);
        self
    }

    /// Append a byte array in its word/pending-word form.
    pub fn byte_array(&mut self, v: &ByteArray) -> &mut Self {
        self.extend(&v.to_slots());
        self
    }

    /// Slots appended so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been appended.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Finish, yielding the ordered slot sequence.
    #[inline]
    #[must_use]
    pub fn finish(self) -> Vec<Felt> {
        self.slots
    }
}

/// Arbitrary bytes carried inside calldata (bridge message options).
///
/// Wire form: count of full 31-byte words, the words themselves
/// (right-aligned in their slot), the pending partial word, and the
/// pending byte length. The empty array is the three slots `0, 0, 0`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteArray(Vec<u8>);

/// Bytes per full word; one byte of headroom keeps every word a
/// canonical field element.
const WORD_BYTES: usize = 31;

impl ByteArray {
    /// The empty byte array.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap raw bytes.
    #[inline]
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse a `0x`-prefixed hex string; empty and `0x` mean empty.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if digits.is_empty() {
            return Ok(Self::empty());
        }
        let bytes = hex::decode(digits).map_err(|e| Error::InvalidParameter {
            detail: format!("byte array hex literal {s:?}: {e}"),
        })?;
        Ok(Self(bytes))
    }

    /// The underlying bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Serialize into slots; see the type docs for the layout.
    #[must_use]
    pub fn to_slots(&self) -> Vec<Felt> {
        let mut chunks = self.0.chunks_exact(WORD_BYTES);
        let full: Vec<Felt> = chunks.by_ref().map(word_to_felt).collect();
        let pending = chunks.remainder();

        let mut out = Vec::with_capacity(full.len() + 3);
        out.push(Felt::from_u128(full.len() as u128));
        out.extend_from_slice(&full);
        out.push(word_to_felt(pending));
        out.push(Felt::from_u128(pending.len() as u128));
        out
    }
}

/// Right-align up to 31 bytes into a slot.
fn word_to_felt(word: &[u8]) -> Felt {
    let mut buf = [0u8; 32];
    buf[32 - word.len()..].copy_from_slice(word);
    Felt::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_appends_in_declaration_order() {
        let mut cd = Calldata::new();
        cd.felt(Felt::from_u64(1))
            .uint256(Uint256::from_limbs(2, 3))
            .signed(Signed256::new(Uint256::from_u64(4), true))
            .count(2);
        assert_eq!(
            cd.finish(),
            vec![
                Felt::from_u64(1),
                Felt::from_u64(2),
                Felt::from_u64(3),
                Felt::from_u64(4),
                Felt::ZERO,
                Felt::from_u64(1),
                Felt::from_u64(2),
            ]
        );
    }

    #[test]
    fn empty_byte_array_is_three_zero_slots() {
        assert_eq!(
            ByteArray::empty().to_slots(),
            vec![Felt::ZERO, Felt::ZERO, Felt::ZERO]
        );
        assert_eq!(ByteArray::from_hex("0x").unwrap(), ByteArray::empty());
    }

    #[test]
    fn short_byte_array_is_pending_only() {
        let ba = ByteArray::new(vec![0xab, 0xcd]);
        let slots = ba.to_slots();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0], Felt::ZERO);
        assert_eq!(slots[1], Felt::from_u64(0xabcd));
        assert_eq!(slots[2], Felt::from_u64(2));
    }

    #[test]
    fn full_word_boundary() {
        let ba = ByteArray::new(vec![0x11; 31]);
        let slots = ba.to_slots();
        // One full word, empty pending.
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0], Felt::from_u64(1));
        assert_eq!(slots[2], Felt::ZERO);
        assert_eq!(slots[3], Felt::ZERO);
    }

    #[test]
    fn word_plus_pending() {
        let mut bytes = vec![0x22; 31];
        bytes.push(0x33);
        let slots = ByteArray::new(bytes).to_slots();
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0], Felt::from_u64(1));
        assert_eq!(slots[2], Felt::from_u64(0x33));
        assert_eq!(slots[3], Felt::from_u64(1));
    }

    #[test]
    fn bad_hex_is_invalid_parameter() {
        assert!(matches!(
            ByteArray::from_hex("0xzz"),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
