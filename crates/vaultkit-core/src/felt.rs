//! Field-element and fixed-width integer values.
//!
//! [`Felt`] is the unit everything on the wire is made of: addresses,
//! operation ids, commitments, and calldata slots. It is a 256-bit
//! big-endian value ordered numerically, serialized as a `0x`-prefixed
//! lowercase hex string.
//!
//! [`Uint256`] is a 256-bit unsigned magnitude that always encodes as
//! exactly two slots (low limb first); [`Signed256`] adds a sign flag.
//! Parsers reject negative, malformed, and out-of-range inputs with
//! [`Error::InvalidParameter`] instead of wrapping or truncating.

use crate::error::{Error, Result};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single field element: 256-bit value in big-endian byte order.
///
/// Ordering is numeric (big-endian lexicographic), which is what the
/// commutative pair hash sorts by.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt([u8; 32]);

impl Felt {
    /// The zero element.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Construct from raw big-endian bytes.
    #[inline]
    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw big-endian bytes.
    #[inline]
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Borrow the big-endian bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Construct from a `u64`.
    #[inline]
    #[must_use]
    pub fn from_u64(v: u64) -> Self {
        Self::from_u128(u128::from(v))
    }

    /// Construct from a `u128`.
    #[inline]
    #[must_use]
    pub fn from_u128(v: u128) -> Self {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&v.to_be_bytes());
        Self(out)
    }

    /// Parse a `0x`-prefixed (or bare) hex string of at most 64 nibbles.
    ///
    /// Odd-length digit strings are accepted and left-padded.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if digits.is_empty() || digits.len() > 64 {
            return Err(Error::InvalidParameter {
                detail: format!("field element hex literal {s:?} must have 1..=64 digits"),
            });
        }
        let mut padded = String::with_capacity(64);
        for _ in digits.len()..64 {
            padded.push('0');
        }
        padded.push_str(digits);
        let raw = hex::decode(&padded).map_err(|e| Error::InvalidParameter {
            detail: format!("field element hex literal {s:?}: {e}"),
        })?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&raw);
        Ok(Self(out))
    }

    /// Whether this is the zero element.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = hex::encode(self.0);
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            write!(f, "0x0")
        } else {
            write!(f, "0x{trimmed}")
        }
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({self})")
    }
}

impl From<u64> for Felt {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

impl From<u128> for Felt {
    fn from(v: u128) -> Self {
        Self::from_u128(v)
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// A 256-bit unsigned magnitude, stored as two 128-bit limbs.
///
/// On the wire this is always two slots: the low limb first, then the
/// high limb. Never a single slot, never reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Uint256 {
    /// Low 128 bits.
    pub low: u128,
    /// High 128 bits.
    pub high: u128,
}

const LO64: u128 = (1u128 << 64) - 1;

/// Multiply a limb by a small factor and add a small carry, returning
/// the new limb and the outgoing carry. Exact over 64-bit halves.
#[inline]
fn mac_small(limb: u128, factor: u8, add: u8) -> (u128, u128) {
    let f = u128::from(factor);
    let lo = (limb & LO64) * f + u128::from(add);
    let hi = (limb >> 64) * f + (lo >> 64);
    ((lo & LO64) | (hi << 64), hi >> 64)
}

impl Uint256 {
    /// The zero value.
    pub const ZERO: Self = Self { low: 0, high: 0 };

    /// Construct from explicit limbs.
    #[inline]
    #[must_use]
    pub const fn from_limbs(low: u128, high: u128) -> Self {
        Self { low, high }
    }

    /// Construct from a `u128` (high limb zero).
    #[inline]
    #[must_use]
    pub const fn from_u128(v: u128) -> Self {
        Self { low: v, high: 0 }
    }

    /// Construct from a `u64` (high limb zero).
    #[inline]
    #[must_use]
    pub const fn from_u64(v: u64) -> Self {
        Self { low: v as u128, high: 0 }
    }

    /// Construct from big-endian bytes.
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        let mut hi = [0u8; 16];
        let mut lo = [0u8; 16];
        hi.copy_from_slice(&bytes[..16]);
        lo.copy_from_slice(&bytes[16..]);
        Self {
            low: u128::from_be_bytes(lo),
            high: u128::from_be_bytes(hi),
        }
    }

    /// Big-endian bytes of the full 256-bit value.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&self.high.to_be_bytes());
        out[16..].copy_from_slice(&self.low.to_be_bytes());
        out
    }

    /// The two wire slots, low limb first.
    #[inline]
    #[must_use]
    pub fn limbs(self) -> [Felt; 2] {
        [Felt::from_u128(self.low), Felt::from_u128(self.high)]
    }

    /// Whether the value is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.low == 0 && self.high == 0
    }

    /// Parse a decimal digit string. Overflow past 2^256 fails.
    pub fn from_dec_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidParameter {
                detail: format!("expected an unsigned decimal value, got {s:?}"),
            });
        }
        let mut acc = Self::ZERO;
        for b in s.bytes() {
            let digit = b - b'0';
            let (low, c1) = mac_small(acc.low, 10, digit);
            let (high, c2) = mac_small(acc.high, 10, c1 as u8);
            if c2 != 0 {
                return Err(Error::InvalidParameter {
                    detail: format!("decimal value {s:?} exceeds 256 bits"),
                });
            }
            acc = Self { low, high };
        }
        Ok(acc)
    }

    /// Parse a `0x`-prefixed hex string of at most 64 nibbles.
    pub fn from_hex_str(s: &str) -> Result<Self> {
        Felt::from_hex(s).map(|f| Self::from_be_bytes(f.to_be_bytes()))
    }

    /// Parse either form. A leading `-` is rejected outright: unsigned
    /// slots never wrap a negative input.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('-') {
            return Err(Error::InvalidParameter {
                detail: format!("negative value -{rest} supplied where an unsigned 256-bit value is required"),
            });
        }
        if s.starts_with("0x") || s.starts_with("0X") {
            Self::from_hex_str(s)
        } else {
            Self::from_dec_str(s)
        }
    }
}

impl From<u128> for Uint256 {
    fn from(v: u128) -> Self {
        Self::from_u128(v)
    }
}

impl From<u64> for Uint256 {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

/// A signed 256-bit magnitude: absolute value plus sign flag.
///
/// Wire form is three slots: low limb, high limb, then the flag
/// (0 = non-negative, 1 = negative).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signed256 {
    /// Absolute value.
    pub magnitude: Uint256,
    /// Sign flag; negative zero normalizes to non-negative.
    pub negative: bool,
}

impl Signed256 {
    /// Construct, normalizing negative zero.
    #[must_use]
    pub fn new(magnitude: Uint256, negative: bool) -> Self {
        Self {
            magnitude,
            negative: negative && !magnitude.is_zero(),
        }
    }

    /// Parse a decimal or hex string with an optional leading `-`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('-') {
            Ok(Self::new(Uint256::parse(rest)?, true))
        } else {
            Ok(Self::new(Uint256::parse(s)?, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn felt_hex_roundtrip() {
        let f = Felt::from_hex("0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d").unwrap();
        assert_eq!(
            f.to_string(),
            "0x4718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d"
        );
        assert_eq!(Felt::from_hex(&f.to_string()).unwrap(), f);
        assert_eq!(Felt::ZERO.to_string(), "0x0");
    }

    #[test]
    fn felt_ordering_is_numeric() {
        assert!(Felt::from_u64(2) < Felt::from_u64(10));
        assert!(Felt::from_u128(1 << 100) > Felt::from_u64(u64::MAX));
    }

    #[test]
    fn felt_rejects_oversized_hex() {
        let too_long = format!("0x1{}", "0".repeat(64));
        assert!(matches!(
            Felt::from_hex(&too_long),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn uint256_limbs_low_first() {
        let v = Uint256::from_limbs(7, 9);
        assert_eq!(v.limbs(), [Felt::from_u64(7), Felt::from_u64(9)]);
    }

    #[test]
    fn uint256_dec_parse() {
        assert_eq!(Uint256::from_dec_str("0").unwrap(), Uint256::ZERO);
        assert_eq!(
            Uint256::from_dec_str("340282366920938463463374607431768211456").unwrap(),
            Uint256::from_limbs(0, 1)
        );
        // 2^256 - 1 parses; 2^256 overflows.
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert_eq!(
            Uint256::from_dec_str(max).unwrap(),
            Uint256::from_limbs(u128::MAX, u128::MAX)
        );
        let over = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(matches!(
            Uint256::from_dec_str(over),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn uint256_rejects_negative() {
        assert!(matches!(
            Uint256::parse("-5"),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn signed_normalizes_negative_zero() {
        let z = Signed256::parse("-0").unwrap();
        assert!(!z.negative);
        let n = Signed256::parse("-12").unwrap();
        assert!(n.negative);
        assert_eq!(n.magnitude, Uint256::from_u64(12));
    }

    #[test]
    fn hex_dec_agree() {
        assert_eq!(
            Uint256::parse("0xff").unwrap(),
            Uint256::parse("255").unwrap()
        );
    }
}
