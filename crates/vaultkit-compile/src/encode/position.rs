//! Collateral/debt position-delta layouts (lending markets).
//!
//! Each signed delta is preceded by its explicit flags so the decoder
//! never guesses units: v1 carries (kind, denomination, i257), v2 drops
//! the kind and carries (denomination, i257).

use super::Calldata;
use serde::{Deserialize, Serialize};
use vaultkit_core::{Felt, Signed256};

/// Whether the value is a relative delta or an absolute target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountKind {
    /// Relative change to the position.
    Delta,
    /// Absolute target for the position.
    Target,
}

impl AmountKind {
    /// Wire flag: Delta = 0, Target = 1.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> u64 {
        match self {
            Self::Delta => 0,
            Self::Target => 1,
        }
    }
}

/// Units the magnitude is denominated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    /// Token-native units.
    Native,
    /// Scaled "assets" units of the market.
    Assets,
}

impl Denomination {
    /// Wire flag: Native = 0, Assets = 1.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> u64 {
        match self {
            Self::Native => 0,
            Self::Assets => 1,
        }
    }
}

/// A v1 amount: kind, denomination, signed magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountV1 {
    /// Delta or target.
    pub kind: AmountKind,
    /// Units flag.
    pub denomination: Denomination,
    /// Signed magnitude.
    pub value: Signed256,
}

/// A v2 amount: denomination, signed magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountV2 {
    /// Units flag.
    pub denomination: Denomination,
    /// Signed magnitude.
    pub value: Signed256,
}

fn amount_v1(cd: &mut Calldata, a: &AmountV1) {
    cd.felt(Felt::from_u64(a.kind.flag()))
        .felt(Felt::from_u64(a.denomination.flag()))
        .signed(a.value);
}

fn amount_v2(cd: &mut Calldata, a: &AmountV2) {
    cd.felt(Felt::from_u64(a.denomination.flag()))
        .signed(a.value);
}

/// modify_position (v1): pool id, asset pair, user, collateral amount,
/// debt amount, count-prefixed data array.
#[must_use]
pub fn modify_position_v1(
    pool_id: Felt,
    collateral_asset: Felt,
    debt_asset: Felt,
    user: Felt,
    collateral: &AmountV1,
    debt: &AmountV1,
    data: &[Felt],
) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(pool_id)
        .felt(collateral_asset)
        .felt(debt_asset)
        .felt(user);
    amount_v1(&mut cd, collateral);
    amount_v1(&mut cd, debt);
    cd.count(data.len()).extend(data);
    cd.finish()
}

/// modify_position (v2): asset pair, user, collateral amount, debt
/// amount (11 slots).
#[must_use]
pub fn modify_position_v2(
    collateral_asset: Felt,
    debt_asset: Felt,
    user: Felt,
    collateral: &AmountV2,
    debt: &AmountV2,
) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(collateral_asset).felt(debt_asset).felt(user);
    amount_v2(&mut cd, collateral);
    amount_v2(&mut cd, debt);
    cd.finish()
}
