//! Unsigned fixed-point amounts.
//!
//! Every price and quantity in the engine is a [`Uint`]: a `u128` carrying
//! an implied scale of [`constants::UNIT_DECIMALS`] decimal places. Prices
//! are quote-per-base, quantities are base units. All arithmetic is integer
//! arithmetic — no floating point anywhere near consensus state.
//!
//! Amounts serialize as decimal strings so that JSON consumers never lose
//! precision on large values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{UNIT_DECIMALS, UNIT_SCALE};
use crate::error::{EngineError, Result};

/// Unsigned fixed-point integer with [`UNIT_DECIMALS`] implied decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct Uint(u128);

impl Uint {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const MAX: Self = Self(u128::MAX);

    /// Wrap a raw fixed-point value (already scaled).
    #[must_use]
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// `value` whole units, i.e. `value * 10^UNIT_DECIMALS` raw steps.
    #[must_use]
    pub const fn units(value: u128) -> Self {
        Self(value * UNIT_SCALE)
    }

    /// `value * 10^(UNIT_DECIMALS - decimals)` raw steps — e.g.
    /// `Uint::base_units(25, 2)` is 0.25 whole units.
    ///
    /// # Panics
    /// Panics if `decimals > UNIT_DECIMALS`; intended for constants and tests.
    #[must_use]
    pub fn base_units(value: u128, decimals: u32) -> Self {
        assert!(decimals <= UNIT_DECIMALS, "decimals beyond unit scale");
        Self(value * 10u128.pow(UNIT_DECIMALS - decimals))
    }

    /// The raw scaled value.
    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.0.checked_mul(rhs.0).map(Self)
    }

    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    #[must_use]
    pub fn min(self, rhs: Self) -> Self {
        Self(self.0.min(rhs.0))
    }

    /// Floor of `self * num / den`.
    ///
    /// Exact (never overflows) whenever `num <= den`, which covers pro-rata
    /// rationing where `num` is the remaining volume and `den` the level
    /// total: the decomposition `a*b/c = (a/c)*b + (a%c)*b/c` keeps every
    /// intermediate within the result's own bound.
    pub fn mul_div(self, num: Self, den: Self) -> Result<Self> {
        if den.is_zero() {
            return Err(EngineError::Overflow("division by zero"));
        }
        let (a, b, c) = (self.0, num.0, den.0);
        let quot = a / c;
        let rem = a % c;
        let high = quot
            .checked_mul(b)
            .ok_or(EngineError::Overflow("mul_div"))?;
        let low = rem.checked_mul(b).ok_or(EngineError::Overflow("mul_div"))? / c;
        high.checked_add(low)
            .map(Self)
            .ok_or(EngineError::Overflow("mul_div"))
    }
}

/// Quote-asset notional of a `(price, quantity)` pair:
/// `price * quantity / UNIT_SCALE`, rounded down.
///
/// Fails with [`EngineError::TooSmallToRepresent`] when the true result
/// floors to zero — recoverable at order submission, fatal if it surfaces
/// mid-settlement.
pub fn quote_notional(price: Uint, quantity: Uint) -> Result<Uint> {
    let product = price
        .0
        .checked_mul(quantity.0)
        .ok_or(EngineError::Overflow("quote notional"))?;
    let notional = product / UNIT_SCALE;
    if notional == 0 {
        return Err(EngineError::TooSmallToRepresent);
    }
    Ok(Uint(notional))
}

impl fmt::Display for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uint {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(u128::from_str(s)?))
    }
}

impl From<u128> for Uint {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

// Amounts cross the wire as decimal strings, the same convention the host
// uses for arbitrary-precision integers.
impl Serialize for Uint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
