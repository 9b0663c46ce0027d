//! Governance-configured settlement fee.
//!
//! The fee is a deterministic proportional schedule expressed as an integer
//! ratio. For a given amount the fee is
//! `amount * numerator / denominator - amount`, so a numerator of 1004 over
//! a denominator of 1000 charges 0.4%. A zero denominator denotes a zero
//! fee.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::uint::Uint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub numerator: u128,
    pub denominator: u128,
}

impl FeeSchedule {
    /// Build a schedule from an integer ratio. The ratio must be at least
    /// one (a fee can never be negative).
    pub fn new(numerator: u128, denominator: u128) -> Result<Self> {
        if denominator != 0 && numerator < denominator {
            return Err(EngineError::InvalidArgument(
                "fee ratio below one".to_string(),
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// A schedule that charges nothing.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: 0,
        }
    }

    /// Parse a decimal rate string: `"0.004"` becomes 1004/1000.
    ///
    /// The denominator is the smallest power of ten expressing the rate
    /// exactly; the numerator is the scaled ratio `1 + rate`.
    pub fn from_percent_str(rate: &str) -> Result<Self> {
        let rate = Decimal::from_str(rate)
            .map_err(|err| EngineError::InvalidArgument(format!("fee rate: {err}")))?;
        if rate.is_sign_negative() {
            return Err(EngineError::InvalidArgument(
                "fee rate cannot be negative".to_string(),
            ));
        }
        if rate.is_zero() {
            return Ok(Self::zero());
        }

        let ratio = (rate + Decimal::ONE).normalize();
        let scale = ratio.scale();
        let denominator = 10u128
            .checked_pow(scale)
            .ok_or(EngineError::Overflow("fee denominator"))?;
        let numerator = u128::try_from(ratio.mantissa())
            .map_err(|_| EngineError::InvalidArgument("fee rate out of range".to_string()))?;
        Self::new(numerator, denominator)
    }

    /// The fee charged on `amount`. Deterministic, rounds the gross amount
    /// down, so small amounts can legitimately carry a zero fee.
    pub fn fee_on(&self, amount: Uint) -> Result<Uint> {
        if self.denominator == 0 {
            return Ok(Uint::ZERO);
        }
        let gross = amount.mul_div(Uint::new(self.numerator), Uint::new(self.denominator))?;
        gross
            .checked_sub(amount)
            .ok_or(EngineError::Overflow("fee on amount"))
    }
}

impl Default for FeeSchedule {
    /// The chain default: 0.4%.
    fn default() -> Self {
        Self {
            numerator: 1004,
            denominator: 1000,
        }
    }
}
