//! The escrow ledger.
//!
//! Collateral backing a live order is held in the engine's custody account
//! and recorded in a per-denomination frozen tally. The pair
//! (custody balance, frozen tally) is the escrow balance of the data model,
//! with the invariant `frozen <= custodial` between ticks.
//!
//! The tally is the guard on every payout: [`EscrowLedger::pay_out`] only
//! spends the unfrozen remainder of custody, so no operation can ever
//! touch collateral that still backs a resting order. The ledger is
//! constructed once at engine initialization and threaded through every
//! call together with the asset-ledger handle.

use std::collections::BTreeMap;

use clearex_types::{AccountId, Denom, EngineError, Result, Uint};

use crate::assets::AssetLedger;

#[derive(Debug)]
pub struct EscrowLedger {
    custody: AccountId,
    frozen: BTreeMap<Denom, Uint>,
}

impl EscrowLedger {
    #[must_use]
    pub fn new(custody: AccountId) -> Self {
        Self {
            custody,
            frozen: BTreeMap::new(),
        }
    }

    /// The custody account this ledger guards.
    #[must_use]
    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    /// Frozen collateral tally for `denom`.
    #[must_use]
    pub fn frozen_total(&self, denom: &str) -> Uint {
        self.frozen.get(denom).copied().unwrap_or(Uint::ZERO)
    }

    /// Custody account balance for `denom`.
    #[must_use]
    pub fn custodial_total<A: AssetLedger>(&self, assets: &A, denom: &str) -> Uint {
        assets.balance(&self.custody, denom)
    }

    /// Move `amount` from the submitter into custody and freeze it. The
    /// canonical entry path: funds are frozen the instant they are
    /// received, never resting unfrozen in custody.
    pub fn receive_and_freeze<A: AssetLedger>(
        &mut self,
        assets: &mut A,
        from: &AccountId,
        denom: &str,
        amount: Uint,
    ) -> Result<()> {
        assets.transfer(from, &self.custody, denom, amount)?;
        self.freeze(assets, denom, amount)
    }

    /// Raise the frozen tally. Fails if the tally would exceed custody.
    pub fn freeze<A: AssetLedger>(&mut self, assets: &A, denom: &str, amount: Uint) -> Result<()> {
        let frozen = self
            .frozen_total(denom)
            .checked_add(amount)
            .ok_or(EngineError::Overflow("frozen tally"))?;
        let custody = self.custodial_total(assets, denom);
        if frozen > custody {
            return Err(EngineError::FrozenExceedsCustody {
                denom: denom.to_string(),
                frozen,
                custody,
            });
        }
        self.frozen.insert(denom.to_string(), frozen);
        Ok(())
    }

    /// Lower the frozen tally. An underflow here means some collateral was
    /// released twice — a broken invariant, reported as fatal.
    pub fn unfreeze(&mut self, denom: &str, amount: Uint) -> Result<()> {
        let frozen = self
            .frozen_total(denom)
            .checked_sub(amount)
            .ok_or(EngineError::FrozenUnderflow {
                denom: denom.to_string(),
            })?;
        self.frozen.insert(denom.to_string(), frozen);
        Ok(())
    }

    /// Pay `amount` out of custody, but only from its unfrozen remainder —
    /// frozen collateral is untouchable by any payout.
    pub fn pay_out<A: AssetLedger>(
        &mut self,
        assets: &mut A,
        to: &AccountId,
        denom: &str,
        amount: Uint,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let custody = self.custodial_total(assets, denom);
        let unfrozen = custody.saturating_sub(self.frozen_total(denom));
        if amount > unfrozen {
            return Err(EngineError::CustodyShortfall {
                denom: denom.to_string(),
                unfrozen,
                requested: amount,
            });
        }
        assets.transfer(&self.custody, to, denom, amount)
    }

    /// Release `amount` of frozen collateral back to its owner: the
    /// cancellation and expiry path.
    pub fn unfreeze_and_return<A: AssetLedger>(
        &mut self,
        assets: &mut A,
        to: &AccountId,
        denom: &str,
        amount: Uint,
    ) -> Result<()> {
        self.unfreeze(denom, amount)?;
        self.pay_out(assets, to, denom, amount)
    }
}
