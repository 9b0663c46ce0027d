//! The asset-ledger boundary.
//!
//! The engine never creates or destroys tokens; it only moves them between
//! accounts of the host's ledger — submitters, its own custody account, and
//! the fee collector. [`AssetLedger`] is that seam. [`MemoryAssetLedger`]
//! is the in-process implementation backing tests and single-process hosts.

use std::collections::BTreeMap;

use clearex_types::{AccountId, Denom, EngineError, Result, Uint};

/// Moves funds between accounts. Implementations must be synchronous and
/// all-or-nothing: a failed transfer leaves every balance untouched.
pub trait AssetLedger {
    /// Move `amount` of `denom` from `from` to `to`.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, denom: &str, amount: Uint)
    -> Result<()>;

    /// Current balance of `account` in `denom`; zero when unknown.
    fn balance(&self, account: &AccountId, denom: &str) -> Uint;
}

/// Deterministic in-memory asset ledger.
#[derive(Debug, Default)]
pub struct MemoryAssetLedger {
    balances: BTreeMap<(AccountId, Denom), Uint>,
}

impl MemoryAssetLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air. Host-side issuance; the engine
    /// itself never calls this.
    pub fn deposit(&mut self, account: &AccountId, denom: &str, amount: Uint) {
        let entry = self
            .balances
            .entry((account.clone(), denom.to_string()))
            .or_insert(Uint::ZERO);
        *entry = entry.checked_add(amount).expect("deposit overflow");
    }

    /// Total of `denom` across all accounts.
    #[must_use]
    pub fn total_supply(&self, denom: &str) -> Uint {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .fold(Uint::ZERO, |acc, (_, amount)| {
                acc.checked_add(*amount).expect("supply overflow")
            })
    }
}

impl AssetLedger for MemoryAssetLedger {
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        denom: &str,
        amount: Uint,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let available = self.balance(from, denom);
        let debited = available
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientFunds {
                denom: denom.to_string(),
                needed: amount,
                available,
            })?;

        self.balances
            .insert((from.clone(), denom.to_string()), debited);
        let credit = self
            .balances
            .entry((to.clone(), denom.to_string()))
            .or_insert(Uint::ZERO);
        *credit = credit
            .checked_add(amount)
            .ok_or(EngineError::Overflow("transfer credit"))?;
        Ok(())
    }

    fn balance(&self, account: &AccountId, denom: &str) -> Uint {
        self.balances
            .get(&(account.clone(), denom.to_string()))
            .copied()
            .unwrap_or(Uint::ZERO)
    }
}
