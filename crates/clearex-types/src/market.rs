//! Tradable markets.

use serde::{Deserialize, Serialize};

use crate::ids::{Denom, EntityId};

/// An immutable (base, quote) pair. Markets are created by an external
/// authority and are read-only inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: EntityId,
    pub base_denom: Denom,
    pub quote_denom: Denom,
}

impl Market {
    #[must_use]
    pub fn new(id: EntityId, base_denom: impl Into<Denom>, quote_denom: impl Into<Denom>) -> Self {
        Self {
            id,
            base_denom: base_denom.into(),
            quote_denom: quote_denom.into(),
        }
    }

    /// Human-readable pair symbol, e.g. "BTC/USDT".
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{}/{}", self.base_denom, self.quote_denom)
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.pair())
    }
}
