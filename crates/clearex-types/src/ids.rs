//! Identifiers used throughout Clearex.
//!
//! Consensus-relevant entities (orders, markets) carry a monotonically
//! increasing [`EntityId`] assigned exactly once and never reused. Accounts
//! are opaque addresses owned by the host's asset ledger.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Monotonic identifier for orders and markets.
///
/// IDs are assigned by an [`IdSequence`] scoped to one engine (or one
/// registry) instance. `EntityId(0)` is reserved as the "unset" value and is
/// never handed out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl EntityId {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The next identifier in sequence.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this ID has been assigned at all.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// IdSequence
// ---------------------------------------------------------------------------

/// Monotonic ID generator. The first call to [`IdSequence::advance`] yields
/// `EntityId(1)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    #[must_use]
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Allocate the next identifier. Never yields the same ID twice.
    pub fn advance(&mut self) -> EntityId {
        self.last += 1;
        EntityId(self.last)
    }

    /// The most recently allocated identifier, or `EntityId(0)` if none.
    #[must_use]
    pub fn last(&self) -> EntityId {
        EntityId(self.last)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Opaque account address understood by the host's asset ledger.
///
/// The engine itself owns two well-known accounts: the custody account and
/// the fee-collection account (see `EngineConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

/// Type alias for asset denominations (e.g., "BTC", "USDT").
pub type Denom = String;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
