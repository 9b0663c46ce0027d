//! Error types for the Clearex clearing engine.
//!
//! All errors use the `CLX_ERR_` prefix convention for easy grepping in
//! logs. Codes are grouped by subsystem:
//! - 1xx: submission / lookup errors (recoverable, caller-visible)
//! - 2xx: funds and escrow errors
//! - 9xx: fatal / internal errors
//!
//! Two tiers exist. **Recoverable** errors occur only at order submission or
//! cancellation, before any state mutation, and are reported back to the
//! submitter. **Fatal** errors indicate a broken invariant — the only safe
//! response is aborting the current block, so they propagate up through the
//! tick call chain untouched. [`EngineError::fatal`] escalates a recoverable
//! error that surfaced in a context where it can only mean a prior
//! consensus-breaking bug (e.g. a missing order mid-settlement).

use thiserror::Error;

use crate::ids::Denom;
use crate::uint::Uint;

/// Central error enum for all engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    // =================================================================
    // Submission / lookup errors (1xx)
    // =================================================================
    /// The referenced entity does not exist.
    #[error("CLX_ERR_100: not found: {0}")]
    NotFound(String),

    /// An entity with this ID already exists (implies a sequence bug).
    #[error("CLX_ERR_101: already exists: {0}")]
    AlreadyExists(String),

    /// The request failed validation (zero quantity, bad time-in-force, ...).
    #[error("CLX_ERR_102: invalid argument: {0}")]
    InvalidArgument(String),

    /// A price/quantity pair whose notional rounds to zero.
    #[error("CLX_ERR_103: quantity too small to represent")]
    TooSmallToRepresent,

    /// Integer arithmetic overflowed.
    #[error("CLX_ERR_104: arithmetic overflow in {0}")]
    Overflow(&'static str),

    // =================================================================
    // Funds / escrow errors (2xx)
    // =================================================================
    /// Not enough unlocked balance to back the operation.
    #[error("CLX_ERR_200: insufficient funds: need {needed} {denom}, have {available}")]
    InsufficientFunds {
        denom: Denom,
        needed: Uint,
        available: Uint,
    },

    /// An unfreeze exceeded the frozen tally. Never expected; fatal.
    #[error("CLX_ERR_201: frozen balance underflow for {denom}")]
    FrozenUnderflow { denom: Denom },

    /// A freeze would push the frozen tally past custody. Fatal.
    #[error("CLX_ERR_202: frozen {frozen} would exceed custody {custody} for {denom}")]
    FrozenExceedsCustody {
        denom: Denom,
        frozen: Uint,
        custody: Uint,
    },

    /// A payout would dip into frozen collateral. Fatal.
    #[error("CLX_ERR_203: custody shortfall for {denom}: unfrozen {unfrozen}, requested {requested}")]
    CustodyShortfall {
        denom: Denom,
        unfrozen: Uint,
        requested: Uint,
    },

    // =================================================================
    // Fatal / internal (9xx)
    // =================================================================
    /// A recoverable error surfaced where it can only mean a broken
    /// invariant. Aborts the remainder of block execution.
    #[error("CLX_ERR_900: fatal: {context}: {source}")]
    Fatal {
        context: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Escalate to the fatal tier, recording where the condition surfaced.
    /// Already-fatal errors keep their original context.
    #[must_use]
    pub fn fatal(self, context: impl Into<String>) -> Self {
        if self.is_fatal() {
            return self;
        }
        Self::Fatal {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error must abort the current block.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FrozenUnderflow { .. }
                | Self::FrozenExceedsCustody { .. }
                | Self::CustodyShortfall { .. }
                | Self::Fatal { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EngineError>;
