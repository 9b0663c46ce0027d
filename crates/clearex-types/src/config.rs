//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{EngineError, Result};
use crate::fee::FeeSchedule;
use crate::ids::AccountId;

/// Governance-supplied parameters, fixed for the lifetime of one engine
/// instance. Changing any of these between nodes is consensus-breaking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Proportional settlement fee.
    pub fee: FeeSchedule,
    /// Module account holding escrowed collateral.
    pub custody_account: AccountId,
    /// Module account receiving settlement fees.
    pub fee_collector: AccountId,
    /// Upper bound on order time-in-force, in blocks.
    pub max_time_in_force: u16,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.custody_account == self.fee_collector {
            return Err(EngineError::InvalidArgument(
                "custody and fee accounts must differ".to_string(),
            ));
        }
        if self.max_time_in_force == 0 {
            return Err(EngineError::InvalidArgument(
                "max time-in-force must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee: FeeSchedule::default(),
            custody_account: AccountId::from(constants::DEFAULT_CUSTODY_ACCOUNT),
            fee_collector: AccountId::from(constants::DEFAULT_FEE_COLLECTOR_ACCOUNT),
            max_time_in_force: constants::MAX_TIME_IN_FORCE,
        }
    }
}
