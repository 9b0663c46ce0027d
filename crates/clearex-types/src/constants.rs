//! System-wide constants for the Clearex clearing engine.

/// Implied decimal places shared by every price and quantity.
pub const UNIT_DECIMALS: u32 = 8;

/// Scale factor corresponding to [`UNIT_DECIMALS`]: one whole unit in raw
/// fixed-point steps.
pub const UNIT_SCALE: u128 = 100_000_000;

/// Maximum order lifetime in blocks.
pub const MAX_TIME_IN_FORCE: u16 = 600;

/// Default name of the module account holding escrowed collateral.
pub const DEFAULT_CUSTODY_ACCOUNT: &str = "clearex/custody";

/// Default name of the module account collecting settlement fees.
pub const DEFAULT_FEE_COLLECTOR_ACCOUNT: &str = "clearex/fee_collector";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Clearex";
