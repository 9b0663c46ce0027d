//! # clearex-ledger
//!
//! Custody for the Clearex engine:
//!
//! - [`AssetLedger`] — the boundary to the host's token ledger, with an
//!   in-memory implementation for tests and single-process hosts
//! - [`EscrowLedger`] — the frozen-collateral tally guarding every payout
//! - [`MarketRegistry`] — the authority-owned set of tradable pairs

pub mod assets;
pub mod escrow;
pub mod registry;

pub use assets::{AssetLedger, MemoryAssetLedger};
pub use escrow::EscrowLedger;
pub use registry::MarketRegistry;
