//! # clearex-types
//!
//! Shared types, errors, and configuration for the **Clearex** clearing
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`EntityId`], [`IdSequence`], [`AccountId`], [`Denom`]
//! - **Amounts**: [`Uint`] (unsigned 8-decimal fixed point), [`quote_notional`]
//! - **Order model**: [`Order`], [`Direction`]
//! - **Market model**: [`Market`]
//! - **Depth model**: [`PricePoint`]
//! - **Block model**: [`BlockContext`]
//! - **Fee model**: [`FeeSchedule`]
//! - **Events**: [`EngineEvent`], [`EventSink`], [`MemoryEventBus`]
//! - **Errors**: [`EngineError`] with `CLX_ERR_` prefix codes
//! - **Configuration**: [`EngineConfig`]
//! - **Constants**: scale, limits and defaults

pub mod block;
pub mod config;
pub mod constants;
pub mod depth;
pub mod direction;
pub mod error;
pub mod events;
pub mod fee;
pub mod ids;
pub mod market;
pub mod order;
pub mod uint;

// Re-export all primary types at crate root for ergonomic imports:
//   use clearex_types::{Order, Direction, Uint, EngineError, ...};

pub use block::*;
pub use config::*;
pub use depth::*;
pub use direction::*;
pub use error::*;
pub use events::*;
pub use fee::*;
pub use ids::*;
pub use market::*;
pub use order::*;
pub use uint::*;

// Constants are accessed via `clearex_types::constants::FOO`
// (not re-exported to avoid name collisions).
