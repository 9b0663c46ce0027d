//! # clearex-matcheng
//!
//! **Pure deterministic batch matcher for Clearex.**
//!
//! One matcher clears one market for one block: it takes the market's live
//! orders and produces a single uniform clearing price plus the resulting
//! fills. It has:
//!
//! - **Zero side effects**: no stores, no balances, no events
//! - **Deterministic output**: same orders -> same result on every node,
//!   regardless of enqueue order
//! - **Integer arithmetic only**: fixed-point [`clearex_types::Uint`]
//!   throughout

pub mod curves;
pub mod digest;
pub mod matcher;
pub mod pool;

pub use curves::plot_curves;
pub use digest::{fill_root, verify_fill_root};
pub use matcher::{Fill, MatchResults, Matcher};
pub use pool::MatcherPool;
