//! Clearing-outcome digests for cross-node diagnostics.
//!
//! Every node clearing the same market from the same book must produce the
//! same fills at the same price. The fill root condenses one market's
//! clearing outcome into a single hash so operators can compare nodes
//! without shipping full payloads. Diagnostic only — consensus never reads
//! it.

use clearex_types::{EntityId, Uint};
use sha2::{Digest, Sha256};

use crate::matcher::Fill;

/// Deterministic hash over one market's clearing outcome.
#[must_use]
pub fn fill_root(market_id: EntityId, clearing_price: Uint, fills: &[Fill]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"clearex:fill_root:v1:");
    hasher.update(market_id.0.to_le_bytes());
    hasher.update(clearing_price.raw().to_le_bytes());
    hasher.update((fills.len() as u64).to_le_bytes());

    for fill in fills {
        hasher.update(fill.order_id.0.to_le_bytes());
        hasher.update(fill.qty_filled.raw().to_le_bytes());
        hasher.update(fill.qty_unfilled.raw().to_le_bytes());
    }

    let digest = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&digest);
    root
}

/// Recompute and compare.
#[must_use]
pub fn verify_fill_root(
    market_id: EntityId,
    clearing_price: Uint,
    fills: &[Fill],
    expected: &[u8; 32],
) -> bool {
    fill_root(market_id, clearing_price, fills) == *expected
}
