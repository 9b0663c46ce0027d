//! Aggregated order-book depth.

use serde::{Deserialize, Serialize};

use crate::uint::Uint;

/// One entry of a cumulative depth curve: the quantity executable at
/// `price` — demand for bids (all volume priced at or above), supply for
/// asks (all volume priced at or below). Display-only; clearing never
/// depends on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: Uint,
    pub quantity: Uint,
}

impl PricePoint {
    #[must_use]
    pub fn new(price: Uint, quantity: Uint) -> Self {
        Self { price, quantity }
    }
}
