//! The resting limit order.
//!
//! `quantity` is the remaining unfilled amount and is the only mutable
//! field: it shrinks on partial fills, and the order is deleted outright on
//! full fill, cancellation, or time-in-force expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::ids::{AccountId, EntityId};
use crate::uint::Uint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: EntityId,
    pub owner: AccountId,
    pub market_id: EntityId,
    pub direction: Direction,
    /// Limit price, quote-per-base. Immutable.
    pub price: Uint,
    /// Remaining unfilled base quantity.
    pub quantity: Uint,
    /// Maximum lifetime in blocks. Immutable.
    pub time_in_force: u16,
    pub created_block: u64,
    pub created_time: DateTime<Utc>,
}

impl Order {
    /// Whether the order has outlived its time-in-force at `height`:
    /// an order created at block `H` with TIF `T` is live through `H + T`
    /// and expired from `H + T + 1` on.
    #[must_use]
    pub fn is_expired_at(&self, height: u64) -> bool {
        height.saturating_sub(self.created_block) > u64::from(self.time_in_force)
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.quantity.is_zero()
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(direction: Direction, price: Uint, quantity: Uint) -> Self {
        Self {
            id: EntityId(1),
            owner: AccountId::from("tester"),
            market_id: EntityId(1),
            direction,
            price,
            quantity,
            time_in_force: 10,
            created_block: 1,
            created_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tif_boundary() {
        let mut order = Order::dummy(Direction::Bid, Uint::units(3), Uint::units(10));
        order.created_block = 5;
        order.time_in_force = 2;
        assert!(!order.is_expired_at(7), "live through H + T");
        assert!(order.is_expired_at(8), "expired at H + T + 1");
    }

    #[test]
    fn expiry_never_underflows() {
        let order = Order::dummy(Direction::Ask, Uint::units(1), Uint::units(1));
        // created_block = 1; a height below creation must not wrap.
        assert!(!order.is_expired_at(0));
    }

    #[test]
    fn filled_when_quantity_zero() {
        let mut order = Order::dummy(Direction::Bid, Uint::units(1), Uint::units(2));
        assert!(!order.is_filled());
        order.quantity = Uint::ZERO;
        assert!(order.is_filled());
    }

    #[test]
    fn serde_roundtrip() {
        let order = Order::dummy(Direction::Ask, Uint::units(7), Uint::units(3));
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
