//! Order submission and cancellation.
//!
//! `post` escrows the full commitment before the order exists: quote
//! notional for bids, base quantity for asks. `cancel` is the exact
//! inverse. Both are recoverable operations — they fail before any state
//! mutation and report to the submitter.

use clearex_ledger::AssetLedger;
use clearex_types::{
    AccountId, BlockContext, Denom, Direction, EngineError, EntityId, EventSink, Market, Order,
    Result, Uint,
    events::{EngineEvent, OrderCancelled, OrderCreated},
    quote_notional,
};

use crate::Engine;

impl<A: AssetLedger, E: EventSink> Engine<A, E> {
    /// Validate, escrow and store a new limit order.
    pub fn post(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountId,
        market_id: EntityId,
        direction: Direction,
        price: Uint,
        quantity: Uint,
        time_in_force: u16,
    ) -> Result<Order> {
        let market = self.markets.get(market_id)?;

        if price.is_zero() || quantity.is_zero() {
            return Err(EngineError::InvalidArgument(
                "price and quantity must be positive".to_string(),
            ));
        }
        if time_in_force == 0 || time_in_force > self.config.max_time_in_force {
            return Err(EngineError::InvalidArgument(format!(
                "time-in-force must be in 1..={}",
                self.config.max_time_in_force
            )));
        }

        let (denom, commitment) = escrow_commitment(&market, direction, price, quantity)?;
        self.escrow
            .receive_and_freeze(&mut self.assets, owner, &denom, commitment)?;

        let order = Order {
            id: self.ids.advance(),
            owner: owner.clone(),
            market_id,
            direction,
            price,
            quantity,
            time_in_force,
            created_block: ctx.height,
            created_time: ctx.time,
        };
        // A collision here can only mean the ID sequence regressed.
        self.store
            .insert(order.clone())
            .map_err(|err| err.fatal("order id reused"))?;

        tracing::info!(
            order = %order.id,
            market = %market.pair(),
            direction = %direction,
            price = %price,
            quantity = %quantity,
            "order posted"
        );

        self.events.publish(EngineEvent::OrderCreated(OrderCreated {
            id: order.id,
            owner: order.owner.clone(),
            market_id: order.market_id,
            direction: order.direction,
            price: order.price,
            quantity: order.quantity,
            time_in_force: order.time_in_force,
            created_block: order.created_block,
            created_time: order.created_time,
        }));

        Ok(order)
    }

    /// Return a live order's escrow and delete it.
    pub fn cancel(&mut self, order_id: EntityId) -> Result<()> {
        let order = self.store.get(order_id)?;
        let market = self
            .markets
            .get(order.market_id)
            .map_err(|err| err.fatal("market missing for live order"))?;

        let (denom, remaining) =
            escrow_commitment(&market, order.direction, order.price, order.quantity)?;
        self.escrow
            .unfreeze_and_return(&mut self.assets, &order.owner, &denom, remaining)?;
        self.store.remove(order.id)?;

        tracing::info!(order = %order.id, "order cancelled");
        self.events
            .publish(EngineEvent::OrderCancelled(OrderCancelled { order_id }));
        Ok(())
    }
}

/// The collateral a live order locks: its full quote notional for bids,
/// its base quantity for asks.
pub(crate) fn escrow_commitment(
    market: &Market,
    direction: Direction,
    price: Uint,
    quantity: Uint,
) -> Result<(Denom, Uint)> {
    match direction {
        Direction::Bid => Ok((
            market.quote_denom.clone(),
            quote_notional(price, quantity)?,
        )),
        Direction::Ask => Ok((market.base_denom.clone(), quantity)),
    }
}

#[cfg(test)]
mod tests {
    use clearex_ledger::{MarketRegistry, MemoryAssetLedger};
    use clearex_types::{EngineConfig, MemoryEventBus};

    use super::*;

    fn new_engine() -> Engine<MemoryAssetLedger, MemoryEventBus> {
        let mut markets = MarketRegistry::new();
        markets.create("BTC", "USDT");
        Engine::new(
            MemoryAssetLedger::new(),
            MemoryEventBus::new(),
            markets,
            EngineConfig::default(),
        )
        .unwrap()
    }

    fn ctx() -> BlockContext {
        BlockContext::new(1, chrono::DateTime::UNIX_EPOCH)
    }

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    #[test]
    fn bid_escrows_quote_notional() {
        let mut engine = new_engine();
        engine.assets_mut().deposit(&alice(), "USDT", Uint::units(100));

        let order = engine
            .post(
                &ctx(),
                &alice(),
                EntityId(1),
                Direction::Bid,
                Uint::units(3),
                Uint::units(10),
                10,
            )
            .unwrap();

        assert_eq!(order.id, EntityId(1));
        assert_eq!(engine.assets().balance(&alice(), "USDT"), Uint::units(70));
        assert_eq!(engine.escrow().frozen_total("USDT"), Uint::units(30));
        assert_eq!(engine.open_orders(), 1);
        assert_eq!(engine.events().len(), 1);
    }

    #[test]
    fn ask_escrows_base_quantity() {
        let mut engine = new_engine();
        engine.assets_mut().deposit(&alice(), "BTC", Uint::units(5));

        engine
            .post(
                &ctx(),
                &alice(),
                EntityId(1),
                Direction::Ask,
                Uint::units(3),
                Uint::units(5),
                10,
            )
            .unwrap();

        assert_eq!(engine.assets().balance(&alice(), "BTC"), Uint::ZERO);
        assert_eq!(engine.escrow().frozen_total("BTC"), Uint::units(5));
    }

    #[test]
    fn unknown_market_rejected() {
        let mut engine = new_engine();
        let err = engine
            .post(
                &ctx(),
                &alice(),
                EntityId(9),
                Direction::Bid,
                Uint::units(1),
                Uint::units(1),
                10,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn insufficient_funds_rejected_without_side_effects() {
        let mut engine = new_engine();
        engine.assets_mut().deposit(&alice(), "USDT", Uint::units(5));

        let err = engine
            .post(
                &ctx(),
                &alice(),
                EntityId(1),
                Direction::Bid,
                Uint::units(3),
                Uint::units(10),
                10,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        assert_eq!(engine.assets().balance(&alice(), "USDT"), Uint::units(5));
        assert_eq!(engine.open_orders(), 0);
        assert!(engine.events().is_empty());
    }

    #[test]
    fn dust_notional_rejected() {
        let mut engine = new_engine();
        engine.assets_mut().deposit(&alice(), "USDT", Uint::units(1));

        let err = engine
            .post(
                &ctx(),
                &alice(),
                EntityId(1),
                Direction::Bid,
                Uint::new(1),
                Uint::new(1),
                10,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::TooSmallToRepresent));
        assert_eq!(engine.open_orders(), 0);
    }

    #[test]
    fn time_in_force_bounds() {
        let mut engine = new_engine();
        engine.assets_mut().deposit(&alice(), "USDT", Uint::units(100));

        for tif in [0u16, clearex_types::constants::MAX_TIME_IN_FORCE + 1] {
            let err = engine
                .post(
                    &ctx(),
                    &alice(),
                    EntityId(1),
                    Direction::Bid,
                    Uint::units(1),
                    Uint::units(1),
                    tif,
                )
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidArgument(_)), "tif {tif}");
        }
    }

    #[test]
    fn cancel_returns_escrow() {
        let mut engine = new_engine();
        engine.assets_mut().deposit(&alice(), "USDT", Uint::units(100));

        let order = engine
            .post(
                &ctx(),
                &alice(),
                EntityId(1),
                Direction::Bid,
                Uint::units(3),
                Uint::units(10),
                10,
            )
            .unwrap();
        engine.cancel(order.id).unwrap();

        assert_eq!(engine.assets().balance(&alice(), "USDT"), Uint::units(100));
        assert_eq!(engine.escrow().frozen_total("USDT"), Uint::ZERO);
        assert_eq!(engine.open_orders(), 0);

        let events = engine.events_mut().drain();
        assert!(matches!(events[1], EngineEvent::OrderCancelled(_)));
    }

    #[test]
    fn cancel_unknown_order() {
        let mut engine = new_engine();
        let err = engine.cancel(EntityId(42)).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
