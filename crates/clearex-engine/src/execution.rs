//! The per-block execution hook.
//!
//! `tick` runs once per consensus block, after transaction processing:
//! expire stale orders, clear every market through a fresh batch matcher,
//! publish the clearing outcomes, settle every fill. Sequential throughout;
//! the escrow ledger and order store are touched by nothing else while it
//! runs.
//!
//! Settlement runs in two passes. Payouts to one side are funded by the
//! other side's escrow, so the spent escrow of *every* fill is unfrozen
//! first; only then are payouts distributed. This keeps the payout guard
//! intact — custody never dips into collateral that still backs a live
//! order — while the cross-funding between the two sides balances out.
//!
//! Any error escaping `tick` is fatal: it can only follow a prior
//! consensus-breaking bug, and the host must abort the block.

use std::collections::BTreeMap;
use std::time::Instant;

use clearex_ledger::AssetLedger;
use clearex_matcheng::{Fill, MatchResults, Matcher, fill_root};
use clearex_types::{
    BlockContext, Direction, EngineError, EntityId, EventSink, Result, Uint,
    events::{Batch, EngineEvent, Fill as FillEvent},
    quote_notional,
};

use crate::Engine;

impl<A: AssetLedger, E: EventSink> Engine<A, E> {
    /// The block hook: expire, clear, publish, settle.
    pub fn tick(&mut self, ctx: &BlockContext) -> Result<()> {
        let started = Instant::now();

        self.expire_orders(ctx)?;
        let outcomes = self.clear_markets(ctx)?;

        // Pass one: release the escrow each fill spends.
        for (_, results) in &outcomes {
            for fill in &results.fills {
                self.release_fill_escrow(fill)?;
            }
        }

        // Pass two: distribute payouts and shrink or delete the orders.
        let mut fill_count = 0usize;
        for (_, results) in &outcomes {
            for fill in &results.fills {
                self.execute_fill(ctx, results.clearing_price, fill)?;
                fill_count += 1;
            }
        }
        tracing::info!(count = fill_count, "matched orders");

        // Diagnostics only — wall-clock duration never touches consensus
        // state.
        self.metrics.observe_tick(started.elapsed(), fill_count);
        Ok(())
    }

    /// Cancel every order that has outlived its time-in-force.
    fn expire_orders(&mut self, ctx: &BlockContext) -> Result<()> {
        let mut expired = Vec::new();
        self.store.iterate(|order| {
            if order.is_expired_at(ctx.height) {
                expired.push(order.id);
            }
            true
        });

        for id in &expired {
            self.cancel(*id)
                .map_err(|err| err.fatal("cancelling expired order"))?;
        }
        tracing::info!(count = expired.len(), "cancelled expired orders");
        Ok(())
    }

    /// Group live orders by market, run one matcher per market, publish a
    /// batch per clearing. Markets clear in ascending ID order so every
    /// node emits the same event sequence.
    fn clear_markets(&mut self, ctx: &BlockContext) -> Result<Vec<(EntityId, MatchResults)>> {
        let mut matchers: BTreeMap<EntityId, Matcher> = BTreeMap::new();
        let Self { store, pool, .. } = self;
        store.iterate_rev(|order| {
            matchers
                .entry(order.market_id)
                .or_insert_with(|| pool.acquire())
                .enqueue_order(order.direction, order.id, order.price, order.quantity);
            true
        });

        let mut outcomes = Vec::new();
        for (market_id, matcher) in matchers {
            let results = matcher
                .match_orders()
                .map_err(|err| err.fatal("matching market"))?;
            self.pool.release(matcher);

            let Some(results) = results else { continue };

            let root = fill_root(market_id, results.clearing_price, &results.fills);
            tracing::debug!(
                market = %market_id,
                clearing_price = %results.clearing_price,
                volume = %results.volume,
                fill_root = hex::encode(root),
                "market cleared"
            );

            self.events.publish(EngineEvent::Batch(Batch {
                block_number: ctx.height,
                block_time: ctx.time,
                market_id,
                clearing_price: results.clearing_price,
                bids: results.bid_aggregates.clone(),
                asks: results.ask_aggregates.clone(),
            }));
            outcomes.push((market_id, results));
        }
        Ok(outcomes)
    }

    /// Unfreeze the collateral one fill consumes: the bid's quote notional
    /// at its own limit price, or the ask's base quantity.
    fn release_fill_escrow(&mut self, fill: &Fill) -> Result<()> {
        let order = self
            .store
            .get(fill.order_id)
            .map_err(|err| err.fatal("loading filled order"))?;
        let market = self
            .markets
            .get(order.market_id)
            .map_err(|err| err.fatal("loading market for fill"))?;

        let (denom, spent) = match order.direction {
            Direction::Bid => (
                market.quote_denom,
                quote_notional(order.price, fill.qty_filled)
                    .map_err(|err| err.fatal("converting spent bid escrow"))?,
            ),
            Direction::Ask => (market.base_denom, fill.qty_filled),
        };
        self.escrow.unfreeze(&denom, spent)
    }

    /// Pay out one fill at the uniform clearing price, then persist the
    /// reduced order (or delete it when fully filled).
    fn execute_fill(&mut self, ctx: &BlockContext, clearing_price: Uint, fill: &Fill) -> Result<()> {
        let mut order = self
            .store
            .get(fill.order_id)
            .map_err(|err| err.fatal("loading filled order"))?;
        let market = self
            .markets
            .get(order.market_id)
            .map_err(|err| err.fatal("loading market for fill"))?;

        let fee = self
            .config
            .fee
            .fee_on(fill.qty_filled)
            .map_err(|err| err.fatal("computing settlement fee"))?;

        match order.direction {
            Direction::Bid => {
                // Filled base quantity, less the fee, to the bidder.
                let payout = fill
                    .qty_filled
                    .checked_sub(fee)
                    .ok_or(EngineError::Overflow("bid payout"))
                    .map_err(|err| err.fatal("fee exceeds filled quantity"))?;
                self.escrow
                    .pay_out(&mut self.assets, &order.owner, &market.base_denom, payout)?;
                self.escrow.pay_out(
                    &mut self.assets,
                    &self.config.fee_collector,
                    &market.base_denom,
                    fee,
                )?;

                // Price improvement: the bid escrowed at its limit but
                // cleared lower, so the difference flows back.
                if clearing_price < order.price {
                    let delta = order.price.saturating_sub(clearing_price);
                    match quote_notional(delta, fill.qty_filled) {
                        Ok(refund) => self.escrow.pay_out(
                            &mut self.assets,
                            &order.owner,
                            &market.quote_denom,
                            refund,
                        )?,
                        Err(EngineError::TooSmallToRepresent) => {
                            tracing::info!(
                                order = %order.id,
                                qty_filled = %fill.qty_filled,
                                price_delta = %delta,
                                "refund amount too small"
                            );
                        }
                        Err(err) => return Err(err.fatal("computing price-improvement refund")),
                    }
                }
            }
            Direction::Ask => {
                let quote_amount = quote_notional(clearing_price, fill.qty_filled)
                    .map_err(|err| err.fatal("clearing price too small to represent"))?;
                let payout = quote_amount
                    .checked_sub(fee)
                    .filter(|amount| !amount.is_zero())
                    .ok_or(EngineError::Overflow("ask payout"))
                    .map_err(|err| err.fatal("ask payout not positive after fee"))?;
                self.escrow
                    .pay_out(&mut self.assets, &order.owner, &market.quote_denom, payout)?;
                self.escrow.pay_out(
                    &mut self.assets,
                    &self.config.fee_collector,
                    &market.quote_denom,
                    fee,
                )?;
            }
        }

        order.quantity = fill.qty_unfilled;
        if order.quantity.is_zero() {
            tracing::info!(order = %order.id, "order completely filled");
            self.store
                .remove(order.id)
                .map_err(|err| err.fatal("removing filled order"))?;
        } else {
            tracing::info!(order = %order.id, "order partially filled");
            self.store
                .update(order.clone())
                .map_err(|err| err.fatal("persisting partial fill"))?;
        }

        self.events.publish(EngineEvent::Fill(FillEvent {
            order_id: order.id,
            market_id: market.id,
            owner: order.owner.clone(),
            pair: market.pair(),
            direction: order.direction,
            qty_filled: fill.qty_filled,
            qty_unfilled: fill.qty_unfilled,
            block_number: ctx.height,
            block_time: ctx.time,
            price: clearing_price,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clearex_ledger::{MarketRegistry, MemoryAssetLedger};
    use clearex_types::{AccountId, EngineConfig, MemoryEventBus};

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

    fn ctx(height: u64) -> BlockContext {
        BlockContext::new(height, chrono::DateTime::UNIX_EPOCH)
    }

    #[test]
    fn empty_tick_is_idempotent() {
        let mut engine = new_engine();
        engine.tick(&ctx(1)).unwrap();
        engine.tick(&ctx(2)).unwrap();
        assert!(engine.events().is_empty());
        assert_eq!(engine.open_orders(), 0);
    }

    #[test]
    fn tif_boundary() {
        let mut engine = new_engine();
        let alice = AccountId::from("alice");
        engine.assets_mut().deposit(&alice, "USDT", Uint::units(100));

        let order = engine
            .post(
                &ctx(5),
                &alice,
                EntityId(1),
                Direction::Bid,
                Uint::units(2),
                Uint::units(10),
                2,
            )
            .unwrap();
        engine.events_mut().drain();

        // Live through H + T.
        engine.tick(&ctx(7)).unwrap();
        assert!(engine.order(order.id).is_ok());
        assert!(engine.events().is_empty());

        // Expired at H + T + 1, never matched.
        engine.tick(&ctx(8)).unwrap();
        assert!(engine.order(order.id).is_err());
        assert_eq!(engine.assets().balance(&alice, "USDT"), Uint::units(100));
        assert_eq!(engine.escrow().frozen_total("USDT"), Uint::ZERO);

        let events = engine.events_mut().drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EngineEvent::OrderCancelled(_)));
    }

    #[test]
    fn non_crossing_book_emits_nothing() {
        let mut engine = new_engine();
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        engine.assets_mut().deposit(&alice, "USDT", Uint::units(100));
        engine.assets_mut().deposit(&bob, "BTC", Uint::units(10));

        engine
            .post(
                &ctx(1),
                &alice,
                EntityId(1),
                Direction::Bid,
                Uint::units(2),
                Uint::units(5),
                10,
            )
            .unwrap();
        engine
            .post(
                &ctx(1),
                &bob,
                EntityId(1),
                Direction::Ask,
                Uint::units(3),
                Uint::units(5),
                10,
            )
            .unwrap();
        engine.events_mut().drain();

        engine.tick(&ctx(2)).unwrap();
        assert!(engine.events().is_empty(), "no batch, no fills");
        assert_eq!(engine.open_orders(), 2);
    }
}
