//! The market registry.
//!
//! Markets are created by an external authority (governance); the engine
//! only reads them. IDs are monotonic and never reused.

use std::collections::BTreeMap;

use clearex_types::{EngineError, EntityId, IdSequence, Market, Result};

#[derive(Debug, Default)]
pub struct MarketRegistry {
    markets: BTreeMap<EntityId, Market>,
    seq: IdSequence,
}

impl MarketRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new (base, quote) pair. Authority-only in a deployed
    /// system; the engine never calls this.
    pub fn create(&mut self, base_denom: impl Into<String>, quote_denom: impl Into<String>) -> Market {
        let market = Market::new(self.seq.advance(), base_denom, quote_denom);
        tracing::info!(market = %market, "market created");
        self.markets.insert(market.id, market.clone());
        market
    }

    pub fn get(&self, id: EntityId) -> Result<Market> {
        self.markets
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("market {id}")))
    }

    #[must_use]
    pub fn has(&self, id: EntityId) -> bool {
        self.markets.contains_key(&id)
    }

    /// Visit markets in ascending ID order; stop when the visitor returns
    /// `false`.
    pub fn iterate(&self, mut visitor: impl FnMut(&Market) -> bool) {
        for market in self.markets.values() {
            if !visitor(market) {
                break;
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_monotonic_ids() {
        let mut registry = MarketRegistry::new();
        let btc = registry.create("BTC", "USDT");
        let eth = registry.create("ETH", "USDT");
        assert_eq!(btc.id, EntityId(1));
        assert_eq!(eth.id, EntityId(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn get_unknown_market() {
        let registry = MarketRegistry::new();
        let err = registry.get(EntityId(9)).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn iterate_in_id_order_with_short_circuit() {
        let mut registry = MarketRegistry::new();
        registry.create("BTC", "USDT");
        registry.create("ETH", "USDT");
        registry.create("ATOM", "USDT");

        let mut seen = Vec::new();
        registry.iterate(|market| {
            seen.push(market.id.0);
            seen.len() < 2
        });
        assert_eq!(seen, vec![1, 2]);
    }
}
