//! # clearex-engine
//!
//! The per-block execution orchestrator of Clearex. One [`Engine`] instance
//! owns the order book store, the escrow ledger, the ID sequence and the
//! matcher pool, and is driven by its host exactly once per consensus block:
//!
//! - [`Engine::post`] / [`Engine::cancel`] — the submission surface, called
//!   during transaction processing
//! - [`Engine::tick`] — the block hook: expire stale orders, clear every
//!   market, settle every fill
//!
//! Everything is single-threaded and synchronous. Any error escaping `tick`
//! is fatal and must abort the block — it signals an already-broken
//! invariant, and continuing would risk node divergence.

pub mod execution;
pub mod metrics;
pub mod orders;
pub mod store;

use clearex_ledger::{AssetLedger, EscrowLedger, MarketRegistry};
use clearex_matcheng::MatcherPool;
use clearex_types::{EngineConfig, EntityId, EventSink, IdSequence, Order, Result};

use crate::metrics::EngineMetrics;
use crate::store::OrderStore;

/// The settlement core. Generic over the host's asset ledger and event
/// transport; every collaborator is handed in once at construction.
pub struct Engine<A: AssetLedger, E: EventSink> {
    assets: A,
    events: E,
    markets: MarketRegistry,
    store: OrderStore,
    escrow: EscrowLedger,
    ids: IdSequence,
    pool: MatcherPool,
    config: EngineConfig,
    metrics: EngineMetrics,
}

impl<A: AssetLedger, E: EventSink> Engine<A, E> {
    pub fn new(assets: A, events: E, markets: MarketRegistry, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let escrow = EscrowLedger::new(config.custody_account.clone());
        Ok(Self {
            assets,
            events,
            markets,
            store: OrderStore::new(),
            escrow,
            ids: IdSequence::new(),
            pool: MatcherPool::new(),
            config,
            metrics: EngineMetrics::new(),
        })
    }

    /// The authority-owned market registry.
    #[must_use]
    pub fn markets(&self) -> &MarketRegistry {
        &self.markets
    }

    /// Mutable registry access for the external market authority.
    pub fn markets_mut(&mut self) -> &mut MarketRegistry {
        &mut self.markets
    }

    #[must_use]
    pub fn assets(&self) -> &A {
        &self.assets
    }

    /// Mutable asset-ledger access for the host (deposits, withdrawals).
    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    #[must_use]
    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    #[must_use]
    pub fn escrow(&self) -> &EscrowLedger {
        &self.escrow
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Read-only view of the order book store.
    #[must_use]
    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Look up a live order.
    pub fn order(&self, id: EntityId) -> Result<Order> {
        self.store.get(id)
    }

    /// Number of live orders across all markets.
    #[must_use]
    pub fn open_orders(&self) -> usize {
        self.store.len()
    }
}
