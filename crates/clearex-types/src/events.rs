//! Domain events emitted by the engine.
//!
//! Events are published in order, within the block that produced them, and
//! are consumed by an external read-model — the engine itself never reads
//! them back. The [`EventSink`] seam lets hosts plug in their own transport;
//! [`MemoryEventBus`] is the in-process queue used by tests and
//! single-process hosts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::depth::PricePoint;
use crate::direction::Direction;
use crate::ids::{AccountId, EntityId};
use crate::uint::Uint;

/// A new order was accepted and escrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub id: EntityId,
    pub owner: AccountId,
    pub market_id: EntityId,
    pub direction: Direction,
    pub price: Uint,
    pub quantity: Uint,
    pub time_in_force: u16,
    pub created_block: u64,
    pub created_time: DateTime<Utc>,
}

/// An order left the book without (further) filling: explicit cancel or
/// time-in-force expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: EntityId,
}

/// One order matched for some quantity at the market's clearing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: EntityId,
    pub market_id: EntityId,
    pub owner: AccountId,
    pub pair: String,
    pub direction: Direction,
    pub qty_filled: Uint,
    pub qty_unfilled: Uint,
    pub block_number: u64,
    pub block_time: DateTime<Utc>,
    /// The uniform clearing price the fill executed at.
    pub price: Uint,
}

/// One market's clearing outcome for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub block_number: u64,
    pub block_time: DateTime<Utc>,
    pub market_id: EntityId,
    pub clearing_price: Uint,
    pub bids: Vec<PricePoint>,
    pub asks: Vec<PricePoint>,
}

/// Every event the engine can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    OrderCreated(OrderCreated),
    OrderCancelled(OrderCancelled),
    Fill(Fill),
    Batch(Batch),
}

/// Where emitted events go.
pub trait EventSink {
    fn publish(&mut self, event: EngineEvent);
}

/// In-memory FIFO event queue.
#[derive(Debug, Default)]
pub struct MemoryEventBus {
    items: Vec<EngineEvent>,
}

impl MemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything published so far, oldest first.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.items)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, EngineEvent> {
        self.items.iter()
    }
}

impl EventSink for MemoryEventBus {
    fn publish(&mut self, event: EngineEvent) {
        self.items.push(event);
    }
}
