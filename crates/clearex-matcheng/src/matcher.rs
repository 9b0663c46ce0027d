//! The uniform-price call auction.
//!
//! Orders are enqueued in any sequence; [`Matcher::match_orders`] sorts
//! internally, so enqueue order never affects the outcome. The clearing
//! price is the one maximizing executable volume
//! `V(p) = min(demand(p), supply(p))` over the distinct price levels
//! present; when several prices tie, the **lowest** wins — the rule every
//! node must share, since any divergence here forks consensus.
//!
//! Allocation walks each side's eligible levels best-price-first. A level
//! that fits the remaining volume fills in full; the boundary level is
//! rationed pro-rata by remaining quantity, rounding down, with the
//! leftover single units handed out in ascending order-ID so the side total
//! lands exactly on the executable volume.

use std::collections::BTreeMap;

use clearex_types::{Direction, EngineError, EntityId, PricePoint, Result, Uint};

/// The outcome of matching one order: how much executed and how much of the
/// order remains. Consumed exactly once by settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub order_id: EntityId,
    pub qty_filled: Uint,
    pub qty_unfilled: Uint,
}

/// One market's clearing outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResults {
    /// The single uniform price all matched volume trades at.
    pub clearing_price: Uint,
    /// Executable volume at the clearing price, in base units.
    pub volume: Uint,
    /// Bid fills (best price first), then ask fills.
    pub fills: Vec<Fill>,
    /// Cumulative demand curve over bid levels, ascending price. Display only.
    pub bid_aggregates: Vec<PricePoint>,
    /// Cumulative supply curve over ask levels, ascending price. Display only.
    pub ask_aggregates: Vec<PricePoint>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: EntityId,
    quantity: Uint,
}

/// Per-market batch matcher. Rebuilt (or pool-reset) every block; holds no
/// state beyond the orders enqueued since the last reset.
#[derive(Debug, Default)]
pub struct Matcher {
    bids: BTreeMap<Uint, Vec<Entry>>,
    asks: BTreeMap<Uint, Vec<Entry>>,
}

impl Matcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one live order. Zero-quantity orders are ignored.
    pub fn enqueue_order(&mut self, direction: Direction, id: EntityId, price: Uint, quantity: Uint) {
        if quantity.is_zero() {
            return;
        }
        let side = match direction {
            Direction::Bid => &mut self.bids,
            Direction::Ask => &mut self.asks,
        };
        side.entry(price).or_default().push(Entry { id, quantity });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Clear all queued orders so the matcher can be reused.
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    /// Run the auction. `Ok(None)` when the book does not cross.
    pub fn match_orders(&self) -> Result<Option<MatchResults>> {
        if self.bids.is_empty() || self.asks.is_empty() {
            return Ok(None);
        }

        let bid_levels = level_totals(&self.bids)?;
        let ask_levels = level_totals(&self.asks)?;
        let bid_aggregates = demand_curve(&bid_levels)?;
        let ask_aggregates = supply_curve(&ask_levels)?;

        let Some((clearing_price, volume)) =
            best_clearing(&bid_levels, &ask_levels, &bid_aggregates, &ask_aggregates)
        else {
            return Ok(None);
        };

        // Bids at or above the clearing price, best (highest) first.
        let mut fills = allocate(self.bids.range(clearing_price..).rev(), volume)?;
        // Asks at or below the clearing price, best (lowest) first.
        let ask_fills = allocate(self.asks.range(..=clearing_price), volume)?;
        fills.extend(ask_fills);

        tracing::debug!(
            clearing_price = %clearing_price,
            volume = %volume,
            fills = fills.len(),
            "auction cleared"
        );

        Ok(Some(MatchResults {
            clearing_price,
            volume,
            fills,
            bid_aggregates,
            ask_aggregates,
        }))
    }
}

/// Per-level quantity totals, ascending by price.
fn level_totals(side: &BTreeMap<Uint, Vec<Entry>>) -> Result<Vec<(Uint, Uint)>> {
    let mut levels = Vec::with_capacity(side.len());
    for (price, entries) in side {
        let mut total = Uint::ZERO;
        for entry in entries {
            total = total
                .checked_add(entry.quantity)
                .ok_or(EngineError::Overflow("level total"))?;
        }
        levels.push((*price, total));
    }
    Ok(levels)
}

/// Cumulative demand `D(p)` at each bid level: everything priced at or
/// above `p`, so the running sum accumulates from the top of the book.
fn demand_curve(bid_levels: &[(Uint, Uint)]) -> Result<Vec<PricePoint>> {
    let mut curve = Vec::with_capacity(bid_levels.len());
    let mut cumulative = Uint::ZERO;
    for (price, total) in bid_levels.iter().rev() {
        cumulative = cumulative
            .checked_add(*total)
            .ok_or(EngineError::Overflow("demand curve"))?;
        curve.push(PricePoint::new(*price, cumulative));
    }
    curve.reverse();
    Ok(curve)
}

/// Cumulative supply `S(p)` at each ask level: everything priced at or
/// below `p`.
fn supply_curve(ask_levels: &[(Uint, Uint)]) -> Result<Vec<PricePoint>> {
    let mut curve = Vec::with_capacity(ask_levels.len());
    let mut cumulative = Uint::ZERO;
    for (price, total) in ask_levels {
        cumulative = cumulative
            .checked_add(*total)
            .ok_or(EngineError::Overflow("supply curve"))?;
        curve.push(PricePoint::new(*price, cumulative));
    }
    Ok(curve)
}

/// The price maximizing executable volume, lowest price on ties.
/// `None` when no candidate executes any volume.
fn best_clearing(
    bid_levels: &[(Uint, Uint)],
    ask_levels: &[(Uint, Uint)],
    demand: &[PricePoint],
    supply: &[PricePoint],
) -> Option<(Uint, Uint)> {
    let mut candidates: Vec<Uint> = bid_levels
        .iter()
        .chain(ask_levels.iter())
        .map(|(price, _)| *price)
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let mut best: Option<(Uint, Uint)> = None;
    for price in candidates {
        let d = demand_at(bid_levels, demand, price);
        let s = supply_at(ask_levels, supply, price);
        let volume = d.min(s);
        if volume.is_zero() {
            continue;
        }
        // Strictly-greater keeps the lowest price among equal maxima.
        if best.is_none_or(|(_, v)| volume > v) {
            best = Some((price, volume));
        }
    }
    best
}

fn demand_at(bid_levels: &[(Uint, Uint)], demand: &[PricePoint], price: Uint) -> Uint {
    let idx = bid_levels.partition_point(|(level, _)| *level < price);
    demand.get(idx).map_or(Uint::ZERO, |point| point.quantity)
}

fn supply_at(ask_levels: &[(Uint, Uint)], supply: &[PricePoint], price: Uint) -> Uint {
    let idx = ask_levels.partition_point(|(level, _)| *level <= price);
    if idx == 0 {
        Uint::ZERO
    } else {
        supply[idx - 1].quantity
    }
}

/// Distribute `volume` across the given levels, iterated best-price-first.
fn allocate<'a>(
    levels: impl Iterator<Item = (&'a Uint, &'a Vec<Entry>)>,
    volume: Uint,
) -> Result<Vec<Fill>> {
    let mut fills = Vec::new();
    let mut remaining = volume;

    for (_, entries) in levels {
        if remaining.is_zero() {
            break;
        }

        let mut level: Vec<Entry> = entries.clone();
        level.sort_by_key(|entry| entry.id);
        let mut total = Uint::ZERO;
        for entry in &level {
            total = total
                .checked_add(entry.quantity)
                .ok_or(EngineError::Overflow("level total"))?;
        }

        if total <= remaining {
            for entry in &level {
                fills.push(Fill {
                    order_id: entry.id,
                    qty_filled: entry.quantity,
                    qty_unfilled: Uint::ZERO,
                });
            }
            remaining = remaining
                .checked_sub(total)
                .ok_or(EngineError::Overflow("allocation"))?;
            continue;
        }

        // Boundary level: pro-rata by remaining quantity, rounded down.
        let mut allotted = Vec::with_capacity(level.len());
        let mut assigned = Uint::ZERO;
        for entry in &level {
            let share = entry.quantity.mul_div(remaining, total)?;
            assigned = assigned
                .checked_add(share)
                .ok_or(EngineError::Overflow("allocation"))?;
            allotted.push(share);
        }

        // Hand out the rounding remainder one unit at a time, earliest
        // order ID first. Each share is strictly below its order's
        // quantity here, so a single extra unit never overfills.
        let mut leftover = remaining.saturating_sub(assigned);
        for share in &mut allotted {
            if leftover.is_zero() {
                break;
            }
            *share = share
                .checked_add(Uint::ONE)
                .ok_or(EngineError::Overflow("allocation"))?;
            leftover = leftover.saturating_sub(Uint::ONE);
        }

        for (entry, share) in level.iter().zip(allotted) {
            if share.is_zero() {
                continue;
            }
            fills.push(Fill {
                order_id: entry.id,
                qty_filled: share,
                qty_unfilled: entry.quantity.saturating_sub(share),
            });
        }
        remaining = Uint::ZERO;
    }

    Ok(fills)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(value: u128) -> Uint {
        Uint::new(value)
    }

    fn enqueue(matcher: &mut Matcher, direction: Direction, id: u64, price: u128, qty: u128) {
        matcher.enqueue_order(direction, EntityId(id), uint(price), uint(qty));
    }

    fn fill_for(results: &MatchResults, id: u64) -> Option<Fill> {
        results
            .fills
            .iter()
            .copied()
            .find(|fill| fill.order_id == EntityId(id))
    }

    #[test]
    fn empty_book_no_result() {
        let matcher = Matcher::new();
        assert!(matcher.match_orders().unwrap().is_none());
    }

    #[test]
    fn one_sided_book_no_result() {
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 10, 5);
        assert!(matcher.match_orders().unwrap().is_none());
    }

    #[test]
    fn no_crossing_no_result() {
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 99, 10);
        enqueue(&mut matcher, Direction::Ask, 2, 101, 10);
        assert!(matcher.match_orders().unwrap().is_none());
    }

    #[test]
    fn crossing_example() {
        // B1(3, 10), B2(2, 10), A1(2, 10), A2(4, 10):
        // V(2) = min(20, 10) = 10, V(3) = min(10, 10) = 10 -> tie, clear at 2.
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 3, 10);
        enqueue(&mut matcher, Direction::Bid, 2, 2, 10);
        enqueue(&mut matcher, Direction::Ask, 3, 2, 10);
        enqueue(&mut matcher, Direction::Ask, 4, 4, 10);

        let results = matcher.match_orders().unwrap().unwrap();
        assert_eq!(results.clearing_price, uint(2));
        assert_eq!(results.volume, uint(10));

        let b1 = fill_for(&results, 1).unwrap();
        assert_eq!(b1.qty_filled, uint(10));
        assert_eq!(b1.qty_unfilled, Uint::ZERO);
        let a1 = fill_for(&results, 3).unwrap();
        assert_eq!(a1.qty_filled, uint(10));
        assert!(fill_for(&results, 2).is_none(), "B2 stays unmatched");
        assert!(fill_for(&results, 4).is_none(), "A2 stays unmatched");
    }

    #[test]
    fn tie_breaks_to_lowest_price() {
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 5, 10);
        enqueue(&mut matcher, Direction::Ask, 2, 3, 10);

        let results = matcher.match_orders().unwrap().unwrap();
        assert_eq!(results.clearing_price, uint(3));
        assert_eq!(results.volume, uint(10));
        assert_eq!(fill_for(&results, 1).unwrap().qty_filled, uint(10));
        assert_eq!(fill_for(&results, 2).unwrap().qty_filled, uint(10));
    }

    #[test]
    fn pro_rata_with_remainder_to_earliest() {
        // Two bids (7 and 3) at the clearing price compete for 6 units:
        // floors are 4.2 -> 4 and 1.8 -> 1, the leftover unit goes to the
        // earlier ID. Totals exactly 6.
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 5, 7);
        enqueue(&mut matcher, Direction::Bid, 2, 5, 3);
        enqueue(&mut matcher, Direction::Ask, 3, 5, 6);

        let results = matcher.match_orders().unwrap().unwrap();
        assert_eq!(results.clearing_price, uint(5));
        assert_eq!(results.volume, uint(6));

        let b1 = fill_for(&results, 1).unwrap();
        let b2 = fill_for(&results, 2).unwrap();
        assert_eq!(b1.qty_filled, uint(5));
        assert_eq!(b1.qty_unfilled, uint(2));
        assert_eq!(b2.qty_filled, uint(1));
        assert_eq!(b2.qty_unfilled, uint(2));
        assert_eq!(fill_for(&results, 3).unwrap().qty_filled, uint(6));
    }

    #[test]
    fn zero_allocations_produce_no_fill() {
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 5, 10);
        enqueue(&mut matcher, Direction::Bid, 2, 5, 1);
        enqueue(&mut matcher, Direction::Ask, 3, 5, 5);

        let results = matcher.match_orders().unwrap().unwrap();
        // 10 * 5 / 11 = 4, 1 * 5 / 11 = 0; leftover unit -> order 1.
        assert_eq!(fill_for(&results, 1).unwrap().qty_filled, uint(5));
        assert!(fill_for(&results, 2).is_none());
    }

    #[test]
    fn better_priced_volume_bounded_by_executable() {
        // Lone bid above the clearing price exceeds the opposing volume;
        // it fills only up to that volume.
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 5, 10);
        enqueue(&mut matcher, Direction::Ask, 2, 3, 6);

        let results = matcher.match_orders().unwrap().unwrap();
        assert_eq!(results.clearing_price, uint(3));
        assert_eq!(results.volume, uint(6));
        let b1 = fill_for(&results, 1).unwrap();
        assert_eq!(b1.qty_filled, uint(6));
        assert_eq!(b1.qty_unfilled, uint(4));
    }

    #[test]
    fn volume_conserved_across_sides() {
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 10, 7);
        enqueue(&mut matcher, Direction::Bid, 2, 9, 5);
        enqueue(&mut matcher, Direction::Bid, 3, 8, 3);
        enqueue(&mut matcher, Direction::Ask, 4, 7, 4);
        enqueue(&mut matcher, Direction::Ask, 5, 9, 6);
        enqueue(&mut matcher, Direction::Ask, 6, 11, 9);

        let results = matcher.match_orders().unwrap().unwrap();
        let mut bid_total = Uint::ZERO;
        let mut ask_total = Uint::ZERO;
        for fill in &results.fills {
            if fill.order_id.0 <= 3 {
                bid_total = bid_total.checked_add(fill.qty_filled).unwrap();
            } else {
                ask_total = ask_total.checked_add(fill.qty_filled).unwrap();
            }
        }
        assert_eq!(bid_total, ask_total);
        assert_eq!(bid_total, results.volume);
    }

    #[test]
    fn aggregates_are_cumulative() {
        let mut matcher = Matcher::new();
        for (id, price) in [(1u64, 1u128), (2, 2), (3, 3)] {
            enqueue(&mut matcher, Direction::Bid, id, price, 10);
        }
        for (id, price) in [(4u64, 2u128), (5, 3), (6, 4)] {
            enqueue(&mut matcher, Direction::Ask, id, price, 10);
        }

        let results = matcher.match_orders().unwrap().unwrap();
        let bids: Vec<(u128, u128)> = results
            .bid_aggregates
            .iter()
            .map(|p| (p.price.raw(), p.quantity.raw()))
            .collect();
        let asks: Vec<(u128, u128)> = results
            .ask_aggregates
            .iter()
            .map(|p| (p.price.raw(), p.quantity.raw()))
            .collect();
        assert_eq!(bids, vec![(1, 30), (2, 20), (3, 10)]);
        assert_eq!(asks, vec![(2, 10), (3, 20), (4, 30)]);
    }

    #[test]
    fn enqueue_order_is_irrelevant() {
        use rand::seq::SliceRandom;

        let orders: Vec<(Direction, u64, u128, u128)> = vec![
            (Direction::Bid, 1, 10, 7),
            (Direction::Bid, 2, 9, 5),
            (Direction::Bid, 3, 10, 2),
            (Direction::Ask, 4, 8, 4),
            (Direction::Ask, 5, 9, 6),
            (Direction::Ask, 6, 10, 9),
        ];

        let mut reference = Matcher::new();
        for (direction, id, price, qty) in &orders {
            enqueue(&mut reference, *direction, *id, *price, *qty);
        }
        let expected = reference.match_orders().unwrap().unwrap();

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let mut shuffled = orders.clone();
            shuffled.shuffle(&mut rng);
            let mut matcher = Matcher::new();
            for (direction, id, price, qty) in &shuffled {
                enqueue(&mut matcher, *direction, *id, *price, *qty);
            }
            let results = matcher.match_orders().unwrap().unwrap();
            assert_eq!(results, expected);
        }
    }

    #[test]
    fn reset_empties_the_matcher() {
        let mut matcher = Matcher::new();
        enqueue(&mut matcher, Direction::Bid, 1, 5, 5);
        assert!(!matcher.is_empty());
        matcher.reset();
        assert!(matcher.is_empty());
        assert!(matcher.match_orders().unwrap().is_none());
    }

    #[test]
    fn zero_quantity_orders_ignored() {
        let mut matcher = Matcher::new();
        matcher.enqueue_order(Direction::Bid, EntityId(1), uint(5), Uint::ZERO);
        assert!(matcher.is_empty());
    }
}
