//! One side of an order book: a price-ordered map of [`PriceLevel`]s plus a
//! best-price cache, as described by the "Half-Book" entity and the C1
//! contract.
//!
//! Grounded in the teacher crate's `OrderBook` (`src/orderbook/book.rs`),
//! which keys `bids`/`asks` on a `crossbeam_skiplist::SkipMap<u128, Arc<PriceLevel>>`
//! and reads the extremum via `next_back()` (bids, highest key last) or
//! `next()` (asks, lowest key first). `Decimal` is totally ordered the same
//! way `u128` is, so the same skiplist convention carries over unchanged —
//! no negation trick is needed for either side.

use crate::order::{Order, OrderId, Side};
use crate::price_level::PriceLevel;
use crossbeam_skiplist::SkipMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::trace;

/// A single side (bid or ask) of one symbol's order book.
pub struct HalfBook {
    side: Side,
    levels: SkipMap<Decimal, Arc<PriceLevel>>,
}

impl HalfBook {
    /// Creates an empty half-book for the given side.
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: SkipMap::new(),
        }
    }

    /// The side this half-book represents.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Appends `order` to the FIFO at `order.price`, creating the level if
    /// absent. Precondition: `order.price` is `Some` and positive.
    pub fn add(&self, order: Order) {
        let price = order
            .price
            .expect("half-book add requires a priced order");
        debug_assert!(price > Decimal::ZERO);
        let level = self
            .levels
            .get_or_insert_with(price, || Arc::new(PriceLevel::new(price)))
            .value()
            .clone();
        level.add(order);
        trace!(side = %self.side, price = %price, "level populated");
    }

    /// The best price on this side, skipping lazily-stale empty levels.
    /// Bids: maximum key. Asks: minimum key.
    #[must_use]
    pub fn best_price(&self) -> Option<Decimal> {
        loop {
            let entry = match self.side {
                Side::Buy => self.levels.back(),
                Side::Sell => self.levels.front(),
            }?;
            if entry.value().qty_at_price() > Decimal::ZERO {
                return Some(*entry.key());
            }
            entry.remove();
        }
    }

    /// The head live order at the best price, without removing it from the
    /// FIFO. `None` if this side is empty.
    #[must_use]
    pub fn pop_best_order(&self) -> Option<Order> {
        loop {
            let price = self.best_price()?;
            let entry = self.levels.get(&price)?;
            let level = entry.value().clone();
            match level.peek_head() {
                Some(order) => return Some(order),
                None => {
                    // Level emptied concurrently with the best_price read above.
                    entry.remove();
                    continue;
                }
            }
        }
    }

    /// Decrements `qty_at_price[price]` by `qty`, clamping at zero. Removes
    /// the level once empty.
    pub fn reduce_head(&self, price: Decimal, qty: Decimal) {
        if let Some(entry) = self.levels.get(&price) {
            entry.value().reduce_aggregate(qty);
            if entry.value().is_empty() {
                entry.remove();
            }
        }
    }

    /// Removes `order_id` from whichever level holds it. Returns whether an
    /// order was found and removed.
    pub fn remove_order(&self, order_id: OrderId) -> bool {
        for entry in self.levels.iter() {
            if entry.value().remove_order(order_id) {
                if entry.value().is_empty() {
                    entry.remove();
                }
                return true;
            }
        }
        false
    }

    /// Applies a fill of `qty` to `order_id` (the current FIFO head produced
    /// by [`Self::pop_best_order`]) at `price`, removing its level if it
    /// empties.
    pub fn apply_fill(&self, price: Decimal, order_id: OrderId, qty: Decimal) {
        if let Some(entry) = self.levels.get(&price) {
            entry.value().apply_fill(order_id, qty);
            if entry.value().is_empty() {
                entry.remove();
            }
        }
    }

    /// Up to `depth` occupied levels in priority order (descending for
    /// bids, ascending for asks), as `(price, aggregate_qty)` pairs.
    #[must_use]
    pub fn aggregate(&self, depth: usize) -> Vec<(Decimal, Decimal)> {
        let mut out = Vec::new();
        let iter: Box<dyn Iterator<Item = _>> = match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        };
        for entry in iter {
            let qty = entry.value().qty_at_price();
            if qty > Decimal::ZERO {
                out.push((*entry.key(), qty));
                if out.len() == depth {
                    break;
                }
            }
        }
        out
    }

    /// Whether this side currently has any live quantity resting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.best_price().is_none()
    }

    /// All live orders across all levels, in price-priority then FIFO
    /// order, for snapshotting. Returns `(price, orders)` pairs.
    #[must_use]
    pub fn snapshot_levels(&self) -> Vec<(Decimal, Vec<Order>)> {
        let mut out = Vec::new();
        let iter: Box<dyn Iterator<Item = _>> = match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        };
        for entry in iter {
            let orders = entry.value().live_orders_snapshot();
            if !orders.is_empty() {
                out.push((*entry.key(), orders));
            }
        }
        out
    }
}
