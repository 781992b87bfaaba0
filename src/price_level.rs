//! A single price level: a FIFO queue of live orders plus an aggregate
//! quantity, as described in the data model's "Price Level" entity.
//!
//! Grounded in the teacher crate's documented redesign (`src/lib.rs`,
//! "Performance Improvements and Deadlock Resolution"): storing orders in a
//! `SegQueue` directly made cancellation O(N) (drain-and-requeue). Here, as
//! there, the queue holds only `OrderId`s to preserve FIFO arrival order,
//! while a `DashMap` keyed by `OrderId` holds the orders themselves for O(1)
//! lookup, mutation and removal. The head of the queue is popped lazily:
//! ids whose order has already been fully filled or cancelled are discarded
//! without disturbing the ones behind them.
//!
//! `SegQueue` has no peek, only pop-from-front/push-to-back, so the id
//! currently being matched against is popped out of the queue and held in
//! `head` until its order is fully consumed — it is never pushed back,
//! which would otherwise rotate it behind whatever is next in line on a
//! partial fill.

use crate::order::{Order, OrderId};
use crossbeam::queue::SegQueue;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Mutex;
use tracing::trace;

/// One price's worth of resting orders.
pub struct PriceLevel {
    price: Decimal,
    orders: DashMap<OrderId, Order>,
    queue: SegQueue<OrderId>,
    head: Mutex<Option<OrderId>>,
    qty_at_price: Mutex<Decimal>,
}

impl PriceLevel {
    /// Creates an empty price level.
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: DashMap::new(),
            queue: SegQueue::new(),
            head: Mutex::new(None),
            qty_at_price: Mutex::new(Decimal::ZERO),
        }
    }

    /// The price this level represents.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Aggregate live quantity at this price.
    #[must_use]
    pub fn qty_at_price(&self) -> Decimal {
        *self.qty_at_price.lock().unwrap()
    }

    /// Appends an order to the FIFO. Precondition: `order.price == Some(self.price)`.
    pub fn add(&self, order: Order) {
        debug_assert!(order.quantity > Decimal::ZERO);
        let id = order.order_id;
        let qty = order.quantity;
        self.orders.insert(id, order);
        self.queue.push(id);
        *self.qty_at_price.lock().unwrap() += qty;
        trace!(price = %self.price, order_id = %id, "order added to price level");
    }

    /// Returns a clone of the head live order, lazily discarding ids whose
    /// order has already been emptied or removed. Does not remove the
    /// returned order from the FIFO — callers mutate it in place via
    /// [`Self::apply_fill`] or remove it via [`Self::remove_order`].
    #[must_use]
    pub fn peek_head(&self) -> Option<Order> {
        loop {
            let id = {
                let mut head = self.head.lock().unwrap();
                match *head {
                    Some(id) => id,
                    None => {
                        let id = self.queue.pop()?;
                        *head = Some(id);
                        id
                    }
                }
            };
            match self.orders.get(&id) {
                Some(entry) if entry.quantity > Decimal::ZERO => {
                    return Some(entry.value().clone());
                }
                _ => {
                    // Already filled or cancelled: drop the stale id and keep scanning.
                    self.orders.remove(&id);
                    self.clear_head_if(id);
                }
            }
        }
    }

    fn clear_head_if(&self, id: OrderId) {
        let mut head = self.head.lock().unwrap();
        if *head == Some(id) {
            *head = None;
        }
    }

    /// Applies a fill of `qty` to the order currently at the head of the
    /// FIFO (as returned by the most recent [`Self::peek_head`]), removing
    /// it from the level if it reaches zero quantity.
    pub fn apply_fill(&self, order_id: OrderId, qty: Decimal) {
        let remove = match self.orders.get_mut(&order_id) {
            Some(mut entry) => {
                entry.quantity -= qty;
                entry.quantity <= Decimal::ZERO
            }
            None => return,
        };
        *self.qty_at_price.lock().unwrap() -= qty;
        if remove {
            self.orders.remove(&order_id);
            self.clear_head_if(order_id);
        }
    }

    /// Decrements the aggregate quantity by `qty`, clamping at zero. Used
    /// when a fill has already been applied to the order itself and only
    /// the level aggregate needs correcting (kept symmetric with the
    /// `reduce_head` operation in the component contract).
    pub fn reduce_aggregate(&self, qty: Decimal) {
        let mut guard = self.qty_at_price.lock().unwrap();
        *guard = (*guard - qty).max(Decimal::ZERO);
    }

    /// Removes a specific order by id from this level, wherever it sits in
    /// the FIFO. Returns `true` if found.
    pub fn remove_order(&self, order_id: OrderId) -> bool {
        match self.orders.remove(&order_id) {
            Some((_, order)) => {
                *self.qty_at_price.lock().unwrap() -= order.quantity;
                self.clear_head_if(order_id);
                true
            }
            None => false,
        }
    }

    /// Whether this level has no live orders left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.qty_at_price() <= Decimal::ZERO
    }

    /// Snapshot of all live orders in FIFO arrival order, for persistence.
    #[must_use]
    pub fn live_orders_snapshot(&self) -> Vec<Order> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        if let Some(id) = *self.head.lock().unwrap() {
            if let Some(entry) = self.orders.get(&id) {
                if entry.quantity > Decimal::ZERO {
                    seen.insert(id);
                    out.push(entry.value().clone());
                }
            }
        }
        let drained: Vec<OrderId> = std::iter::from_fn(|| self.queue.pop()).collect();
        for id in &drained {
            self.queue.push(*id);
        }
        for id in drained {
            if !seen.insert(id) {
                continue;
            }
            if let Some(entry) = self.orders.get(&id) {
                if entry.quantity > Decimal::ZERO {
                    out.push(entry.value().clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderId as Id, OrderType, Side};
    use rust_decimal_macros::dec;

    fn order(qty: Decimal, price: Decimal) -> Order {
        Order {
            symbol: "BTC-USDT".to_string(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            quantity: qty,
            price: Some(price),
            trigger_price: None,
            order_id: Id::new(),
            ts_ns: 0,
        }
    }

    #[test]
    fn add_updates_aggregate() {
        let level = PriceLevel::new(dec!(100));
        level.add(order(dec!(1.5), dec!(100)));
        assert_eq!(level.qty_at_price(), dec!(1.5));
    }

    #[test]
    fn fifo_order_preserved() {
        let level = PriceLevel::new(dec!(100));
        let a = order(dec!(1), dec!(100));
        let b = order(dec!(1), dec!(100));
        let a_id = a.order_id;
        level.add(a);
        level.add(b);
        let head = level.peek_head().unwrap();
        assert_eq!(head.order_id, a_id);
    }

    #[test]
    fn fill_then_remove_empties_level() {
        let level = PriceLevel::new(dec!(100));
        let o = order(dec!(1), dec!(100));
        let id = o.order_id;
        level.add(o);
        level.apply_fill(id, dec!(1));
        assert!(level.is_empty());
        assert!(level.peek_head().is_none());
    }

    #[test]
    fn partial_fill_keeps_head_in_place_for_next_peek() {
        let level = PriceLevel::new(dec!(100));
        let a = order(dec!(2), dec!(100));
        let b = order(dec!(1), dec!(100));
        let a_id = a.order_id;
        let b_id = b.order_id;
        level.add(a);
        level.add(b);

        let head = level.peek_head().unwrap();
        assert_eq!(head.order_id, a_id);
        level.apply_fill(a_id, dec!(1));

        // `a` still has quantity left; it must still be the head, not `b`.
        let head = level.peek_head().unwrap();
        assert_eq!(head.order_id, a_id);
        level.apply_fill(a_id, dec!(1));

        // `a` is now fully filled; `b` becomes the head.
        let head = level.peek_head().unwrap();
        assert_eq!(head.order_id, b_id);
    }

    #[test]
    fn remove_order_by_id() {
        let level = PriceLevel::new(dec!(100));
        let o = order(dec!(2), dec!(100));
        let id = o.order_id;
        level.add(o);
        assert!(level.remove_order(id));
        assert!(level.is_empty());
        assert!(!level.remove_order(id));
    }
}
