//! Per-symbol trigger (stop/take-profit) store, per the "Trigger Store"
//! entity and §4.3.4.
//!
//! A plain insertion-ordered `Vec` is sufficient: trigger evaluation scans
//! every pending order on every trade anyway (§4.3.4 gives no index by
//! trigger price), and firing order among simultaneously-eligible triggers
//! is defined as store insertion order, which a `Vec` gives for free.

use crate::order::{Order, OrderId, OrderType, Side};
use rust_decimal::Decimal;

/// Ordered collection of parked conditional orders for one symbol.
#[derive(Debug, Default)]
pub struct TriggerStore {
    pending: Vec<Order>,
}

impl TriggerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Parks a trigger order. Precondition: `order.order_type.is_trigger()`.
    pub fn park(&mut self, order: Order) {
        debug_assert!(order.order_type.is_trigger());
        self.pending.push(order);
    }

    /// Removes a trigger order by id. Returns whether one was found.
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|o| o.order_id != order_id);
        self.pending.len() != before
    }

    /// Whether the store currently holds no pending triggers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// All pending triggers, for snapshotting, in store (insertion) order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Order> {
        self.pending.clone()
    }

    /// Replaces the entire store, e.g. on snapshot load.
    pub fn restore(&mut self, orders: Vec<Order>) {
        self.pending = orders;
    }

    /// Whether trigger `order` fires given `last_price`, per §4.3.4:
    /// - `stop_market`/`stop_limit`: fires when `last_price >= trigger_price`
    ///   for a buy, `last_price <= trigger_price` for a sell.
    /// - `take_profit`: the mirror image — fires when `last_price >=
    ///   trigger_price` for a sell, `<=` for a buy.
    fn fires(order: &Order, last_price: Decimal) -> bool {
        let Some(trigger_price) = order.trigger_price else {
            return false;
        };
        match order.order_type {
            OrderType::StopMarket | OrderType::StopLimit => match order.side {
                Side::Buy => last_price >= trigger_price,
                Side::Sell => last_price <= trigger_price,
            },
            OrderType::TakeProfit => match order.side {
                Side::Sell => last_price >= trigger_price,
                Side::Buy => last_price <= trigger_price,
            },
            _ => false,
        }
    }

    /// Removes and returns every trigger that fires at `last_price`, in
    /// store (insertion) order, converted to their child submissions per
    /// §4.3.4:
    /// - `stop_market`, `take_profit` -> `market` child, same side/quantity.
    /// - `stop_limit` -> `limit` child at `order.price`, falling back to
    ///   `trigger_price` when `order.price` is absent.
    ///
    /// Callers are expected to submit the returned children through the
    /// matching engine only after releasing the per-symbol lock held during
    /// the parent submission (the deferred-drain redesign of §9).
    pub fn drain_fired(&mut self, last_price: Decimal) -> Vec<Order> {
        let (fired, remaining): (Vec<Order>, Vec<Order>) = self
            .pending
            .drain(..)
            .partition(|o| Self::fires(o, last_price));
        self.pending = remaining;
        fired.into_iter().map(Self::to_child).collect()
    }

    fn to_child(mut order: Order) -> Order {
        match order.order_type {
            OrderType::StopMarket | OrderType::TakeProfit => {
                order.order_type = OrderType::Market;
                order.price = None;
            }
            OrderType::StopLimit => {
                order.order_type = OrderType::Limit;
                order.price = order.price.or(order.trigger_price);
            }
            _ => {}
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderId;
    use rust_decimal_macros::dec;

    fn stop_market(side: Side, trigger_price: Decimal) -> Order {
        Order {
            symbol: "BTC-USDT".to_string(),
            side,
            order_type: OrderType::StopMarket,
            quantity: dec!(1),
            price: None,
            trigger_price: Some(trigger_price),
            order_id: OrderId::new(),
            ts_ns: 0,
        }
    }

    #[test]
    fn stop_buy_fires_when_price_rises_to_trigger() {
        let mut store = TriggerStore::new();
        store.park(stop_market(Side::Buy, dec!(101)));
        assert!(store.drain_fired(dec!(100)).is_empty());
        let fired = store.drain_fired(dec!(101));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].order_type, OrderType::Market);
        assert!(store.is_empty());
    }

    #[test]
    fn take_profit_sell_fires_when_price_rises() {
        let mut store = TriggerStore::new();
        let mut tp = stop_market(Side::Sell, dec!(101));
        tp.order_type = OrderType::TakeProfit;
        store.park(tp);
        assert!(store.drain_fired(dec!(100)).is_empty());
        assert_eq!(store.drain_fired(dec!(101)).len(), 1);
    }

    #[test]
    fn stop_limit_child_uses_order_price_or_falls_back_to_trigger() {
        let mut store = TriggerStore::new();
        let mut sl = stop_market(Side::Buy, dec!(100));
        sl.order_type = OrderType::StopLimit;
        sl.price = Some(dec!(99));
        store.park(sl);
        let fired = store.drain_fired(dec!(100));
        assert_eq!(fired[0].order_type, OrderType::Limit);
        assert_eq!(fired[0].price, Some(dec!(99)));
    }

    #[test]
    fn firing_order_matches_insertion_order() {
        let mut store = TriggerStore::new();
        let a = stop_market(Side::Buy, dec!(100));
        let b = stop_market(Side::Buy, dec!(100));
        let a_id = a.order_id;
        let b_id = b.order_id;
        store.park(a);
        store.park(b);
        let fired = store.drain_fired(dec!(100));
        assert_eq!(fired[0].order_id, a_id);
        assert_eq!(fired[1].order_id, b_id);
    }

    #[test]
    fn remove_drops_a_pending_trigger() {
        let mut store = TriggerStore::new();
        let o = stop_market(Side::Buy, dec!(100));
        let id = o.order_id;
        store.park(o);
        assert!(store.remove(id));
        assert!(store.is_empty());
        assert!(!store.remove(id));
    }
}
