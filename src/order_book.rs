//! Pair of half-books for one symbol, plus BBO and depth projections, per
//! the "Order Book" entity and the C2 contract.

use crate::half_book::HalfBook;
use crate::order::Side;
use rust_decimal::Decimal;

/// Best bid/offer with aggregate quantities at each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bbo {
    pub best_bid: Option<(Decimal, Decimal)>,
    pub best_ask: Option<(Decimal, Decimal)>,
}

/// Top-d aggregated levels on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthView {
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

/// One symbol's order book: a bid half-book and an ask half-book.
pub struct OrderBook {
    pub(crate) bids: HalfBook,
    pub(crate) asks: HalfBook,
}

impl OrderBook {
    /// Creates an empty order book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: HalfBook::new(Side::Buy),
            asks: HalfBook::new(Side::Sell),
        }
    }

    /// The half-book matching a taker order's opposing side.
    pub(crate) fn opposing(&self, taker_side: Side) -> &HalfBook {
        match taker_side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        }
    }

    /// The half-book an order of this side rests on.
    pub(crate) fn resting_side(&self, side: Side) -> &HalfBook {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// The best bid price and aggregate quantity there, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<(Decimal, Decimal)> {
        self.bids.aggregate(1).into_iter().next()
    }

    /// The best ask price and aggregate quantity there, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<(Decimal, Decimal)> {
        self.asks.aggregate(1).into_iter().next()
    }

    /// The current best bid/offer.
    #[must_use]
    pub fn bbo(&self) -> Bbo {
        Bbo {
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
        }
    }

    /// Top-`d` aggregated levels per side, bids descending, asks ascending.
    #[must_use]
    pub fn depth(&self, d: usize) -> DepthView {
        DepthView {
            bids: self.bids.aggregate(d),
            asks: self.asks.aggregate(d),
        }
    }

    /// Whether no live bid price is `>=` any live ask price — the
    /// non-crossing invariant that must hold after every completed
    /// matching cycle.
    #[must_use]
    pub fn is_non_crossing(&self) -> bool {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => bid < ask,
            _ => true,
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Order, OrderId, OrderType};
    use rust_decimal_macros::dec;

    fn order(side: Side, qty: Decimal, price: Decimal) -> Order {
        Order {
            symbol: "BTC-USDT".to_string(),
            side,
            order_type: OrderType::Limit,
            quantity: qty,
            price: Some(price),
            trigger_price: None,
            order_id: OrderId::new(),
            ts_ns: 0,
        }
    }

    #[test]
    fn bbo_reflects_both_sides() {
        let book = OrderBook::new();
        book.bids.add(order(Side::Buy, dec!(1), dec!(99)));
        book.asks.add(order(Side::Sell, dec!(1), dec!(101)));
        let bbo = book.bbo();
        assert_eq!(bbo.best_bid, Some((dec!(99), dec!(1))));
        assert_eq!(bbo.best_ask, Some((dec!(101), dec!(1))));
    }

    #[test]
    fn empty_book_is_non_crossing() {
        let book = OrderBook::new();
        assert!(book.is_non_crossing());
    }

    #[test]
    fn depth_orders_levels_by_priority() {
        let book = OrderBook::new();
        book.bids.add(order(Side::Buy, dec!(1), dec!(99)));
        book.bids.add(order(Side::Buy, dec!(1), dec!(100)));
        book.asks.add(order(Side::Sell, dec!(1), dec!(101)));
        book.asks.add(order(Side::Sell, dec!(1), dec!(102)));
        let depth = book.depth(10);
        assert_eq!(depth.bids, vec![(dec!(100), dec!(1)), (dec!(99), dec!(1))]);
        assert_eq!(depth.asks, vec![(dec!(101), dec!(1)), (dec!(102), dec!(1))]);
    }
}
