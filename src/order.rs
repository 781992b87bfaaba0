//! Order and identifier types shared by every layer of the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique, server-assigned identifier for an order.
///
/// Thin wrapper around a v4 UUID, mirroring the teacher crate's `Id` alias
/// (`pricelevel::Id`) but owned directly since price levels live in this
/// crate rather than an external one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Generates a fresh random order id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a `Trade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(pub Uuid);

impl TradeId {
    /// Generates a fresh random trade id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of an order or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side — the side an incoming order of this side matches against.
    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Order type, exactly as enumerated in the data model: immediately-matchable
/// types (`Market`, `Limit`, `Ioc`, `Fok`) and trigger types that park in the
/// trigger store until activated (`StopMarket`, `StopLimit`, `TakeProfit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Ioc,
    Fok,
    StopMarket,
    StopLimit,
    TakeProfit,
}

impl OrderType {
    /// Whether this order type is one of the three trigger (conditional)
    /// types that are parked in the trigger store rather than matched.
    #[must_use]
    pub fn is_trigger(self) -> bool {
        matches!(
            self,
            OrderType::StopMarket | OrderType::StopLimit | OrderType::TakeProfit
        )
    }

    /// Whether a residual (partially-filled) quantity of this order type
    /// rests on the book, or is dropped.
    #[must_use]
    pub fn rests_on_partial_fill(self) -> bool {
        matches!(self, OrderType::Limit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::Ioc => "ioc",
            OrderType::Fok => "fok",
            OrderType::StopMarket => "stop_market",
            OrderType::StopLimit => "stop_limit",
            OrderType::TakeProfit => "take_profit",
        };
        write!(f, "{s}")
    }
}

/// A single order, live or resting.
///
/// `quantity` decreases monotonically as fills occur and the order is
/// dropped from its level once it reaches zero. `price` and `trigger_price`
/// are optional at the type level because their presence is governed by
/// `order_type` (see [`OrderType`] and the admission checks in `crate::api`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub order_id: OrderId,
    pub ts_ns: u64,
}

impl Order {
    /// Whether this order, at its current resting price, is crossable with
    /// a prospective maker price `p` on the opposite side.
    ///
    /// Market orders cross any price. A buy crosses `p` iff its limit price
    /// is `>= p`; a sell iff its limit price is `<= p`. An order with no
    /// price (and a non-market type, which should never happen after
    /// admission) never crosses.
    #[must_use]
    pub fn crossable_with(&self, p: Decimal) -> bool {
        if self.order_type == OrderType::Market {
            return true;
        }
        match (self.side, self.price) {
            (Side::Buy, Some(limit)) => limit >= p,
            (Side::Sell, Some(limit)) => limit <= p,
            (_, None) => false,
        }
    }
}
