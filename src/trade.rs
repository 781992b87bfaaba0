//! Trade record produced by the matching engine.

use crate::order::{OrderId, Side, TradeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed trade. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub trade_id: TradeId,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    pub ts_ns: u64,
}
