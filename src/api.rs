//! Thin request/response adapter DTOs, per the submission and cancellation
//! interfaces in §6.
//!
//! HTTP/WebSocket transport itself is out of scope (§1); what belongs here
//! is the validation boundary between untyped wire fields and a core
//! [`Order`] — grounded in `examples/original_source/app/main.py`'s
//! `OrderIn.to_order()`: parse each decimal string, reject non-positive
//! quantity/price, and require the fields each `order_type` needs before an
//! `Order` is ever constructed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::order::{Order, OrderId, OrderType, Side};
use crate::trade::Trade;
use crate::utils::now_ns;

/// Wire-level submission request: every numeric field arrives as a string
/// so the exact decimal representation submitted is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub symbol: String,
    pub order_type: String,
    pub side: String,
    pub quantity: String,
    pub price: Option<String>,
    pub trigger_price: Option<String>,
}

/// Wire-level submission response, per §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub order_id: OrderId,
    pub resting: bool,
    pub resting_order_id: Option<OrderId>,
    pub resting_qty: Option<Decimal>,
    pub trades: Vec<TradeView>,
}

/// Wire-level trade line within a [`SubmissionResponse`], per §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeView {
    pub trade_id: crate::order::TradeId,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl From<&Trade> for TradeView {
    fn from(t: &Trade) -> Self {
        Self {
            trade_id: t.trade_id,
            price: t.price,
            quantity: t.quantity,
            aggressor_side: t.aggressor_side,
            maker_order_id: t.maker_order_id,
            taker_order_id: t.taker_order_id,
            maker_fee: t.maker_fee,
            taker_fee: t.taker_fee,
        }
    }
}

fn parse_positive_decimal(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let value = Decimal::from_str(raw).map_err(|_| ValidationError::BadDecimal {
        field,
        value: raw.to_string(),
    })?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositive {
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn parse_order_type(raw: &str) -> Result<OrderType, ValidationError> {
    match raw {
        "market" => Ok(OrderType::Market),
        "limit" => Ok(OrderType::Limit),
        "ioc" => Ok(OrderType::Ioc),
        "fok" => Ok(OrderType::Fok),
        "stop_market" => Ok(OrderType::StopMarket),
        "stop_limit" => Ok(OrderType::StopLimit),
        "take_profit" => Ok(OrderType::TakeProfit),
        other => Err(ValidationError::UnknownOrderType(other.to_string())),
    }
}

fn parse_side(raw: &str) -> Result<Side, ValidationError> {
    match raw {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(ValidationError::UnknownSide(other.to_string())),
    }
}

impl SubmissionRequest {
    /// Validates the request and builds a core [`Order`], per §6's field
    /// requirements: `price` is required for limit/ioc/fok/stop_limit;
    /// `trigger_price` is required for stop_market/stop_limit/take_profit.
    pub fn into_order(self) -> Result<Order, ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::InvalidSymbol(self.symbol));
        }
        let order_type = parse_order_type(&self.order_type)?;
        let side = parse_side(&self.side)?;
        let quantity = parse_positive_decimal("quantity", &self.quantity)?;

        let needs_price = matches!(
            order_type,
            OrderType::Limit | OrderType::Ioc | OrderType::Fok | OrderType::StopLimit
        );
        let price = match (&self.price, needs_price) {
            (Some(raw), _) => Some(parse_positive_decimal("price", raw)?),
            (None, true) => {
                return Err(ValidationError::MissingField {
                    order_type: order_type_name(order_type),
                    field: "price",
                });
            }
            (None, false) => None,
        };

        let needs_trigger = order_type.is_trigger();
        let trigger_price = match (&self.trigger_price, needs_trigger) {
            (Some(raw), _) => Some(parse_positive_decimal("trigger_price", raw)?),
            (None, true) => {
                return Err(ValidationError::MissingField {
                    order_type: order_type_name(order_type),
                    field: "trigger_price",
                });
            }
            (None, false) => None,
        };

        Ok(Order {
            symbol: self.symbol,
            side,
            order_type,
            quantity,
            price,
            trigger_price,
            order_id: OrderId::new(),
            ts_ns: now_ns(),
        })
    }
}

fn order_type_name(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "market",
        OrderType::Limit => "limit",
        OrderType::Ioc => "ioc",
        OrderType::Fok => "fok",
        OrderType::StopMarket => "stop_market",
        OrderType::StopLimit => "stop_limit",
        OrderType::TakeProfit => "take_profit",
    }
}

/// Wire-level cancellation request, per §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationRequest {
    pub symbol: String,
    pub order_id: OrderId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> SubmissionRequest {
        SubmissionRequest {
            symbol: "BTC-USDT".to_string(),
            order_type: "limit".to_string(),
            side: "buy".to_string(),
            quantity: "1.5".to_string(),
            price: Some("100".to_string()),
            trigger_price: None,
        }
    }

    #[test]
    fn valid_limit_order_parses() {
        let order = base_request().into_order().unwrap();
        assert_eq!(order.quantity, Decimal::from_str("1.5").unwrap());
        assert_eq!(order.price, Some(Decimal::from_str("100").unwrap()));
    }

    #[test]
    fn limit_without_price_is_rejected() {
        let mut req = base_request();
        req.price = None;
        let err = req.into_order().unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field: "price", .. }));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut req = base_request();
        req.quantity = "-1".to_string();
        assert!(matches!(
            req.into_order().unwrap_err(),
            ValidationError::NonPositive { field: "quantity", .. }
        ));
    }

    #[test]
    fn garbage_decimal_is_rejected() {
        let mut req = base_request();
        req.quantity = "not-a-number".to_string();
        assert!(matches!(
            req.into_order().unwrap_err(),
            ValidationError::BadDecimal { field: "quantity", .. }
        ));
    }

    #[test]
    fn market_order_requires_no_price() {
        let req = SubmissionRequest {
            symbol: "BTC-USDT".to_string(),
            order_type: "market".to_string(),
            side: "sell".to_string(),
            quantity: "2".to_string(),
            price: None,
            trigger_price: None,
        };
        let order = req.into_order().unwrap();
        assert_eq!(order.price, None);
    }

    #[test]
    fn stop_market_requires_trigger_price() {
        let req = SubmissionRequest {
            symbol: "BTC-USDT".to_string(),
            order_type: "stop_market".to_string(),
            side: "buy".to_string(),
            quantity: "1".to_string(),
            price: None,
            trigger_price: None,
        };
        let err = req.into_order().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField { field: "trigger_price", .. }
        ));
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let mut req = base_request();
        req.symbol = "  ".to_string();
        assert!(matches!(
            req.into_order().unwrap_err(),
            ValidationError::InvalidSymbol(_)
        ));
    }
}
