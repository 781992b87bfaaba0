//! Error types for the engine core and its adapter-facing validation layer.

use std::fmt;

/// Internal invariant violations inside the matching core.
///
/// The core prevents these through admission checks performed upstream
/// (see [`crate::error::ValidationError`]) and through invariants enforced
/// internally; surfacing one of these means a prior invariant was broken,
/// which is a bug rather than a recoverable condition.
#[derive(Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// A price level's aggregate quantity drifted negative.
    NegativeAggregate {
        symbol: String,
        price: String,
    },
    /// A snapshot or trigger-store entry referenced a symbol that does not
    /// exist.
    UnknownSymbol(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NegativeAggregate { symbol, price } => {
                write!(
                    f,
                    "price level aggregate went negative for {symbol} at {price}"
                )
            }
            EngineError::UnknownSymbol(symbol) => write!(f, "unknown symbol: {symbol}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Admission-layer validation errors, raised by the thin request adapter
/// (`crate::api`) before an `Order` ever reaches the matching core.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// A decimal-string field did not parse.
    BadDecimal { field: &'static str, value: String },
    /// A quantity or price field was zero or negative.
    NonPositive { field: &'static str, value: String },
    /// A field required for this `order_type` was missing.
    MissingField {
        order_type: &'static str,
        field: &'static str,
    },
    /// The order type string did not match a known variant.
    UnknownOrderType(String),
    /// The side string did not match `buy` or `sell`.
    UnknownSide(String),
    /// The symbol string was empty or otherwise malformed.
    InvalidSymbol(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BadDecimal { field, value } => {
                write!(f, "invalid decimal for {field}: {value:?}")
            }
            ValidationError::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            ValidationError::MissingField { order_type, field } => {
                write!(f, "{field} is required for order_type {order_type}")
            }
            ValidationError::UnknownOrderType(s) => write!(f, "unknown order_type: {s:?}"),
            ValidationError::UnknownSide(s) => write!(f, "unknown side: {s:?}"),
            ValidationError::InvalidSymbol(s) => write!(f, "invalid symbol: {s:?}"),
        }
    }
}

impl std::error::Error for ValidationError {}
