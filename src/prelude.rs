//! Prelude module that re-exports the commonly used types from this crate.
//!
//! ```rust
//! use matchbook_core::prelude::*;
//! ```

pub use crate::api::{CancellationRequest, SubmissionRequest, SubmissionResponse, TradeView};
pub use crate::config::EngineConfig;
pub use crate::engine::{DepthSnapshot, MatchingEngine};
pub use crate::error::{EngineError, ValidationError};
pub use crate::events::{EngineEvent, EventFanout, MarketDataEvent, SubscriptionId, TradeEvent};
pub use crate::fees::FeeSchedule;
pub use crate::order::{Order, OrderId, OrderType, Side, TradeId};
pub use crate::order_book::{Bbo, DepthView, OrderBook};
pub use crate::trade::Trade;
