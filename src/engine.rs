//! Per-symbol matching coordinator (C3): intake, matching, resting,
//! cancellation, trigger store, and snapshot/restore, per §4.3.
//!
//! Grounded in the teacher crate's `OrderBookManager` family
//! (`src/orderbook/manager.rs`) for the "one entry per symbol behind its
//! own synchronization" shape, generalized from a `HashMap` behind one
//! outer lock to a `DashMap<String, Arc<Mutex<SymbolState>>>` so that
//! distinct symbols never contend with each other (§5: "operations on a
//! single symbol are mutually exclusive... operations on distinct symbols
//! proceed in parallel").
//!
//! Trigger activation follows the deferred-drain redesign that §9 names as
//! canonical: triggers fired while the per-symbol lock is held are
//! collected into a local list and submitted as ordinary child submissions
//! only after the lock is released, avoiding the need for a reentrant
//! mutex and guaranteeing the parent's own events are emitted first.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::events::{EngineEvent, EventFanout, MarketDataEvent, TradeEvent};
use crate::fees::FeeSchedule;
use crate::order::{Order, OrderId, OrderType, Side, TradeId};
use crate::order_book::OrderBook;
use crate::snapshot::{self, BookSnapshot, SnapshotError};
use crate::trade::Trade;
use crate::trigger::TriggerStore;
use crate::utils::{iso8601_micros_now, now_ns};

/// Per-symbol mutable state: the book, the trigger store, and the last
/// traded price used to evaluate trigger conditions.
#[derive(Default)]
struct SymbolState {
    book: OrderBook,
    triggers: TriggerStore,
    last_price: Option<Decimal>,
}

/// A top-10 depth projection plus timestamp, per §4.3's `snapshot` contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub symbol: String,
    pub timestamp: String,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

/// The matching engine: owns every symbol's book and trigger store, and
/// the event fan-out shared across all of them.
pub struct MatchingEngine {
    symbols: DashMap<String, Arc<Mutex<SymbolState>>>,
    fanout: Arc<EventFanout>,
    fees: FeeSchedule,
    state_dir: PathBuf,
}

impl MatchingEngine {
    /// Creates an engine with an explicit fee schedule, fan-out, and
    /// snapshot directory.
    #[must_use]
    pub fn new(fees: FeeSchedule, fanout: Arc<EventFanout>, state_dir: PathBuf) -> Self {
        Self {
            symbols: DashMap::new(),
            fanout,
            fees,
            state_dir,
        }
    }

    /// Creates an engine from an [`EngineConfig`], constructing its own
    /// fan-out sized per `subscriber_queue_capacity`.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.fee_schedule(),
            Arc::new(EventFanout::with_capacity(config.subscriber_queue_capacity)),
            config.state_dir.clone(),
        )
    }

    /// The shared event fan-out, for subscribing to market-data/trade topics.
    #[must_use]
    pub fn fanout(&self) -> &Arc<EventFanout> {
        &self.fanout
    }

    fn symbol_lock(&self, symbol: &str) -> Arc<Mutex<SymbolState>> {
        self.symbols
            .entry(symbol.to_string())
            .or_insert_with(|| {
                info!(symbol, "book created");
                Arc::new(Mutex::new(SymbolState::default()))
            })
            .clone()
    }

    /// Submits a validated order. Returns the trades it produced, in
    /// execution order, and the resting residual order if any remainder
    /// was posted to the book.
    ///
    /// Triggers fired by this submission's trades are drained and
    /// resubmitted as ordinary child orders after this call's own lock is
    /// released — see the module docs and §9.
    pub fn submit(&self, order: Order) -> (Vec<Trade>, Option<Order>) {
        let lock = self.symbol_lock(&order.symbol);
        let symbol = order.symbol.clone();
        let (trades, resting, fired) = {
            let mut state = lock.lock().unwrap();
            self.match_locked(&mut state, order)
        };
        for child in fired {
            debug!(symbol = %symbol, order_id = %child.order_id, "trigger fired, submitting child order");
            self.submit(child);
        }
        (trades, resting)
    }

    /// Cancels a live resting order from either half-book or the trigger
    /// store. Returns whether one was found.
    pub fn cancel(&self, symbol: &str, order_id: OrderId) -> bool {
        let Some(entry) = self.symbols.get(symbol) else {
            return false;
        };
        let lock = entry.clone();
        drop(entry);
        let mut state = lock.lock().unwrap();
        state.book.bids.remove_order(order_id)
            || state.book.asks.remove_order(order_id)
            || state.triggers.remove(order_id)
    }

    /// A non-mutating top-10 depth projection for `symbol`. Symbols never
    /// submitted to return an empty book rather than an error.
    #[must_use]
    pub fn snapshot(&self, symbol: &str) -> DepthSnapshot {
        let depth = match self.symbols.get(symbol) {
            Some(entry) => {
                let lock = entry.clone();
                drop(entry);
                let state = lock.lock().unwrap();
                state.book.depth(10)
            }
            None => crate::order_book::DepthView {
                bids: Vec::new(),
                asks: Vec::new(),
            },
        };
        DepthSnapshot {
            symbol: symbol.to_string(),
            timestamp: iso8601_micros_now(),
            bids: depth.bids,
            asks: depth.asks,
        }
    }

    /// Dumps a symbol's book and trigger store to its snapshot file.
    /// A symbol that has never been submitted to is a no-op.
    pub fn save_state(&self, symbol: &str) -> Result<(), SnapshotError> {
        let Some(entry) = self.symbols.get(symbol) else {
            return Ok(());
        };
        let lock = entry.clone();
        drop(entry);
        let state = lock.lock().unwrap();
        let snapshot = BookSnapshot {
            symbol: symbol.to_string(),
            bids: state.book.bids.snapshot_levels(),
            asks: state.book.asks.snapshot_levels(),
            triggers: state.triggers.snapshot(),
        };
        drop(state);
        snapshot::save_to_file(&self.state_dir, &snapshot)
    }

    /// Restores a symbol's book and trigger store from its snapshot file,
    /// replacing the in-memory state atomically under the symbol's lock
    /// and then emitting a depth event. Returns `false` (leaving the
    /// existing in-memory book untouched) if no snapshot exists or it
    /// fails validation — snapshots are advisory, per §4.5/§7.
    pub fn load_state(&self, symbol: &str) -> bool {
        let restored = match snapshot::load_from_file(&self.state_dir, symbol) {
            Ok(Some(snapshot)) => snapshot,
            _ => return false,
        };
        let lock = self.symbol_lock(symbol);
        let depth = {
            let mut state = lock.lock().unwrap();
            let mut book = OrderBook::new();
            for (_price, orders) in restored.bids {
                for order in orders {
                    book.bids.add(order);
                }
            }
            for (_price, orders) in restored.asks {
                for order in orders {
                    book.asks.add(order);
                }
            }
            let mut triggers = TriggerStore::new();
            triggers.restore(restored.triggers);
            state.book = book;
            state.triggers = triggers;
            state.book.depth(10)
        };
        self.emit_depth_view(symbol, depth);
        true
    }

    /// The matching algorithm of §4.3.1, run with the symbol's lock held.
    fn match_locked(
        &self,
        state: &mut SymbolState,
        mut order: Order,
    ) -> (Vec<Trade>, Option<Order>, Vec<Order>) {
        if order.order_type.is_trigger() {
            state.triggers.park(order);
            return (Vec::new(), None, Vec::new());
        }

        if order.order_type == OrderType::Fok {
            let available = Self::fok_available(&state.book, &order);
            if available < order.quantity {
                trace!(symbol = %order.symbol, "fok order killed: insufficient liquidity");
                return (Vec::new(), None, Vec::new());
            }
        }

        let mut trades = Vec::new();
        let mut fired = Vec::new();
        while order.quantity > Decimal::ZERO {
            let opposing = state.book.opposing(order.side);
            let Some(best_price) = opposing.best_price() else {
                break;
            };
            if !order.crossable_with(best_price) {
                break;
            }
            let Some(head) = opposing.pop_best_order() else {
                break;
            };
            let exec_qty = order.quantity.min(head.quantity);
            let exec_price = best_price;
            opposing.apply_fill(exec_price, head.order_id, exec_qty);
            order.quantity -= exec_qty;

            let maker_fee = self.fees.calculate_fee(exec_qty, exec_price, true);
            let taker_fee = self.fees.calculate_fee(exec_qty, exec_price, false);
            let trade = Trade {
                symbol: order.symbol.clone(),
                trade_id: TradeId::new(),
                price: exec_price,
                quantity: exec_qty,
                aggressor_side: order.side,
                maker_order_id: head.order_id,
                taker_order_id: order.order_id,
                maker_fee,
                taker_fee,
                ts_ns: now_ns(),
            };
            self.emit_trade(&trade);
            trades.push(trade);

            state.last_price = Some(exec_price);
            fired.extend(state.triggers.drain_fired(exec_price));
        }

        let resting = if order.quantity > Decimal::ZERO && order.order_type == OrderType::Limit {
            let residual = order.clone();
            state.book.resting_side(residual.side).add(residual.clone());
            Some(residual)
        } else {
            None
        };

        let depth = state.book.depth(10);
        self.emit_depth_view(&order.symbol, depth);

        (trades, resting, fired)
    }

    /// Sum of opposing-side quantity crossable with `order`, scanning
    /// price levels outward from the best; stops at the first
    /// non-crossable level since crossability only gets worse moving away
    /// from the best price.
    fn fok_available(book: &OrderBook, order: &Order) -> Decimal {
        let mut total = Decimal::ZERO;
        for (price, qty) in book.opposing(order.side).aggregate(usize::MAX) {
            if order.crossable_with(price) {
                total += qty;
            } else {
                break;
            }
        }
        total
    }

    fn emit_trade(&self, trade: &Trade) {
        let event = EngineEvent::Trade(TradeEvent {
            timestamp: iso8601_micros_now(),
            symbol: trade.symbol.clone(),
            trade_id: trade.trade_id,
            price: trade.price,
            quantity: trade.quantity,
            aggressor_side: trade.aggressor_side,
            maker_order_id: trade.maker_order_id,
            taker_order_id: trade.taker_order_id,
            maker_fee: trade.maker_fee,
            taker_fee: trade.taker_fee,
        });
        self.fanout.publish(&EventFanout::trade_topic(&trade.symbol), event);
    }

    fn emit_depth_view(&self, symbol: &str, depth: crate::order_book::DepthView) {
        let event = EngineEvent::MarketData(MarketDataEvent {
            timestamp: iso8601_micros_now(),
            symbol: symbol.to_string(),
            bids: depth.bids,
            asks: depth.asks,
        });
        self.fanout
            .publish(&EventFanout::market_data_topic(symbol), event);
    }
}
