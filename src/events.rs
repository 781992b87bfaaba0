//! Topic-keyed event fan-out to market-data and trade subscribers (C4).
//!
//! Grounded in the teacher crate's `BookManagerTokio` (`src/orderbook/manager.rs`),
//! which routes book events to subscribers over `tokio::sync::mpsc` channels,
//! and in `examples/original_source/engine/matching_engine.py`'s `Broadcaster`,
//! which keys subscriber lists by topic string and drops messages for any
//! subscriber whose queue is full rather than blocking the matching loop.
//!
//! The subscriber table is a `DashMap<String, Vec<Subscription>>` so that
//! topics are independent and the lock held during `publish` is only the
//! per-topic shard lock `DashMap` already takes internally — snapshotting
//! the subscriber list is the only work done while any lock is held;
//! `try_send` into each queue happens after the snapshot is cloned out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::trace;
use uuid::Uuid;

use crate::order::{OrderId, Side, TradeId};

/// Default bounded capacity for a subscriber queue, per §4.4.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// A depth market-data event for one symbol, per §4.3.5 / §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataEvent {
    pub timestamp: String,
    pub symbol: String,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

/// A trade event for one symbol, per §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub timestamp: String,
    pub symbol: String,
    pub trade_id: TradeId,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

/// Either event kind delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    MarketData(MarketDataEvent),
    Trade(TradeEvent),
}

/// Opaque handle returned by `subscribe`, used to `unsubscribe` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

struct Subscription {
    id: SubscriptionId,
    sender: Sender<EngineEvent>,
}

/// Topic → subscriber-list broadcaster. One instance is shared by the whole
/// engine across all symbols; topics are independent of each other.
pub struct EventFanout {
    topics: dashmap::DashMap<String, Vec<Subscription>>,
    queue_capacity: usize,
}

impl EventFanout {
    /// Creates a fan-out with the default queue capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a fan-out whose subscriber queues hold `capacity` events
    /// before new publishes to that subscriber are dropped.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: dashmap::DashMap::new(),
            queue_capacity: capacity,
        }
    }

    /// The conventional market-data topic name for a symbol.
    #[must_use]
    pub fn market_data_topic(symbol: &str) -> String {
        format!("marketdata:{symbol}")
    }

    /// The conventional trade-event topic name for a symbol.
    #[must_use]
    pub fn trade_topic(symbol: &str) -> String {
        format!("trades:{symbol}")
    }

    /// Registers a fresh bounded queue under `topic`, returning its id and
    /// the receiving half.
    pub fn subscribe(&self, topic: &str) -> (SubscriptionId, Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = SubscriptionId(Uuid::new_v4());
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscription { id, sender: tx });
        (id, rx)
    }

    /// Deregisters a subscription. The receiver may keep draining whatever
    /// was already enqueued; no further messages are delivered to it.
    pub fn unsubscribe(&self, topic: &str, id: SubscriptionId) {
        if let Some(mut subs) = self.topics.get_mut(topic) {
            subs.retain(|s| s.id != id);
        }
    }

    /// Non-blockingly delivers `event` to every current subscriber of
    /// `topic`. Subscribers with a full queue silently miss this message;
    /// matching never waits on a slow consumer.
    pub fn publish(&self, topic: &str, event: EngineEvent) {
        let Some(subs) = self.topics.get(topic) else {
            return;
        };
        // Clone the sender handles out from under the shard lock; the
        // DashMap guard is dropped here, before any `try_send` runs.
        let senders: Vec<Sender<EngineEvent>> = subs.iter().map(|s| s.sender.clone()).collect();
        drop(subs);
        for sender in senders {
            // Drops are expected under overload and are not logged on this
            // path: logging here would itself become a backpressure source.
            let _ = sender.try_send(event.clone());
        }
        trace!(topic, "published event");
    }

    /// Number of live subscribers across a topic, for diagnostics/tests.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_market_data() -> EngineEvent {
        EngineEvent::MarketData(MarketDataEvent {
            timestamp: "2026-01-01T00:00:00.000000Z".to_string(),
            symbol: "BTC-USDT".to_string(),
            bids: vec![],
            asks: vec![],
        })
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let fanout = EventFanout::new();
        let (_id, mut rx) = fanout.subscribe("marketdata:BTC-USDT");
        fanout.publish("marketdata:BTC-USDT", sample_market_data());
        let received = rx.recv().await.unwrap();
        assert_eq!(received, sample_market_data());
    }

    #[tokio::test]
    async fn unsubscribe_stops_further_delivery() {
        let fanout = EventFanout::new();
        let (id, mut rx) = fanout.subscribe("marketdata:BTC-USDT");
        fanout.unsubscribe("marketdata:BTC-USDT", id);
        fanout.publish("marketdata:BTC-USDT", sample_market_data());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_queue_drops_silently_without_blocking() {
        let fanout = EventFanout::with_capacity(1);
        let (_id, mut rx) = fanout.subscribe("marketdata:BTC-USDT");
        fanout.publish("marketdata:BTC-USDT", sample_market_data());
        fanout.publish("marketdata:BTC-USDT", sample_market_data());
        // Queue capacity 1: the second publish is dropped, not queued.
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_a_no_op() {
        let fanout = EventFanout::new();
        fanout.publish("marketdata:BTC-USDT", sample_market_data());
        assert_eq!(fanout.subscriber_count("marketdata:BTC-USDT"), 0);
    }

    #[tokio::test]
    async fn ordering_is_preserved_per_subscriber() {
        let fanout = EventFanout::new();
        let (_id, mut rx) = fanout.subscribe("trades:BTC-USDT");
        for i in 0..5u64 {
            fanout.publish(
                "trades:BTC-USDT",
                EngineEvent::Trade(TradeEvent {
                    timestamp: "2026-01-01T00:00:00.000000Z".to_string(),
                    symbol: "BTC-USDT".to_string(),
                    trade_id: TradeId::new(),
                    price: Decimal::from(i),
                    quantity: Decimal::ONE,
                    aggressor_side: Side::Buy,
                    maker_order_id: OrderId::new(),
                    taker_order_id: OrderId::new(),
                    maker_fee: Decimal::ZERO,
                    taker_fee: Decimal::ZERO,
                }),
            );
        }
        for i in 0..5u64 {
            let EngineEvent::Trade(t) = rx.recv().await.unwrap() else {
                panic!("expected trade event");
            };
            assert_eq!(t.price, Decimal::from(i));
        }
    }
}
