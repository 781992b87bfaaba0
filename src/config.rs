//! Engine configuration, per §6: `maker_fee_bps`, `taker_fee_bps`,
//! `state_dir`, plus the fan-out queue capacity from §4.4.
//!
//! Loading configuration from a file or environment is an adapter-layer
//! concern and out of scope for the core (§1); `from_toml_str` is kept
//! thin — a convenience parse into this struct's shape, nothing more.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::events::DEFAULT_QUEUE_CAPACITY;
use crate::fees::FeeSchedule;

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maker fee in basis points. Default 10 (§6).
    #[serde(default = "default_maker_bps")]
    pub maker_fee_bps: i32,
    /// Taker fee in basis points. Default 20 (§6).
    #[serde(default = "default_taker_bps")]
    pub taker_fee_bps: i32,
    /// Directory snapshot files are written to and read from.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Bounded capacity of each subscriber queue in the event fan-out.
    #[serde(default = "default_queue_capacity")]
    pub subscriber_queue_capacity: usize,
}

fn default_maker_bps() -> i32 {
    10
}
fn default_taker_bps() -> i32 {
    20
}
fn default_state_dir() -> PathBuf {
    PathBuf::from("./state")
}
fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl EngineConfig {
    /// The fee schedule derived from this configuration.
    #[must_use]
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.maker_fee_bps, self.taker_fee_bps)
    }

    /// Parses a TOML document into an `EngineConfig`, filling in defaults
    /// for any field the document omits.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            maker_fee_bps: default_maker_bps(),
            taker_fee_bps: default_taker_bps(),
            state_dir: default_state_dir(),
            subscriber_queue_capacity: default_queue_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_configuration_section() {
        let config = EngineConfig::default();
        assert_eq!(config.maker_fee_bps, 10);
        assert_eq!(config.taker_fee_bps, 20);
        assert_eq!(config.subscriber_queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let config = EngineConfig::from_toml_str(r#"taker_fee_bps = 30"#).unwrap();
        assert_eq!(config.maker_fee_bps, 10);
        assert_eq!(config.taker_fee_bps, 30);
    }

    #[test]
    fn full_toml_round_trips() {
        let toml_str = r#"
            maker_fee_bps = 5
            taker_fee_bps = 15
            state_dir = "/tmp/engine-state"
            subscriber_queue_capacity = 500
        "#;
        let config = EngineConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.maker_fee_bps, 5);
        assert_eq!(config.state_dir, PathBuf::from("/tmp/engine-state"));
        assert_eq!(config.subscriber_queue_capacity, 500);
    }
}
