//! Fee schedule implementation for engine trading fees.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configurable fee schedule for maker and taker fees.
///
/// Fees are expressed in basis points (bps), where 1 bps = 0.01% = 0.0001.
/// Per trade: `fee = quantity * exec_price * bps / 10_000`, computed in
/// exact decimal arithmetic (no floating point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Maker fee in basis points.
    pub maker_fee_bps: i32,
    /// Taker fee in basis points.
    pub taker_fee_bps: i32,
}

impl FeeSchedule {
    /// Creates a new fee schedule.
    #[must_use]
    pub fn new(maker_fee_bps: i32, taker_fee_bps: i32) -> Self {
        Self {
            maker_fee_bps,
            taker_fee_bps,
        }
    }

    /// Computes the fee for one side of a fill.
    ///
    /// `quantity * exec_price * bps / 10_000`, in exact decimal arithmetic.
    #[must_use]
    pub fn calculate_fee(&self, quantity: Decimal, exec_price: Decimal, is_maker: bool) -> Decimal {
        let bps = if is_maker {
            self.maker_fee_bps
        } else {
            self.taker_fee_bps
        };
        quantity * exec_price * Decimal::from(bps) / Decimal::from(10_000)
    }

    /// A zero-fee schedule.
    #[must_use]
    pub fn zero_fee() -> Self {
        Self::new(0, 0)
    }
}

impl Default for FeeSchedule {
    /// Matches the configuration defaults in spec §6: 10 bps maker, 20 bps taker.
    fn default() -> Self {
        Self::new(10, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fee_schedule_creation() {
        let schedule = FeeSchedule::new(10, 20);
        assert_eq!(schedule.maker_fee_bps, 10);
        assert_eq!(schedule.taker_fee_bps, 20);
    }

    #[test]
    fn zero_fee_schedule_charges_nothing() {
        let schedule = FeeSchedule::zero_fee();
        assert_eq!(schedule.calculate_fee(dec!(1), dec!(100), true), dec!(0));
        assert_eq!(schedule.calculate_fee(dec!(1), dec!(100), false), dec!(0));
    }

    #[test]
    fn spec_fee_calculation_example() {
        // Trade of 0.5 @ 200 with maker_bps=10, taker_bps=20 yields
        // maker_fee = 0.1, taker_fee = 0.2 exactly.
        let schedule = FeeSchedule::new(10, 20);
        let maker_fee = schedule.calculate_fee(dec!(0.5), dec!(200), true);
        let taker_fee = schedule.calculate_fee(dec!(0.5), dec!(200), false);
        assert_eq!(maker_fee, dec!(0.1));
        assert_eq!(taker_fee, dec!(0.2));
    }

    #[test]
    fn default_matches_configuration_defaults() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.maker_fee_bps, 10);
        assert_eq!(schedule.taker_fee_bps, 20);
    }

    #[test]
    fn serialization_round_trips() {
        let schedule = FeeSchedule::new(5, 15);
        let json = serde_json::to_string(&schedule).unwrap();
        let deserialized: FeeSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, deserialized);
    }
}
