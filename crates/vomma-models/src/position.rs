//! # Position Ledger
//!
//! Mutable inventory of option contracts and underlying shares.

use std::collections::HashMap;

use crate::{OptionId, Quantity, UnderlyingId};

/// Signed per-instrument inventory.
///
/// Contract counts are whole numbers; share quantities are reals rounded to
/// two decimals on every increment so repeated fractional hedge fills cannot
/// accumulate sub-cent dust.
#[derive(Debug, Default, Clone)]
pub struct Position {
    options: HashMap<OptionId, i64>,
    underlyings: HashMap<UnderlyingId, Quantity>,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books a signed contract quantity against an option.
    pub fn add_option(&mut self, option_id: OptionId, quantity: i64) {
        *self.options.entry(option_id).or_insert(0) += quantity;
    }

    /// Books a signed share quantity against an underlying.
    ///
    /// The increment is rounded to two decimals before being applied.
    pub fn add_underlying(&mut self, underlying_id: UnderlyingId, quantity: Quantity) {
        let rounded = (quantity * 100.0).round() / 100.0;
        *self.underlyings.entry(underlying_id).or_insert(0.0) += rounded;
    }

    /// Current signed contract count, zero when never traded.
    pub fn option_qty(&self, option_id: OptionId) -> i64 {
        self.options.get(&option_id).copied().unwrap_or(0)
    }

    /// Current signed share quantity, zero when never traded.
    pub fn underlying_qty(&self, underlying_id: UnderlyingId) -> Quantity {
        self.underlyings.get(&underlying_id).copied().unwrap_or(0.0)
    }

    /// All option entries, including flat ones.
    pub fn options(&self) -> &HashMap<OptionId, i64> {
        &self.options
    }

    /// All underlying entries, including flat ones.
    pub fn underlyings(&self) -> &HashMap<UnderlyingId, Quantity> {
        &self.underlyings
    }

    /// Number of option lines with a non-zero count.
    pub fn open_option_count(&self) -> usize {
        self.options.values().filter(|q| **q != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_additivity() {
        let mut pos = Position::new();
        pos.add_option(1001, 1);
        pos.add_option(1001, 1);
        pos.add_option(1001, -1);
        assert_eq!(pos.option_qty(1001), 1);
        assert_eq!(pos.option_qty(9999), 0);
    }

    #[test]
    fn test_underlying_increment_rounding() {
        let mut pos = Position::new();
        pos.add_underlying(1, 0.333);
        pos.add_underlying(1, 0.333);
        // Each increment rounds to 0.33 before accumulating.
        assert!((pos.underlying_qty(1) - 0.66).abs() < 1e-12);
    }

    #[test]
    fn test_open_option_count_skips_flat() {
        let mut pos = Position::new();
        pos.add_option(1, 1);
        pos.add_option(2, 1);
        pos.add_option(2, -1);
        assert_eq!(pos.open_option_count(), 1);
    }
}
