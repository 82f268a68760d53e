//! # Hedge Ledger and Sizing
//!
//! Book-keeping for the engine's delta-neutralizing share positions.
//!
//! ## Description
//! The controller tracks, per underlying, the cumulative share quantity
//! committed for delta neutrality (`hedge ledger`), a diagnostic accumulator
//! of per-trade delta exposures, and the valuation at which each underlying
//! was last rehedged. It decides *whether* and *by how much* to adjust; the
//! [`crate::MarketMaker`] routes the resulting orders through the execution
//! callback and commits the ledger only on success.

use std::collections::HashMap;

use vomma_models::{Price, Quantity, UnderlyingId};

/// Minimum share quantity worth sending to the execution callback.
pub const MIN_HEDGE: f64 = 0.05;
/// Residual delta above which a rehedge triggers.
pub const HEDGE_TH: f64 = 0.03;
/// Minimum underlying move per step before the hedge is reconsidered.
pub const GAMMA_SCALP_TH: f64 = 0.005;

/// Per-underlying hedge state.
#[derive(Debug, Default)]
pub struct HedgeController {
    /// Cumulative signed share quantity committed for delta neutrality.
    hedge_pos: HashMap<UnderlyingId, Quantity>,
    /// Running sum of per-trade delta exposures. Diagnostic only; hedging
    /// decisions are driven by the live portfolio delta instead.
    target_deltas: HashMap<UnderlyingId, f64>,
    /// Valuation at the most recent per-step rehedge pass.
    last_hedge: HashMap<UnderlyingId, Price>,
}

impl HedgeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed hedge quantity, zero when never hedged.
    pub fn ledger(&self, underlying_id: UnderlyingId) -> Quantity {
        self.hedge_pos.get(&underlying_id).copied().unwrap_or(0.0)
    }

    /// Accumulates the delta exposure introduced by a single option trade.
    pub fn record_target(&mut self, underlying_id: UnderlyingId, exposure: f64) {
        *self.target_deltas.entry(underlying_id).or_insert(0.0) += exposure;
    }

    /// Accumulated per-trade exposure (diagnostic).
    pub fn target(&self, underlying_id: UnderlyingId) -> f64 {
        self.target_deltas
            .get(&underlying_id)
            .copied()
            .unwrap_or(0.0)
    }

    /// Ledger adjustment needed to reach `target`, or `None` when the
    /// difference is below [`MIN_HEDGE`].
    pub fn adjustment(&self, underlying_id: UnderlyingId, target: f64) -> Option<Quantity> {
        let trade = target - self.ledger(underlying_id);
        if trade.abs() < MIN_HEDGE {
            return None;
        }
        Some(trade)
    }

    /// Applies a successful hedge trade to the ledger.
    pub fn commit(&mut self, underlying_id: UnderlyingId, adjustment: Quantity) {
        *self.hedge_pos.entry(underlying_id).or_insert(0.0) += adjustment;
    }

    /// Records the valuation at which this underlying was last rehedged.
    pub fn mark_hedged(&mut self, underlying_id: UnderlyingId, valuation: Price) {
        self.last_hedge.insert(underlying_id, valuation);
    }

    /// Valuation at the most recent rehedge pass, if any.
    pub fn last_hedged(&self, underlying_id: UnderlyingId) -> Option<Price> {
        self.last_hedge.get(&underlying_id).copied()
    }

    /// True when the residual delta is large enough to act on.
    pub fn needs_rehedge(net_delta: f64) -> bool {
        net_delta.abs() > HEDGE_TH
    }

    /// True when the underlying has moved enough since the last mark for the
    /// per-step pass to reconsider its hedge.
    pub fn scalp_triggered(move_since_mark: f64) -> bool {
        move_since_mark.abs() >= GAMMA_SCALP_TH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_defaults_to_flat() {
        let hedger = HedgeController::new();
        assert_eq!(hedger.ledger(1), 0.0);
        assert_eq!(hedger.target(1), 0.0);
        assert_eq!(hedger.last_hedged(1), None);
    }

    #[test]
    fn test_adjustment_suppressed_below_minimum() {
        let mut hedger = HedgeController::new();
        hedger.commit(1, 0.60);
        assert_eq!(hedger.adjustment(1, 0.62), None);
        let adj = hedger.adjustment(1, 0.70).expect("0.1 is above MIN_HEDGE");
        assert!((adj - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_commit_accumulates() {
        let mut hedger = HedgeController::new();
        hedger.commit(1, 0.5);
        hedger.commit(1, -0.2);
        assert!((hedger.ledger(1) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_target_accumulates_independently_of_ledger() {
        let mut hedger = HedgeController::new();
        hedger.record_target(1, 0.6);
        hedger.record_target(1, -0.1);
        assert!((hedger.target(1) - 0.5).abs() < 1e-12);
        assert_eq!(hedger.ledger(1), 0.0);
    }

    #[test]
    fn test_thresholds() {
        assert!(!HedgeController::needs_rehedge(0.03));
        assert!(HedgeController::needs_rehedge(0.031));
        assert!(HedgeController::needs_rehedge(-0.04));

        assert!(!HedgeController::scalp_triggered(0.004));
        assert!(HedgeController::scalp_triggered(0.005));
        assert!(HedgeController::scalp_triggered(-0.01));
    }
}
