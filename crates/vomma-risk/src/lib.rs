//! # Risk Supervision Module
//!
//! Drawdown-triggered quote suppression with hysteresis.
//!
//! ## Description
//! The guard watches mark-to-market portfolio value on every quote request.
//! Once value falls through the loss floor the engine enters safe mode and
//! withdraws from the market (the caller substitutes a sentinel quote). Safe
//! mode is sticky: it releases only after the portfolio recovers to half the
//! floor, so a book oscillating around the limit does not flap between
//! quoting and withdrawal.
//!
//! The guard is observable state, not an error channel; evaluating it never
//! fails.

use tracing::{info, warn};

/// Default portfolio-value floor at which safe mode engages.
pub const MAX_LOSS: f64 = -50_000.0;

/// Fraction of the floor the portfolio must recover to before safe mode
/// releases.
const RECOVERY_FRAC: f64 = 0.5;

/// Two-state safe-mode machine with hysteresis.
#[derive(Debug)]
pub struct DrawdownGuard {
    /// Portfolio-value floor, strictly negative.
    max_loss: f64,
    engaged: bool,
}

impl DrawdownGuard {
    pub fn new(max_loss: f64) -> Self {
        Self {
            max_loss,
            engaged: false,
        }
    }

    /// Feeds the current portfolio value through the state machine.
    ///
    /// # Returns
    /// `true` when quoting must be suppressed for this request.
    pub fn evaluate(&mut self, portfolio_value: f64) -> bool {
        if portfolio_value < self.max_loss {
            if !self.engaged {
                warn!(
                    portfolio_value,
                    max_loss = self.max_loss,
                    "loss floor breached, entering safe mode"
                );
                metrics::counter!("vomma_safe_mode_transitions_total", "state" => "engaged")
                    .increment(1);
            }
            self.engaged = true;
            return true;
        }

        if self.engaged && portfolio_value > self.max_loss * RECOVERY_FRAC {
            info!(portfolio_value, "portfolio recovered, leaving safe mode");
            metrics::counter!("vomma_safe_mode_transitions_total", "state" => "released")
                .increment(1);
            self.engaged = false;
        }

        self.engaged
    }

    /// Current state without feeding a new observation.
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// The configured loss floor.
    pub fn max_loss(&self) -> f64 {
        self.max_loss
    }
}

impl Default for DrawdownGuard {
    fn default() -> Self {
        Self::new(MAX_LOSS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_released() {
        let mut guard = DrawdownGuard::default();
        assert!(!guard.is_engaged());
        assert!(!guard.evaluate(0.0));
    }

    #[test]
    fn test_engages_below_floor() {
        let mut guard = DrawdownGuard::default();
        assert!(guard.evaluate(-60_000.0));
        assert!(guard.is_engaged());
    }

    #[test]
    fn test_holds_between_floor_and_recovery() {
        let mut guard = DrawdownGuard::default();
        guard.evaluate(-60_000.0);
        // Better than the floor but not past the recovery level.
        assert!(guard.evaluate(-30_000.0), "hysteresis must hold safe mode");
    }

    #[test]
    fn test_releases_above_recovery() {
        let mut guard = DrawdownGuard::default();
        guard.evaluate(-60_000.0);
        assert!(!guard.evaluate(-20_000.0));
        assert!(!guard.is_engaged());
    }

    #[test]
    fn test_recovery_level_is_exclusive() {
        let mut guard = DrawdownGuard::default();
        guard.evaluate(-60_000.0);
        assert!(guard.evaluate(-25_000.0), "exactly the recovery level holds");
        assert!(!guard.evaluate(-24_999.0));
    }

    #[test]
    fn test_reengages_after_release() {
        let mut guard = DrawdownGuard::default();
        guard.evaluate(-60_000.0);
        guard.evaluate(-10_000.0);
        assert!(guard.evaluate(-55_000.0));
    }
}
