//! # Underlying Asset Model
//!
//! Immutable record describing one tradable underlying and the parameters of
//! its discrete price process.
//!
//! ## Description
//! The price process is an additive binomial: each step the valuation jumps up
//! by `up_move_step` with probability `up_move_probability` or down by
//! `down_move_step` otherwise, plus Gaussian noise. Construction enforces that
//! the jump component is a martingale (`pu * u == pd * d`), which is what lets
//! the lattice pricer treat the stated probabilities as risk-neutral ones.

use serde::{Deserialize, Serialize};

use crate::{ModelError, Price, UnderlyingId};

/// Tolerance for the probability-mass check (`pu + pd == 1`).
const PROBABILITY_SUM_TOL: f64 = 1e-9;
/// Tolerance for the drift-free check (`pu * u == pd * d`).
const DRIFT_TOL: f64 = 1e-5;

/// Immutable underlying asset record.
///
/// # Fields
/// * `name` - Display name (e.g. "ALPHA").
/// * `id` - Unique engine-wide identifier.
/// * `valuation` - Current price, non-negative.
/// * `down_move_probability` / `up_move_probability` - Per-step jump
///   probabilities, strictly positive, summing to one.
/// * `down_move_step` / `up_move_step` - Absolute jump sizes, strictly
///   positive.
/// * `noise_std_dev` - Standard deviation of the additive Gaussian noise the
///   path generator layers on top of the jump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Underlying {
    pub name: String,
    pub id: UnderlyingId,
    pub valuation: Price,
    pub down_move_probability: f64,
    pub down_move_step: Price,
    pub noise_std_dev: f64,
    pub up_move_probability: f64,
    pub up_move_step: Price,
}

impl Underlying {
    /// Constructs a validated underlying record.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameters`] when a step or probability is
    /// non-positive, the probabilities do not sum to one, the valuation is
    /// negative, or the jump process has drift.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        id: UnderlyingId,
        valuation: Price,
        down_move_probability: f64,
        down_move_step: Price,
        noise_std_dev: f64,
        up_move_probability: f64,
        up_move_step: Price,
    ) -> Result<Self, ModelError> {
        if down_move_step <= 0.0 || up_move_step <= 0.0 {
            return Err(ModelError::InvalidParameters(
                "down/up move steps must both be positive".to_string(),
            ));
        }
        if down_move_probability <= 0.0 || up_move_probability <= 0.0 {
            return Err(ModelError::InvalidParameters(
                "down/up move probabilities must both be positive".to_string(),
            ));
        }
        if (down_move_probability + up_move_probability - 1.0).abs() > PROBABILITY_SUM_TOL {
            return Err(ModelError::InvalidParameters(
                "down and up move probabilities must sum to 1".to_string(),
            ));
        }
        if valuation < 0.0 {
            return Err(ModelError::InvalidParameters(
                "valuation must be non-negative".to_string(),
            ));
        }
        if (down_move_probability * down_move_step - up_move_probability * up_move_step).abs()
            > DRIFT_TOL
        {
            return Err(ModelError::InvalidParameters(
                "underlying has drift".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            id,
            valuation,
            down_move_probability,
            down_move_step,
            noise_std_dev,
            up_move_probability,
            up_move_step,
        })
    }

    /// Clones the record with a replaced valuation, floored at zero.
    ///
    /// All process parameters carry over unchanged, so the drift-free
    /// invariant is unaffected. Used by the Greeks bumper and the path
    /// generator.
    pub fn with_valuation(&self, valuation: Price) -> Self {
        Self {
            valuation: valuation.max(0.0),
            ..self.clone()
        }
    }
}

impl PartialEq for Underlying {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Underlying {}

#[cfg(test)]
mod tests {
    use super::*;

    fn symmetric(valuation: f64) -> Underlying {
        Underlying::new("TEST", 1, valuation, 0.5, 2.0, 0.1, 0.5, 2.0).unwrap()
    }

    #[test]
    fn test_valid_symmetric_underlying() {
        let u = symmetric(150.0);
        assert_eq!(u.valuation, 150.0);
        assert_eq!(u.up_move_step, 2.0);
    }

    #[test]
    fn test_rejects_non_positive_steps() {
        let res = Underlying::new("BAD", 1, 100.0, 0.5, 0.0, 0.1, 0.5, 2.0);
        assert!(matches!(res, Err(ModelError::InvalidParameters(_))));
    }

    #[test]
    fn test_rejects_probability_mass() {
        let res = Underlying::new("BAD", 1, 100.0, 0.4, 2.0, 0.1, 0.5, 2.0);
        assert!(matches!(res, Err(ModelError::InvalidParameters(_))));
    }

    #[test]
    fn test_rejects_drift() {
        // pu * u = 0.5 * 3 != pd * d = 0.5 * 2
        let res = Underlying::new("BAD", 1, 100.0, 0.5, 2.0, 0.1, 0.5, 3.0);
        assert!(matches!(res, Err(ModelError::InvalidParameters(_))));
    }

    #[test]
    fn test_accepts_asymmetric_drift_free() {
        // pu * u = 0.25 * 3 = 0.75 = pd * d = 0.75 * 1
        let u = Underlying::new("SKEWED", 2, 80.0, 0.75, 1.0, 0.05, 0.25, 3.0).unwrap();
        assert_eq!(u.id, 2);
    }

    #[test]
    fn test_with_valuation_floors_at_zero() {
        let u = symmetric(1.0);
        let bumped = u.with_valuation(-0.5);
        assert_eq!(bumped.valuation, 0.0);
        assert_eq!(bumped.up_move_probability, u.up_move_probability);
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = symmetric(150.0);
        let b = a.with_valuation(151.0);
        assert_eq!(a, b);
    }
}
