//! # Synthetic Path Generation
//!
//! Seedable stochastic evolution for underlyings and the option expiry
//! ticker. The engine itself is deterministic; all randomness in a simulation
//! run lives here.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use vomma_models::{OptionContract, Underlying};

/// Draws one binomial jump plus Gaussian noise per underlying per step.
pub struct PathGenerator {
    rng: StdRng,
    noise: Normal<f64>,
}

impl PathGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: Normal::new(0.0, 1.0).expect("unit normal parameters are valid"),
        }
    }

    /// Advances every underlying one step, preserving process parameters.
    pub fn advance(&mut self, current: &[Arc<Underlying>]) -> Vec<Arc<Underlying>> {
        current.iter().map(|u| Arc::new(self.step(u))).collect()
    }

    fn step(&mut self, underlying: &Underlying) -> Underlying {
        let jump = if self.rng.gen::<f64>() < underlying.up_move_probability {
            underlying.up_move_step
        } else {
            -underlying.down_move_step
        };
        let noise = self.noise.sample(&mut self.rng) * underlying.noise_std_dev;

        // Floor at zero, then round to cents like a real tape.
        let next = ((underlying.valuation + jump + noise).max(0.0) * 100.0).round() / 100.0;
        underlying.with_valuation(next)
    }
}

/// Advances every contract's expiry clock one step.
pub fn tick_options(current: &[Arc<OptionContract>]) -> Vec<Arc<OptionContract>> {
    current.iter().map(|o| Arc::new(o.tick())).collect()
}
