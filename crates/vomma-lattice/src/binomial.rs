//! # Additive Binomial Pricer
//!
//! Cox-Ross-Rubinstein style backward induction on absolute price steps.
//!
//! ## Description
//! Unlike the textbook multiplicative tree, nodes move by the underlying's
//! absolute `up_move_step` / `down_move_step`. The underlying's validated
//! drift-free constraint (`pu * u == pd * d`) makes the stated probabilities
//! risk-neutral, so the option value is the plain probability-weighted payoff
//! expectation. The effective risk-free rate is zero and no discounting is
//! applied.
//!
//! ## References
//! - Cox, J., Ross, S., & Rubinstein, M. (1979). Option Pricing: A Simplified
//!   Approach.

use vomma_models::{OptionContract, Price, Underlying};

/// Values an option on the additive binomial lattice.
///
/// # Description
/// Builds the terminal payoff array for every up/down path count, then folds
/// it back one step at a time with the underlying's jump probabilities.
/// Terminal prices are floored at zero before the payoff is taken, so a
/// strike above a fully collapsed underlying still yields full intrinsic for
/// a put.
///
/// # Returns
/// The fair value; with zero steps until expiry this is exactly the intrinsic
/// payoff at the current valuation.
pub fn lattice_price(option: &OptionContract, underlying: &Underlying) -> Price {
    let n = option.steps_until_expiry as usize;

    let mut tree = vec![0.0; n + 1];
    for (up_moves, node) in tree.iter_mut().enumerate() {
        let down_moves = n - up_moves;
        let terminal = (underlying.valuation + up_moves as f64 * underlying.up_move_step
            - down_moves as f64 * underlying.down_move_step)
            .max(0.0);
        *node = option.payoff(terminal);
    }

    for step in (1..=n).rev() {
        for i in 0..step {
            tree[i] = underlying.up_move_probability * tree[i + 1]
                + underlying.down_move_probability * tree[i];
        }
    }

    tree[0]
}
