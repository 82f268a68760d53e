//! # Finite-Difference Greeks
//!
//! Delta and gamma obtained by re-pricing the lattice on bumped copies of the
//! underlying. The bump preserves every process parameter except the
//! valuation, so the bumped records still satisfy the drift-free invariant.

use serde::{Deserialize, Serialize};

use vomma_models::{OptionContract, Price, Underlying};

use crate::binomial::lattice_price;

/// Valuation triple carried through the price cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceGreeks {
    /// Fair value.
    pub price: Price,
    /// First-order sensitivity to a $1 underlying move.
    pub delta: f64,
    /// Second-order sensitivity to a $1 underlying move.
    pub gamma: f64,
}

/// Bump used for both difference schemes: a tenth of the up step, capped at $1.
pub fn bump_size(underlying: &Underlying) -> f64 {
    (underlying.up_move_step * 0.1).min(1.0)
}

/// Forward-difference delta against a caller-supplied base price.
pub fn delta(option: &OptionContract, underlying: &Underlying, base_price: Price) -> f64 {
    let bump = bump_size(underlying);
    let bumped = underlying.with_valuation(underlying.valuation + bump);
    (lattice_price(option, &bumped) - base_price) / bump
}

/// Symmetric second-difference gamma.
///
/// Re-computes its own center price rather than reusing any externally priced
/// value, keeping the three lattice evaluations mutually consistent.
pub fn gamma(option: &OptionContract, underlying: &Underlying) -> f64 {
    let bump = bump_size(underlying);

    let center = lattice_price(option, underlying);
    let up = lattice_price(option, &underlying.with_valuation(underlying.valuation + bump));
    let down = lattice_price(option, &underlying.with_valuation(underlying.valuation - bump));

    (up - 2.0 * center + down) / (bump * bump)
}

/// Full price, delta and gamma from scratch.
pub fn full_greeks(option: &OptionContract, underlying: &Underlying) -> PriceGreeks {
    let price = lattice_price(option, underlying);
    PriceGreeks {
        price,
        delta: delta(option, underlying, price),
        gamma: gamma(option, underlying),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vomma_models::OptionKind;

    fn underlying(valuation: f64) -> Underlying {
        Underlying::new("TEST", 1, valuation, 0.5, 2.0, 0.1, 0.5, 2.0).unwrap()
    }

    fn call(steps: u32, strike: i64) -> OptionContract {
        OptionContract::new(1001, OptionKind::Call, steps, strike, 1, "TEST")
    }

    #[test]
    fn test_bump_size_capped_at_one() {
        let narrow = underlying(100.0);
        assert!((bump_size(&narrow) - 0.2).abs() < 1e-12);

        let wide = Underlying::new("WIDE", 2, 100.0, 0.5, 20.0, 0.1, 0.5, 20.0).unwrap();
        assert_eq!(bump_size(&wide), 1.0);
    }

    #[test]
    fn test_call_delta_in_unit_range() {
        let u = underlying(150.0);
        let c = call(5, 150);
        let base = lattice_price(&c, &u);
        let d = delta(&c, &u, base);
        assert!(d > 0.0 && d < 1.0, "ATM call delta out of range: {}", d);
    }

    #[test]
    fn test_put_delta_negative() {
        let u = underlying(150.0);
        let p = OptionContract::new(1002, OptionKind::Put, 5, 150, 1, "TEST");
        let base = lattice_price(&p, &u);
        assert!(delta(&p, &u, base) < 0.0);
    }

    #[test]
    fn test_gamma_positive_near_the_money() {
        let u = underlying(150.0);
        let g = gamma(&call(5, 150), &u);
        assert!(g > 0.0, "long option gamma should be positive: {}", g);
    }

    #[test]
    fn test_full_greeks_price_matches_lattice() {
        let u = underlying(150.0);
        let c = call(5, 152);
        let pg = full_greeks(&c, &u);
        assert_eq!(pg.price, lattice_price(&c, &u));
    }
}
