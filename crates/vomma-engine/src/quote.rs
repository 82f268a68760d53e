//! # Quote Construction
//!
//! Shapes a two-sided market around fair value from gamma, time to expiry and
//! inventory.
//!
//! ## Description
//! The half-spread widens multiplicatively with curvature (gamma exposure in
//! dollar terms, capped) and with proximity to expiry. Inventory limits skew
//! the book one-sided: past the long limit the bid collapses to a penny, past
//! the short limit the ask is pushed an order of magnitude away.

use serde::{Deserialize, Serialize};

use vomma_lattice::PriceGreeks;
use vomma_models::{Price, StepCount};

/// Contract inventory beyond which quoting turns one-sided.
pub const MAX_POSITIONS: i64 = 50;
/// Bid of the do-not-trade sentinel.
pub const SENTINEL_BID: Price = 0.01;
/// Ask of the do-not-trade sentinel.
pub const SENTINEL_ASK: Price = 99_999_999.0;

/// Absolute floor on the unshaped spread.
const MIN_SPREAD: f64 = 0.01;
/// Base spread as a fraction of fair value.
const BASE_SPREAD_FRAC: f64 = 0.02;
/// Cap on the gamma widening factor.
const GAMMA_ADJ_CAP: f64 = 0.5;
/// Dollar-gamma fraction feeding the widening factor.
const GAMMA_ADJ_FRAC: f64 = 0.1;

/// A two-sided market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Price,
    pub ask: Price,
}

impl Quote {
    /// The withdraw-from-market quote: a bid and ask no rational counterparty
    /// would hit.
    pub const fn sentinel() -> Self {
        Self {
            bid: SENTINEL_BID,
            ask: SENTINEL_ASK,
        }
    }

    pub fn spread(&self) -> Price {
        self.ask - self.bid
    }

    pub fn is_sentinel(&self) -> bool {
        self.bid == SENTINEL_BID && self.ask == SENTINEL_ASK
    }
}

/// Expiry-proximity widening factor.
pub(crate) fn time_adjustment(steps_until_expiry: StepCount) -> f64 {
    if steps_until_expiry <= 2 {
        2.0
    } else if steps_until_expiry <= 5 {
        1.3
    } else {
        1.0
    }
}

/// Full spread around fair value before inventory skew.
pub(crate) fn shape_spread(
    fair: Price,
    greeks: &PriceGreeks,
    valuation: Price,
    steps_until_expiry: StepCount,
) -> f64 {
    let base_spread = (fair * BASE_SPREAD_FRAC).max(MIN_SPREAD);
    let gamma_adj = (greeks.gamma.abs() * valuation * GAMMA_ADJ_FRAC).min(GAMMA_ADJ_CAP);
    base_spread * time_adjustment(steps_until_expiry) * (1.0 + gamma_adj)
}

/// Centers the spread on fair value and applies the inventory skew.
pub(crate) fn build_quote(fair: Price, spread: f64, inventory: i64) -> Quote {
    let mut bid = (fair - spread / 2.0).max(0.0);
    let mut ask = fair + spread / 2.0;

    if inventory > MAX_POSITIONS {
        // Refuse to buy more.
        bid = 0.01;
    } else if inventory < -MAX_POSITIONS {
        // Refuse to sell more.
        ask *= 10.0;
    }

    Quote { bid, ask }
}
