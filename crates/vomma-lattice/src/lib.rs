//! # Vomma Lattice Valuation
//!
//! Option valuation on an additive binomial lattice, plus the sensitivity and
//! caching layers the quoting engine prices through.
//!
//! ## Description
//! Valuation is deterministic given a contract and an underlying record:
//! - [`binomial::lattice_price`] - risk-neutral backward induction on absolute
//!   price steps, no discounting.
//! - [`greeks`] - delta and gamma by finite differences on bumped copies of
//!   the underlying.
//! - [`cache::PriceCache`] - memoizes full valuations per observed underlying
//!   price and bridges small price jitter with a second-order Taylor
//!   extrapolation instead of re-lattice-ing.
//!
//! ## References
//! - Cox, J., Ross, S., & Rubinstein, M. (1979). Option Pricing: A Simplified
//!   Approach. Journal of Financial Economics, 7(3), 229-263.

pub mod binomial;
pub mod cache;
pub mod greeks;

pub use binomial::lattice_price;
pub use cache::PriceCache;
pub use greeks::{full_greeks, PriceGreeks};
