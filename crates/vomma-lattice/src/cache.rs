//! # Price Cache
//!
//! Memoizes `(option, underlying price) -> (price, delta, gamma)` and bridges
//! small price jitter with a local-quadratic extrapolation.
//!
//! ## Description
//! Within one simulation step an option is typically quoted many times against
//! the same underlying valuation, so exact-key hits dominate. When the
//! valuation has moved by less than a tenth of the up step since the last full
//! valuation, the cached triple is advanced with a second-order Taylor
//! expansion instead of re-running the lattice; both Greeks are still
//! recomputed by full finite differences at the new price. Any larger move
//! falls through to a full recompute, which also refreshes the per-underlying
//! last-mark used as the expansion point.
//!
//! Keys pair the option id with the bit pattern of the valuation, so hits
//! require exact floating-point equality. Generated valuations are rounded to
//! cents, which makes exact equality the common case.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use vomma_models::{OptionContract, OptionId, Price, Underlying, UnderlyingId};

use crate::greeks::{self, full_greeks, PriceGreeks};

/// Fraction of the up step within which extrapolation is trusted.
pub const EXTRAPOLATION_WINDOW_FRAC: f64 = 0.1;
/// Soft ceiling on cached triples, enforced at step boundaries.
pub const MAX_CACHE_ENTRIES: usize = 100_000;
/// Bulk eviction size once the ceiling is exceeded.
pub const CACHE_EVICTION_BATCH: usize = 50_000;

type CacheKey = (OptionId, u64);

/// Memoizing valuation cache with per-underlying last-mark tracking.
#[derive(Debug, Default)]
pub struct PriceCache {
    entries: HashMap<CacheKey, PriceGreeks>,
    last_marks: HashMap<UnderlyingId, Price>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(option_id: OptionId, valuation: Price) -> CacheKey {
        (option_id, valuation.to_bits())
    }

    /// Fair value for the option at the underlying's current valuation.
    ///
    /// Lookup order: expiring contracts bypass the cache entirely, then an
    /// exact-key hit, then the Taylor extrapolation window, then a full
    /// lattice valuation which also refreshes the underlying's last mark.
    pub fn price(&mut self, option: &OptionContract, underlying: &Underlying) -> Price {
        if option.steps_until_expiry == 0 {
            return option.payoff(underlying.valuation);
        }

        let spot = underlying.valuation;
        let key = Self::key(option.id, spot);
        if let Some(cached) = self.entries.get(&key) {
            return cached.price;
        }

        if let Some(&mark) = self.last_marks.get(&underlying.id) {
            let moved = spot - mark;
            if mark != spot && moved.abs() < underlying.up_move_step * EXTRAPOLATION_WINDOW_FRAC {
                if let Some(&prev) = self.entries.get(&Self::key(option.id, mark)) {
                    let price = prev.price + prev.delta * moved + 0.5 * prev.gamma * moved * moved;
                    let triple = PriceGreeks {
                        price,
                        delta: greeks::delta(option, underlying, price),
                        gamma: greeks::gamma(option, underlying),
                    };
                    debug!(
                        option_id = option.id,
                        from = mark,
                        to = spot,
                        "extrapolated cached valuation"
                    );
                    self.entries.insert(key, triple);
                    return price;
                }
            }
        }

        let triple = full_greeks(option, underlying);
        self.entries.insert(key, triple);
        self.last_marks.insert(underlying.id, spot);
        triple.price
    }

    /// Full valuation triple at the current valuation.
    ///
    /// Exact hit or full recompute; this path never extrapolates and never
    /// moves the last marks.
    pub fn greeks(&mut self, option: &OptionContract, underlying: &Underlying) -> PriceGreeks {
        let key = Self::key(option.id, underlying.valuation);
        if let Some(&cached) = self.entries.get(&key) {
            return cached;
        }

        let triple = full_greeks(option, underlying);
        self.entries.insert(key, triple);
        triple
    }

    /// Valuation observed at the most recent full pricing of this underlying.
    pub fn last_mark(&self, underlying_id: UnderlyingId) -> Option<Price> {
        self.last_marks.get(&underlying_id).copied()
    }

    /// Overwrites the last mark, e.g. when a step swaps in fresh valuations.
    pub fn set_mark(&mut self, underlying_id: UnderlyingId, valuation: Price) {
        self.last_marks.insert(underlying_id, valuation);
    }

    /// Drops entries for contracts no longer active, then enforces the entry
    /// ceiling with a bulk eviction in iteration order.
    pub fn retain_active(&mut self, active: &HashSet<OptionId>) {
        let before = self.entries.len();
        self.entries.retain(|(option_id, _), _| active.contains(option_id));

        if self.entries.len() > MAX_CACHE_ENTRIES {
            let doomed: Vec<CacheKey> = self
                .entries
                .keys()
                .take(CACHE_EVICTION_BATCH)
                .copied()
                .collect();
            for key in doomed {
                self.entries.remove(&key);
            }
        }

        if before != self.entries.len() {
            debug!(before, after = self.entries.len(), "pruned price cache");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when any entry exists for the given option, at any valuation.
    pub fn contains_option(&self, option_id: OptionId) -> bool {
        self.entries.keys().any(|(id, _)| *id == option_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binomial::lattice_price;
    use vomma_models::OptionKind;

    fn underlying(valuation: f64) -> Underlying {
        Underlying::new("TEST", 1, valuation, 0.5, 2.0, 0.1, 0.5, 2.0).unwrap()
    }

    fn call(id: OptionId, steps: u32, strike: i64) -> OptionContract {
        OptionContract::new(id, OptionKind::Call, steps, strike, 1, "TEST")
    }

    #[test]
    fn test_price_is_idempotent_via_cache() {
        let mut cache = PriceCache::new();
        let u = underlying(150.0);
        let c = call(1001, 5, 152);

        let first = cache.price(&c, &u);
        let second = cache.price(&c, &u);
        assert_eq!(first.to_bits(), second.to_bits(), "second read must hit");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.last_mark(1), Some(150.0));
    }

    #[test]
    fn test_expiring_contract_bypasses_cache() {
        let mut cache = PriceCache::new();
        let u = underlying(150.0);
        let c = call(1001, 0, 100);

        assert_eq!(cache.price(&c, &u), 50.0);
        assert!(cache.is_empty(), "expiry pricing must not populate the cache");
        assert_eq!(cache.last_mark(1), None);
    }

    #[test]
    fn test_small_move_extrapolates_from_last_mark() {
        let mut cache = PriceCache::new();
        let c = call(1001, 5, 152);
        let at_mark = underlying(150.0);

        cache.price(&c, &at_mark);
        let prev = cache.greeks(&c, &at_mark);

        // 0.1 < up_move_step * 0.1 = 0.2, inside the window.
        let nudged = underlying(150.1);
        let got = cache.price(&c, &nudged);

        let ds = 0.1;
        let expected = prev.price + prev.delta * ds + 0.5 * prev.gamma * ds * ds;
        assert!(
            (got - expected).abs() < 1e-12,
            "expected Taylor value {} got {}",
            expected,
            got
        );
        // Extrapolation must not move the expansion point.
        assert_eq!(cache.last_mark(1), Some(150.0));
        assert_eq!(cache.len(), 2);

        // The nudged price is now a first-class entry.
        let again = cache.price(&c, &nudged);
        assert_eq!(got.to_bits(), again.to_bits());
    }

    #[test]
    fn test_large_move_forces_full_recompute() {
        let mut cache = PriceCache::new();
        let c = call(1001, 5, 152);

        cache.price(&c, &underlying(150.0));

        let far = underlying(151.0); // 1.0 >= 0.2, outside the window
        let got = cache.price(&c, &far);
        assert!(
            (got - lattice_price(&c, &far)).abs() < 1e-12,
            "outside the window the lattice value is authoritative"
        );
        assert_eq!(cache.last_mark(1), Some(151.0), "full pricing moves the mark");
    }

    #[test]
    fn test_greeks_never_extrapolate() {
        let mut cache = PriceCache::new();
        let c = call(1001, 5, 152);

        cache.price(&c, &underlying(150.0));

        let nudged = underlying(150.1);
        let triple = cache.greeks(&c, &nudged);
        assert_eq!(
            triple.price,
            lattice_price(&c, &nudged),
            "greeks lookup must price from scratch, not extrapolate"
        );
        assert_eq!(cache.last_mark(1), Some(150.0));
    }

    #[test]
    fn test_retain_active_drops_rotated_contracts() {
        let mut cache = PriceCache::new();
        let u = underlying(150.0);
        let kept = call(1001, 5, 152);
        let expired = call(1002, 3, 148);

        cache.price(&kept, &u);
        cache.price(&expired, &u);
        assert_eq!(cache.len(), 2);

        let active: HashSet<OptionId> = [1001].into_iter().collect();
        cache.retain_active(&active);

        assert!(cache.contains_option(1001));
        assert!(!cache.contains_option(1002));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ceiling_eviction_makes_progress() {
        let mut cache = PriceCache::new();
        let u = underlying(150.0);
        // Synthetic flood: one entry per option id via the greeks path.
        for id in 0..(MAX_CACHE_ENTRIES as u32 + 10) {
            let c = call(id, 1, 150);
            cache.greeks(&c, &u);
        }
        let active: HashSet<OptionId> = (0..(MAX_CACHE_ENTRIES as u32 + 10)).collect();
        cache.retain_active(&active);
        assert!(
            cache.len() <= MAX_CACHE_ENTRIES - CACHE_EVICTION_BATCH + 10,
            "bulk eviction should have removed a batch: {}",
            cache.len()
        );
    }
}
