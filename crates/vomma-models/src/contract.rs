//! # Option Contract Model
//!
//! Immutable record for a single European-style option on one underlying.
//!
//! ## Description
//! Contracts expire in whole simulation steps rather than calendar time; the
//! host lifecycle ticker re-issues each contract with one step fewer every
//! tick. At zero steps the contract is worth exactly its intrinsic payoff.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OptionId, Price, StepCount, Strike, Underlying, UnderlyingId};

/// Classification of the option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionKind {
    /// Static suffix used when rendering contract symbols.
    pub fn symbol_suffix(&self) -> &'static str {
        match self {
            OptionKind::Call => "C",
            OptionKind::Put => "P",
        }
    }
}

/// Logical model of a single option contract.
///
/// # Fields
/// * `id` - Unique engine-wide identifier.
/// * `kind` - Call or Put.
/// * `steps_until_expiry` - Simulation steps remaining; zero means expiring
///   now.
/// * `strike` - Integer exercise price.
/// * `underlying_id` / `underlying_name` - Owning underlying and a cached
///   copy of its display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub id: OptionId,
    pub kind: OptionKind,
    pub steps_until_expiry: StepCount,
    pub strike: Strike,
    pub underlying_id: UnderlyingId,
    pub underlying_name: String,
}

impl OptionContract {
    pub fn new(
        id: OptionId,
        kind: OptionKind,
        steps_until_expiry: StepCount,
        strike: Strike,
        underlying_id: UnderlyingId,
        underlying_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            steps_until_expiry,
            strike,
            underlying_id,
            underlying_name: underlying_name.into(),
        }
    }

    /// Convenience constructor binding the contract to an existing underlying.
    pub fn on_underlying(
        underlying: &Underlying,
        id: OptionId,
        kind: OptionKind,
        steps_until_expiry: StepCount,
        strike: Strike,
    ) -> Self {
        Self::new(
            id,
            kind,
            steps_until_expiry,
            strike,
            underlying.id,
            underlying.name.clone(),
        )
    }

    /// Intrinsic value against the given underlying valuation.
    pub fn payoff(&self, valuation: Price) -> Price {
        match self.kind {
            OptionKind::Call => (valuation - self.strike as f64).max(0.0),
            OptionKind::Put => (self.strike as f64 - valuation).max(0.0),
        }
    }

    /// Advances the contract one simulation step.
    ///
    /// An already-expired contract (zero steps) is returned unchanged.
    pub fn tick(&self) -> Self {
        if self.steps_until_expiry == 0 {
            return self.clone();
        }
        Self {
            steps_until_expiry: self.steps_until_expiry - 1,
            ..self.clone()
        }
    }

    /// True when two contracts carry identical economic terms, ignoring ids.
    pub fn contract_matches(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.steps_until_expiry == other.steps_until_expiry
            && self.strike == other.strike
            && self.underlying_id == other.underlying_id
            && self.underlying_name == other.underlying_name
    }
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}s {} {}{})",
            self.id,
            self.steps_until_expiry,
            self.underlying_name,
            self.strike,
            self.kind.symbol_suffix()
        )
    }
}

impl PartialEq for OptionContract {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.contract_matches(other)
    }
}

impl Eq for OptionContract {}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(steps: StepCount, strike: Strike) -> OptionContract {
        OptionContract::new(1001, OptionKind::Call, steps, strike, 1, "ALPHA")
    }

    #[test]
    fn test_call_payoff() {
        let c = call(5, 100);
        assert_eq!(c.payoff(150.0), 50.0);
        assert_eq!(c.payoff(80.0), 0.0);
    }

    #[test]
    fn test_put_payoff() {
        let p = OptionContract::new(1002, OptionKind::Put, 5, 100, 1, "ALPHA");
        assert_eq!(p.payoff(80.0), 20.0);
        assert_eq!(p.payoff(150.0), 0.0);
    }

    #[test]
    fn test_put_payoff_at_zero_valuation() {
        let p = OptionContract::new(1002, OptionKind::Put, 0, 100, 1, "ALPHA");
        assert_eq!(p.payoff(0.0), 100.0);
    }

    #[test]
    fn test_tick_decrements_until_expiry() {
        let c = call(1, 100);
        let ticked = c.tick();
        assert_eq!(ticked.steps_until_expiry, 0);
        // Expired contracts stay at zero.
        assert_eq!(ticked.tick().steps_until_expiry, 0);
    }

    #[test]
    fn test_contract_matches_ignores_id() {
        let a = call(5, 100);
        let mut b = a.clone();
        b.id = 9999;
        assert!(a.contract_matches(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_format() {
        let c = call(5, 152);
        assert_eq!(c.to_string(), "1001 (5s ALPHA 152C)");
    }
}
