//! # Market Maker
//!
//! Engine state and the entry points the host harness drives.
//!
//! ## Description
//! Owns the position ledger, price cache, hedge ledger, realized P&L and the
//! safe-mode guard. Underlyings and contracts are shared read-only records;
//! each step the harness swaps in fresh sequences via [`MarketMaker::on_step_advance`].
//!
//! Call sequencing per entry point:
//! - `make_market`: risk gate, then fair value, Greeks and spread shaping.
//! - `on_bid_hit` / `on_offer_hit`: book the contract and premium, then the
//!   post-trade hedge pass.
//! - `on_step_advance`: swap state, prune the cache against the new active
//!   set, run the per-step rehedge, refresh last marks.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use vomma_lattice::{PriceCache, PriceGreeks};
use vomma_models::{
    OptionContract, OptionId, Position, Price, Quantity, Underlying, UnderlyingId,
};
use vomma_risk::DrawdownGuard;

use crate::error::{EngineError, TradeCallback};
use crate::hedge::HedgeController;
use crate::quote::{self, Quote};

/// Discrete-time options market maker.
pub struct MarketMaker {
    underlying_state: Vec<Arc<Underlying>>,
    active_option_state: Vec<Arc<OptionContract>>,
    position: Position,
    cache: PriceCache,
    hedger: HedgeController,
    guard: DrawdownGuard,
    realized_pnl: f64,
    trade_callback: Option<TradeCallback>,
}

impl MarketMaker {
    pub fn new(
        underlying_initial_state: Vec<Arc<Underlying>>,
        option_initial_state: Vec<Arc<OptionContract>>,
    ) -> Self {
        Self {
            underlying_state: underlying_initial_state,
            active_option_state: option_initial_state,
            position: Position::new(),
            cache: PriceCache::new(),
            hedger: HedgeController::new(),
            guard: DrawdownGuard::default(),
            realized_pnl: 0.0,
            trade_callback: None,
        }
    }

    /// Registers the sink that receives signed underlying orders.
    pub fn register_trade_callback(&mut self, callback: TradeCallback) {
        self.trade_callback = Some(callback);
    }

    // ------------------------------------------------------------------
    // Underlying execution
    // ------------------------------------------------------------------

    /// Buys shares of an underlying through the registered callback.
    ///
    /// # Errors
    /// [`EngineError::InvalidQuantity`] for non-positive quantities; callback
    /// failures propagate and leave the position ledger untouched.
    pub fn buy_underlying(
        &mut self,
        underlying_id: UnderlyingId,
        quantity: Quantity,
    ) -> Result<(), EngineError> {
        if quantity <= 0.0 {
            return Err(EngineError::InvalidQuantity(quantity));
        }
        self.execute_trade(underlying_id, quantity)
    }

    /// Sells shares of an underlying through the registered callback.
    ///
    /// # Errors
    /// Same contract as [`MarketMaker::buy_underlying`].
    pub fn sell_underlying(
        &mut self,
        underlying_id: UnderlyingId,
        quantity: Quantity,
    ) -> Result<(), EngineError> {
        if quantity <= 0.0 {
            return Err(EngineError::InvalidQuantity(quantity));
        }
        self.execute_trade(underlying_id, -quantity)
    }

    fn execute_trade(
        &mut self,
        underlying_id: UnderlyingId,
        signed_quantity: Quantity,
    ) -> Result<(), EngineError> {
        let callback = self
            .trade_callback
            .as_mut()
            .ok_or(EngineError::CallbackUnregistered)?;
        callback(underlying_id, signed_quantity)?;
        self.position.add_underlying(underlying_id, signed_quantity);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pricing
    // ------------------------------------------------------------------

    fn find_underlying(&self, underlying_id: UnderlyingId) -> Option<&Arc<Underlying>> {
        self.underlying_state
            .iter()
            .find(|u| u.id == underlying_id)
    }

    /// Fair value for a contract against current engine state.
    ///
    /// Returns 0.0 when the contract's underlying is missing from state.
    pub fn price_option(&mut self, option: &OptionContract) -> Price {
        let Some(underlying) = self.find_underlying(option.underlying_id) else {
            return 0.0;
        };
        let underlying = Arc::clone(underlying);
        self.cache.price(option, &underlying)
    }

    fn greeks_for(&mut self, option: &OptionContract) -> Option<PriceGreeks> {
        let underlying = Arc::clone(self.find_underlying(option.underlying_id)?);
        Some(self.cache.greeks(option, &underlying))
    }

    // ------------------------------------------------------------------
    // Portfolio accounting
    // ------------------------------------------------------------------

    /// Mark-to-market portfolio value: realized premium plus option inventory
    /// at fair value plus share inventory at current valuations.
    pub fn portfolio_value(&mut self) -> f64 {
        let mut total = self.realized_pnl;

        for i in 0..self.active_option_state.len() {
            let option = Arc::clone(&self.active_option_state[i]);
            let qty = self.position.option_qty(option.id);
            if qty != 0 {
                total += qty as f64 * self.price_option(&option);
            }
        }

        for underlying in &self.underlying_state {
            let qty = self.position.underlying_qty(underlying.id);
            if qty != 0.0 {
                total += qty * underlying.valuation;
            }
        }

        total
    }

    /// Residual directional exposure in one underlying: option deltas times
    /// inventory, less the committed hedge.
    ///
    /// Returns 0.0 when the underlying is missing from state.
    pub fn portfolio_delta(&mut self, underlying_id: UnderlyingId) -> f64 {
        if self.find_underlying(underlying_id).is_none() {
            return 0.0;
        }

        let mut total = 0.0;
        for i in 0..self.active_option_state.len() {
            let option = Arc::clone(&self.active_option_state[i]);
            if option.underlying_id != underlying_id {
                continue;
            }
            let qty = self.position.option_qty(option.id);
            if qty == 0 {
                continue;
            }
            if let Some(greeks) = self.greeks_for(&option) {
                total += qty as f64 * greeks.delta;
            }
        }

        total - self.hedger.ledger(underlying_id)
    }

    // ------------------------------------------------------------------
    // Quoting
    // ------------------------------------------------------------------

    /// Builds a two-sided quote for the contract, or the sentinel when the
    /// risk guard is engaged or the underlying is unknown.
    pub fn make_market(&mut self, option: &OptionContract) -> Quote {
        let value = self.portfolio_value();
        if self.guard.evaluate(value) {
            return Quote::sentinel();
        }

        let fair = self.price_option(option);
        let inventory = self.position.option_qty(option.id);

        let Some(underlying) = self.find_underlying(option.underlying_id) else {
            debug!(option_id = option.id, "quote refused, underlying unknown");
            return Quote::sentinel();
        };
        let underlying = Arc::clone(underlying);
        let greeks = self.cache.greeks(option, &underlying);

        let spread = quote::shape_spread(
            fair,
            &greeks,
            underlying.valuation,
            option.steps_until_expiry,
        );
        quote::build_quote(fair, spread, inventory)
    }

    // ------------------------------------------------------------------
    // Trade events
    // ------------------------------------------------------------------

    /// A counterparty sold to us at our bid: inventory +1, premium booked,
    /// then the post-trade hedge pass.
    pub fn on_bid_hit(&mut self, option: &OptionContract, bid_price: Price) {
        self.position.add_option(option.id, 1);
        self.realized_pnl += bid_price;
        self.post_trade_hedge(option, 1);
    }

    /// A counterparty bought from us at our offer: inventory -1, premium
    /// booked, then the post-trade hedge pass.
    pub fn on_offer_hit(&mut self, option: &OptionContract, offer_price: Price) {
        self.position.add_option(option.id, -1);
        self.realized_pnl -= offer_price;
        self.post_trade_hedge(option, -1);
    }

    fn post_trade_hedge(&mut self, option: &OptionContract, signed_contracts: i64) {
        let Some(underlying) = self.find_underlying(option.underlying_id) else {
            return;
        };
        let underlying = Arc::clone(underlying);

        let greeks = self.cache.greeks(option, &underlying);
        self.hedger
            .record_target(underlying.id, signed_contracts as f64 * greeks.delta);

        let net_delta = self.portfolio_delta(underlying.id);
        if HedgeController::needs_rehedge(net_delta) {
            self.exec_delta_hedge(underlying.id, net_delta);
        }
    }

    /// Adjusts the hedge ledger toward `target`, offsetting a positive
    /// residual with a short in shares. The ledger is only updated when the
    /// callback accepts the order.
    fn exec_delta_hedge(&mut self, underlying_id: UnderlyingId, target: f64) {
        let Some(adjustment) = self.hedger.adjustment(underlying_id, target) else {
            return;
        };

        let result = if adjustment > 0.0 {
            self.sell_underlying(underlying_id, adjustment.abs())
        } else {
            self.buy_underlying(underlying_id, adjustment.abs())
        };

        match result {
            Ok(()) => self.hedger.commit(underlying_id, adjustment),
            Err(err) => warn!(
                underlying_id,
                error = %err,
                "hedge trade rejected, ledger unchanged"
            ),
        }
    }

    // ------------------------------------------------------------------
    // Step lifecycle
    // ------------------------------------------------------------------

    /// Swaps in the new step's state, prunes the cache, rehedges where the
    /// market moved, and refreshes the last marks.
    pub fn on_step_advance(
        &mut self,
        new_underlying_state: Vec<Arc<Underlying>>,
        new_option_state: Vec<Arc<OptionContract>>,
    ) {
        self.underlying_state = new_underlying_state;
        self.active_option_state = new_option_state;

        let active: HashSet<OptionId> =
            self.active_option_state.iter().map(|o| o.id).collect();
        self.cache.retain_active(&active);

        self.rehedge_step();

        for underlying in &self.underlying_state {
            self.cache.set_mark(underlying.id, underlying.valuation);
        }
    }

    /// Per-step gamma-scalp pass over every underlying in the new state.
    ///
    /// Note the orientation: this path buys into a positive residual delta,
    /// the opposite of the post-trade path.
    fn rehedge_step(&mut self) {
        for i in 0..self.underlying_state.len() {
            let underlying = Arc::clone(&self.underlying_state[i]);
            let spot = underlying.valuation;
            let mark = self.cache.last_mark(underlying.id).unwrap_or(spot);

            if !HedgeController::scalp_triggered(spot - mark) {
                continue;
            }

            let net_delta = self.portfolio_delta(underlying.id);
            if HedgeController::needs_rehedge(net_delta) {
                let result = if net_delta > 0.0 {
                    self.buy_underlying(underlying.id, net_delta.abs())
                } else {
                    self.sell_underlying(underlying.id, net_delta.abs())
                };
                match result {
                    Ok(()) => self.hedger.commit(underlying.id, net_delta),
                    Err(err) => warn!(
                        underlying_id = underlying.id,
                        error = %err,
                        "step rehedge rejected, ledger unchanged"
                    ),
                }
            }

            self.hedger.mark_hedged(underlying.id, spot);
        }
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn underlyings(&self) -> &[Arc<Underlying>] {
        &self.underlying_state
    }

    pub fn active_options(&self) -> &[Arc<OptionContract>] {
        &self.active_option_state
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    /// Committed hedge quantity for one underlying.
    pub fn hedge_ledger(&self, underlying_id: UnderlyingId) -> Quantity {
        self.hedger.ledger(underlying_id)
    }

    /// Accumulated per-trade delta exposure (diagnostic).
    pub fn hedge_target(&self, underlying_id: UnderlyingId) -> f64 {
        self.hedger.target(underlying_id)
    }

    pub fn is_safe_mode(&self) -> bool {
        self.guard.is_engaged()
    }

    /// Number of cached valuation triples.
    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }
}
