//! # Vomma Market-Making Engine
//!
//! Discrete-time options market making against a synthetic exchange.
//!
//! ## Description
//! The [`MarketMaker`] publishes two-sided quotes for every active contract,
//! books trades when a counterparty hits a quote, keeps a delta-neutral hedge
//! in each underlying via a caller-registered execution callback, and
//! withdraws from the market under a portfolio-level drawdown ceiling.
//!
//! The engine is single-threaded and synchronous: the host harness drives it
//! through the entry points (`make_market`, `on_bid_hit`, `on_offer_hit`,
//! `on_step_advance`) and every side effect completes before the call
//! returns.
//!
//! ## References
//! - IEEE Std 1016-2009: Software Design Descriptions

pub mod error;
pub mod hedge;
pub mod maker;
pub mod quote;

pub use error::{EngineError, TradeCallback};
pub use hedge::HedgeController;
pub use maker::MarketMaker;
pub use quote::Quote;
