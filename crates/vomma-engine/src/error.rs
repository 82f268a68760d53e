//! Engine errors and the execution-callback contract.

use thiserror::Error;

use vomma_models::{Quantity, UnderlyingId};

/// Sink for underlying orders emitted by the engine.
///
/// Positive quantity is a buy, negative a sell. Failures from externally
/// initiated `buy_underlying`/`sell_underlying` calls propagate to the
/// caller; failures inside the hedge paths are logged and suppressed, and the
/// hedge ledger is left untouched.
pub type TradeCallback = Box<dyn FnMut(UnderlyingId, Quantity) -> Result<(), EngineError>>;

/// Failures surfaced by the engine's trading entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Trade quantity was zero or negative.
    #[error("trade quantity must be positive, got {0}")]
    InvalidQuantity(f64),
    /// The execution callback rejected the order.
    #[error("trade callback rejected order: {0}")]
    TradeRejected(String),
    /// No execution callback has been registered yet.
    #[error("no trade callback registered")]
    CallbackUnregistered,
}
