//! # Vomma Market Models
//!
//! Core value types shared across the vomma market-making engine.
//!
//! ## Description
//! This crate defines the immutable market records (underlyings and option
//! contracts) and the mutable position ledger the engine books trades into.
//! Records are distributed as shared read-only references (`Arc`) between the
//! engine and the host harness; only [`Position`] mutates after construction.
//!
//! ### Core Types
//! - [`Underlying`] - A traded asset evolving by discrete drift-free up/down
//!   jumps plus Gaussian noise.
//! - [`OptionContract`] - A CALL or PUT on one unit of an underlying, expiring
//!   after a fixed number of simulation steps.
//! - [`Position`] - Signed contract and share inventory per instrument.
//!
//! ## References
//! - IEEE Std 1016-2009: Software Design Descriptions

pub mod contract;
pub mod error;
pub mod position;
pub mod underlying;

pub use contract::{OptionContract, OptionKind};
pub use error::ModelError;
pub use position::Position;
pub use underlying::Underlying;

/// Engine-wide identifier for an option contract.
pub type OptionId = u32;
/// Engine-wide identifier for an underlying asset.
pub type UnderlyingId = u32;
/// Prices and valuations are plain doubles; underlying valuations are
/// generated rounded to cents.
pub type Price = f64;
/// Signed share quantity. Positive buys, negative sells.
pub type Quantity = f64;
/// Steps remaining until an option expires.
pub type StepCount = u32;
/// Integer exercise price.
pub type Strike = i64;
