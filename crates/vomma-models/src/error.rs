//! Model construction errors.

use thiserror::Error;

/// Validation failures raised when constructing market records.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Underlying parameters violate a structural invariant (negative steps,
    /// malformed probabilities, or a lattice with drift).
    #[error("invalid underlying parameters: {0}")]
    InvalidParameters(String),
}
