//! Error taxonomy for the simulation core
//!
//! Invalid input is rejected before any stepping happens. Arithmetic
//! failures that slip through (length mismatches, NaN/inf) are reported
//! instead of being written into output series.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("duplicate coil name: {0}")]
    DuplicateCoil(String),

    #[error("series `{what}` has {found} samples, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("series `{what}` is not finite at sample {index}")]
    NonFinite { what: String, index: usize },
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reject non-finite or non-positive values
pub(crate) fn require_positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!("{what} must be positive and finite, got {value}")))
    }
}

/// Reject non-finite or negative values
pub(crate) fn require_non_negative(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!("{what} must be non-negative and finite, got {value}")))
    }
}
