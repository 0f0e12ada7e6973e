//! Structured error types for the GISA toolkit.

use thiserror::Error;

/// Unified error type for all GISA operations.
#[derive(Debug, Error)]
pub enum GisaError {
    /// Invalid input (bad arguments, out-of-range values, malformed configuration)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A computation produced a non-finite value
    #[error("numerical error: {0}")]
    Numeric(String),
}

impl GisaError {
    /// Whether this error was raised by a precondition check.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GisaError::InvalidInput(_))
    }
}

/// Convenience alias used throughout the GISA crates.
pub type Result<T> = std::result::Result<T, GisaError>;
