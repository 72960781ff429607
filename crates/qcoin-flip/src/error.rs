//! Error types for coin-flip sessions.

use qcoin_hal::HalError;
use thiserror::Error;

/// Errors surfaced by the coin-flip core.
///
/// Calling an operation from a state where it does not apply is not an
/// error: those calls are ignored so that late or duplicate results cannot
/// disturb a session.
#[derive(Debug, Error)]
pub enum FlipError {
    /// The requested device or profile cannot be used. Raised before any
    /// execution starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The execution capability failed.
    #[error(transparent)]
    Backend(#[from] HalError),

    /// The backend answered with something that is not a bitstring.
    #[error("Malformed result: {0}")]
    MalformedResult(String),
}

/// Result type for coin-flip operations.
pub type FlipResult<T> = Result<T, FlipError>;
