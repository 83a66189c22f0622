//! Sheet error types

use thiserror::Error;

/// Errors raised by sheet configuration and commands
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    /// Snap points are not three finite, strictly ascending values
    #[error("Invalid snap points: {0}")]
    InvalidSnapPoints(String),

    /// Initial snap is not one of the configured snap points
    #[error("Initial snap {0} is not a configured snap point")]
    InvalidInitialSnap(f32),

    /// A snap command named a value that is not configured
    #[error("Unknown snap point: {0}")]
    UnknownSnapPoint(f32),

    /// A physics or timing constant is out of range
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for sheet operations
pub type Result<T> = std::result::Result<T, SheetError>;
