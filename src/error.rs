//! Error types for the mode selector
//!
//! Provides the error taxonomy using thiserror for ergonomic error definitions.

use crate::catalog::DriverId;
use thiserror::Error;

/// Result type alias for mode selector operations
pub type Result<T> = std::result::Result<T, ModeSelError>;

/// Main error type for the mode selector
#[derive(Error, Debug)]
pub enum ModeSelError {
    /// Growing a resolution list or the driver sequence failed
    #[error("Allocation failed: {0}")]
    AllocationFailure(String),

    /// The driver cannot enumerate its modes
    #[error("Driver {0} does not support mode enumeration")]
    EnumerationUnsupported(DriverId),

    /// The driver supports enumeration but the call failed
    #[error("Mode enumeration failed for driver {driver}: {details}")]
    EnumerationFailed {
        /// Driver that was asked
        driver: DriverId,
        /// Reason given by the platform
        details: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// UI error
    #[error("UI error: {0}")]
    UiError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ModeSelError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a UI error
    pub fn ui<S: Into<String>>(msg: S) -> Self {
        Self::UiError(msg.into())
    }

    /// Create an enumeration failure
    pub fn enumeration<S: Into<String>>(driver: DriverId, details: S) -> Self {
        Self::EnumerationFailed {
            driver,
            details: details.into(),
        }
    }

    /// Check if the error is recovered locally (by falling back to the default catalog)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EnumerationUnsupported(_) | Self::EnumerationFailed { .. }
        )
    }
}

impl From<std::collections::TryReserveError> for ModeSelError {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::AllocationFailure(err.to_string())
    }
}
