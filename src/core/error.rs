//! Error handling logic

use crate::channel::KeyDistributionOutcome;
use thiserror::Error;

/// Status codes reported by a quantum backend.
pub mod status {
    /// Unclassified failure.
    pub const GENERAL: i32 = 1;
    /// The backend was used before it finished its own setup.
    pub const NOT_INITIALIZED: i32 = 2;
    /// The backend rejected an argument.
    pub const INVALID_ARGUMENT: i32 = 3;
    /// The backend failed while executing.
    pub const RUNTIME: i32 = 4;
    /// The backend did not answer in time.
    pub const TIMEOUT: i32 = 5;
}

/// Errors produced while planning, running or evaluating quantum operations.
///
/// Configuration and input errors are always raised before the backend is
/// touched and are never retried.
#[derive(Error, Debug)]
pub enum QkitError {
    /// Contradictory or missing option fields.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The collection or predicate cannot be handed to the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every search attempt finished without a verified hit.
    #[error("No matching items found")]
    NoMatches,

    /// Random integer range where `min` is not below `max`.
    #[error("Invalid range: min ({min}) must be less than max ({max})")]
    InvalidRange {
        /// Lower bound supplied by the caller
        min: i64,
        /// Upper bound supplied by the caller
        max: i64,
    },

    /// Zero-length random byte request.
    #[error("Invalid length: must be greater than zero")]
    InvalidLength,

    /// The backend ran the key exchange but reported failure. The partial
    /// outcome is kept so diagnostic callers can still read its readings.
    #[error("Key generation failed: {}", failure_reason(.0))]
    KeyGenerationFailed(Box<KeyDistributionOutcome>),

    /// Lower-level backend or transport failure, propagated unchanged.
    #[error("Backend error (code {code}): {message}")]
    Backend {
        /// One of the codes in [`status`]
        code: i32,
        /// Backend supplied description
        message: String,
    },

    /// Reading or writing a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid JSON for its structure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QkitError {
    /// Builds a [`QkitError::Backend`] from a status code and message.
    pub fn backend(code: i32, message: impl Into<String>) -> Self {
        QkitError::Backend { code, message: message.into() }
    }

    /// True for errors detected locally before any backend call.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QkitError::InvalidConfiguration(_)
                | QkitError::InvalidInput(_)
                | QkitError::InvalidRange { .. }
                | QkitError::InvalidLength
        )
    }
}

fn failure_reason(outcome: &KeyDistributionOutcome) -> &str {
    outcome.failure_reason.as_deref().unwrap_or("Unknown failure")
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QkitError>;
