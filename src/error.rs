//! Error types for runsettings

use serde_json::Value;
use thiserror::Error;

/// Result type alias for runsettings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for runsettings
///
/// Every variant describes a caller programming error. Nothing in the crate
/// catches or retries these internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Got unexpected arguments: {0:?}")]
    UnexpectedArguments(Vec<String>),

    #[error("Unknown source rank: {0}")]
    UnknownSource(String),

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Invalid value for property {key}: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: Value,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Mutation Errors
    // -------------------------------------------------------------------------
    #[error("{0} object is frozen")]
    Frozen(String),

    #[error("Use update() to update attribute values, '{0}' cannot be assigned directly")]
    DirectWriteForbidden(String),
}

impl Error {
    pub(crate) fn invalid(key: &str, value: &Value, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            key: key.to_string(),
            value: value.clone(),
            reason: reason.into(),
        }
    }

    /// Check if this error came from a preprocessor or validator
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::InvalidValue { .. })
    }

    /// Check if this error was caused by mutating a frozen object
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        matches!(self, Error::Frozen(_))
    }

    /// Check if this is a schema membership error
    #[must_use]
    pub fn is_unexpected_arguments(&self) -> bool {
        matches!(self, Error::UnexpectedArguments(_))
    }
}
