//! Error types for the fee schedule engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that stops a schedule from being built. Findings about
//! an already-built schedule are not errors; see
//! [`ScheduleInconsistency`](crate::models::ScheduleInconsistency).

use thiserror::Error;

/// The main error type for the fee schedule engine.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::error::EngineError;
///
/// let error = EngineError::ConfigError {
///     field: "number_of_semesters".to_string(),
///     message: "must be at least 1".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid fee configuration field 'number_of_semesters': must be at least 1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The top-level fee configuration is malformed.
    #[error("Invalid fee configuration field '{field}': {message}")]
    ConfigError {
        /// The configuration field that was rejected.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A scholarship slab is malformed or duplicates another slab.
    #[error("Invalid scholarship slab '{slab}': {message}")]
    SlabError {
        /// The name of the offending slab.
        slab: String,
        /// A description of what made the slab invalid.
        message: String,
    },

    /// The engine settings file was not found at the specified path.
    #[error("Engine settings not found: {path}")]
    SettingsNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The engine settings could not be parsed or hold out-of-range values.
    #[error("Failed to parse engine settings '{path}': {message}")]
    SettingsParseError {
        /// The path (or source label) of the settings that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An arithmetic precondition was violated.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        EngineError::ConfigError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn slab(slab: &str, message: impl Into<String>) -> Self {
        EngineError::SlabError {
            slab: slab.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn calculation(message: impl Into<String>) -> Self {
        EngineError::CalculationError {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
