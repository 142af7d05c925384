//! Error type definitions for the wiki ingestion pipeline
//!
//! The taxonomy is closed: callers match on `IngestError` exhaustively
//! instead of probing error types at runtime.

use std::fmt;
use thiserror::Error;

use crate::models::agent::RecordField;

/// Top-level ingestion error type
#[derive(Error, Debug)]
pub enum IngestError {
    /// Remote content API failures
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A required field could not be extracted from a payload
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// A mapped record broke structural invariants
    #[error("Validation failed for '{entry_id}': {}", .errors.join("; "))]
    Validation {
        entry_id: String,
        errors: Vec<String>,
    },

    /// Post-run success-rate policy violation
    #[error("Success rate {actual:.3} is below the required minimum {required:.3}")]
    Policy { actual: f64, required: f64 },

    /// The entry itself cannot be processed (e.g. blank id)
    #[error("Malformed entry: {reason}")]
    MalformedEntry { reason: String },

    /// Invalid pipeline or client configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Output sink failures
    #[error("Output error: {path} - {message}")]
    Output { path: String, message: String },

    /// Raw filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content API errors. All variants are recoverable at the entry level.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Connection, timeout or request construction failures
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// Non-success HTTP status
    #[error("HTTP error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The API answered but reported a non-zero return code
    #[error("Remote error: retcode {retcode} - {message}")]
    Remote { retcode: i64, message: String },

    /// The response body could not be decoded into a payload
    #[error("Decode failure: {message}")]
    Decode { message: String },
}

/// Why a record field could not be produced
#[derive(Debug, Clone, PartialEq)]
pub enum MappingFailure {
    /// None of the accepted module names were present
    ModuleMissing { aliases: Vec<String> },
    /// The module exists but lacks the component
    ComponentMissing { component: String },
    /// The component's embedded JSON string failed to decode
    PayloadDecode { component: String, message: String },
    /// No key matched any accepted spelling
    FieldMissing,
    /// A per-level table lacked one of the ascension levels
    LevelMissing { level: u32 },
    /// The raw value was present but unusable
    Unrecognized { raw: String },
}

impl fmt::Display for MappingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingFailure::ModuleMissing { aliases } => {
                write!(f, "no module named any of [{}]", aliases.join(", "))
            }
            MappingFailure::ComponentMissing { component } => {
                write!(f, "component '{component}' not found")
            }
            MappingFailure::PayloadDecode { component, message } => {
                write!(f, "payload-decode of component '{component}' failed: {message}")
            }
            MappingFailure::FieldMissing => write!(f, "no matching key"),
            MappingFailure::LevelMissing { level } => write!(f, "level {level} missing"),
            MappingFailure::Unrecognized { raw } => write!(f, "unrecognized value '{raw}'"),
        }
    }
}

/// A required field could not be produced from a payload
#[derive(Error, Debug, Clone, PartialEq)]
#[error("field '{field}' could not be mapped: {reason}")]
pub struct MappingError {
    pub field: RecordField,
    pub reason: MappingFailure,
}

impl IngestError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed entry error
    pub fn malformed_entry<S: Into<String>>(reason: S) -> Self {
        Self::MalformedEntry {
            reason: reason.into(),
        }
    }

    /// Create an output error for a path
    pub fn output<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, IngestError::Api(_) | IngestError::Mapping(_))
    }
}

impl ApiError {
    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a status error
    pub fn status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a remote (retcode) error
    pub fn remote<S: Into<String>>(retcode: i64, message: S) -> Self {
        Self::Remote {
            retcode,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

impl MappingError {
    pub fn new(field: RecordField, reason: MappingFailure) -> Self {
        Self { field, reason }
    }

    /// Shorthand for a field with no matching key
    pub fn missing(field: RecordField) -> Self {
        Self::new(field, MappingFailure::FieldMissing)
    }

    /// Whether the failure came from the embedded JSON decode step
    pub fn is_payload_decode(&self) -> bool {
        matches!(self.reason, MappingFailure::PayloadDecode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_error_display_names_field_and_reason() {
        let err = MappingError::new(
            RecordField::HpCurve,
            MappingFailure::PayloadDecode {
                component: "ascension".to_string(),
                message: "expected value at line 1 column 1".to_string(),
            },
        );
        let text = err.to_string();
        assert!(text.contains("hp"));
        assert!(text.contains("payload-decode"));
        assert!(err.is_payload_decode());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(IngestError::from(ApiError::transport("reset")).is_retryable());
        assert!(IngestError::from(MappingError::missing(RecordField::Specialty)).is_retryable());
        assert!(
            !IngestError::Validation {
                entry_id: "1".to_string(),
                errors: vec!["bad".to_string()],
            }
            .is_retryable()
        );
        assert!(!IngestError::malformed_entry("blank id").is_retryable());
        assert!(
            !IngestError::Policy {
                actual: 0.5,
                required: 0.8
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_policy_error_message() {
        let err = IngestError::Policy {
            actual: 0.5,
            required: 0.8,
        };
        assert_eq!(
            err.to_string(),
            "Success rate 0.500 is below the required minimum 0.800"
        );
    }
}
