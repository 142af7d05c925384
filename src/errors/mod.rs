//! Centralized error handling for the ingestion pipeline
//!
//! # Error Categories
//!
//! - **API Errors**: content API transport, status and return-code failures
//! - **Mapping Errors**: required record fields missing from a payload
//! - **Validation Errors**: mapped records violating structural invariants
//! - **Policy Errors**: a finished run judged unacceptable by its success rate
//! - **Configuration / Output Errors**: pipeline-level failures
//!
//! # Usage
//!
//! ```rust
//! use hoyowiki_ingest::errors::{IngestError, IngestResult};
//!
//! fn example_function() -> IngestResult<String> {
//!     Err(IngestError::configuration("batch_size must be at least 1"))
//! }
//! assert!(example_function().is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using IngestError
pub type IngestResult<T> = Result<T, IngestError>;

/// Convenience type alias for content API Results
pub type ApiResult<T> = Result<T, ApiError>;

/// Convenience type alias for mapper Results
pub type MappingResult<T> = Result<T, MappingError>;
