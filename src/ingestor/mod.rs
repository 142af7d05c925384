//! Batch ingestion of wiki entries
//!
//! [`BatchPipeline`] drives each entry through fetch → map → validate with
//! per-entry retries, falls back to [`DegradationBuilder`] records when the
//! [`DegradationPolicy`] allows it, and reports progress through an optional
//! [`IngestionStateManager`].

pub mod degradation;
pub mod options;
pub mod pipeline;
pub mod retry;
pub mod state_manager;

pub use degradation::DegradationBuilder;
pub use options::{DegradationPolicy, ExecutionMode, PipelineOptions};
pub use pipeline::{BatchPipeline, validate_pipeline_outcome};
pub use retry::{RetryOutcome, RetryPolicy};
pub use state_manager::{IngestionProgress, IngestionState, IngestionStateManager};
