//! Per-run pipeline options

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::defaults::{
    DEFAULT_BATCH_SIZE, DEFAULT_INTER_BATCH_DELAY, DEFAULT_MAX_RETRIES_PER_ITEM,
    DEFAULT_MIN_SUCCESS_RATE,
};
use crate::errors::{IngestError, IngestResult};
use crate::models::Locale;

/// How entries inside one batch are processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One entry at a time
    #[default]
    Sequential,
    /// Up to `batch_size` entries in flight
    Concurrent,
}

/// When an entry that exhausted its retries falls back to a minimal record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationPolicy {
    Never,
    /// Only when the page was fetched but could not be fully mapped
    #[default]
    MappingFailures,
    /// After any recoverable failure, including fetch failures
    Always,
}

impl DegradationPolicy {
    /// Whether the last error of an exhausted entry permits degradation
    pub fn allows(&self, last_error: &IngestError) -> bool {
        match self {
            DegradationPolicy::Never => false,
            DegradationPolicy::MappingFailures => matches!(last_error, IngestError::Mapping(_)),
            DegradationPolicy::Always => last_error.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub batch_size: usize,
    /// Pause between batches, and the unit of per-entry backoff
    pub inter_batch_delay: Duration,
    pub max_retries_per_item: u32,
    /// Consumed by [`super::validate_pipeline_outcome`], not by `run`
    pub min_success_rate: f64,
    pub execution: ExecutionMode,
    pub locale: Locale,
    /// Extra locale fetched once per success for its page name
    pub secondary_locale: Option<Locale>,
    pub degradation: DegradationPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            max_retries_per_item: DEFAULT_MAX_RETRIES_PER_ITEM,
            min_success_rate: DEFAULT_MIN_SUCCESS_RATE,
            execution: ExecutionMode::default(),
            locale: Locale::default(),
            secondary_locale: None,
            degradation: DegradationPolicy::default(),
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> IngestResult<()> {
        if self.batch_size == 0 {
            return Err(IngestError::configuration("batch_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_success_rate) {
            return Err(IngestError::configuration(format!(
                "min_success_rate must be within [0, 1], got {}",
                self.min_success_rate
            )));
        }
        if self.secondary_locale == Some(self.locale) {
            return Err(IngestError::configuration(format!(
                "secondary_locale must differ from locale ({})",
                self.locale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ApiError, MappingError};
    use crate::models::RecordField;

    #[test]
    fn test_default_options_are_valid() {
        assert!(PipelineOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let zero_batch = PipelineOptions {
            batch_size: 0,
            ..PipelineOptions::default()
        };
        assert!(matches!(zero_batch.validate(), Err(IngestError::Configuration { .. })));

        let bad_rate = PipelineOptions {
            min_success_rate: f64::NAN,
            ..PipelineOptions::default()
        };
        assert!(bad_rate.validate().is_err());

        let same_locale = PipelineOptions {
            secondary_locale: Some(Locale::EnUs),
            ..PipelineOptions::default()
        };
        assert!(same_locale.validate().is_err());
    }

    #[test]
    fn test_degradation_policy() {
        let mapping = IngestError::Mapping(MappingError::missing(RecordField::HpCurve));
        let fetch = IngestError::Api(ApiError::transport("timeout"));
        let validation = IngestError::Validation {
            entry_id: "1".to_string(),
            errors: Vec::new(),
        };

        assert!(DegradationPolicy::MappingFailures.allows(&mapping));
        assert!(!DegradationPolicy::MappingFailures.allows(&fetch));
        assert!(DegradationPolicy::Always.allows(&fetch));
        assert!(!DegradationPolicy::Always.allows(&validation));
        assert!(!DegradationPolicy::Never.allows(&mapping));
    }
}
