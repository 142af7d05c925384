//! Batch orchestration: fetch → map → validate, with retries and degradation

use chrono::Utc;
use futures::{StreamExt, stream};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, warn};
use uuid::Uuid;

use super::degradation::DegradationBuilder;
use super::options::{ExecutionMode, PipelineOptions};
use super::retry::{RetryOutcome, RetryPolicy, sleep_or_cancel, with_retry};
use super::state_manager::{IngestionState, IngestionStateManager};
use crate::data_mapping::RecordMapper;
use crate::errors::{IngestError, IngestResult};
use crate::models::{AgentRecord, BatchResult, BatchStatistics, Entry, FailedEntry, FailureStage};
use crate::sources::ContentClient;
use crate::validation::Validator;

/// Result of one entry, collected by the run loop
#[derive(Debug)]
struct EntryOutcome {
    entry_id: String,
    result: Result<AgentRecord, FailedEntry>,
    retries: u32,
}

impl EntryOutcome {
    fn failed(entry: &Entry, error: String, stage: FailureStage, attempts: u32) -> Self {
        Self {
            entry_id: entry.id.clone(),
            result: Err(FailedEntry {
                entry_id: entry.id.clone(),
                error,
                stage,
                attempts,
            }),
            retries: attempts.saturating_sub(1),
        }
    }
}

fn stage_for(error: &IngestError) -> FailureStage {
    match error {
        IngestError::Api(_) => FailureStage::Fetch,
        IngestError::Mapping(_) => FailureStage::Map,
        IngestError::Validation { .. } => FailureStage::Validate,
        IngestError::MalformedEntry { .. }
        | IngestError::Policy { .. }
        | IngestError::Configuration { .. }
        | IngestError::Output { .. }
        | IngestError::Io(_) => FailureStage::Entry,
    }
}

/// Runs a list of entries through the content client, mapper and validator
pub struct BatchPipeline {
    client: Arc<dyn ContentClient>,
    mapper: RecordMapper,
    validator: Validator,
    degradation: DegradationBuilder,
    cancellation: CancellationToken,
    state_manager: Option<IngestionStateManager>,
    span: Span,
}

impl BatchPipeline {
    pub fn new(client: Arc<dyn ContentClient>, mapper: RecordMapper) -> Self {
        Self {
            client,
            mapper,
            validator: Validator::new(),
            degradation: DegradationBuilder::new(),
            cancellation: CancellationToken::new(),
            state_manager: None,
            span: Span::none(),
        }
    }

    /// Token checked at batch boundaries and before every retry sleep
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_state_manager(mut self, state_manager: IngestionStateManager) -> Self {
        self.state_manager = Some(state_manager);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Process every entry. Only invalid options fail the run; per-entry
    /// problems end up in [`BatchResult::failed`].
    pub async fn run(&self, entries: &[Entry], options: &PipelineOptions) -> IngestResult<BatchResult> {
        options.validate()?;
        self.run_batches(entries, options)
            .instrument(self.span.clone())
            .await
    }

    async fn run_batches(&self, entries: &[Entry], options: &PipelineOptions) -> IngestResult<BatchResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let policy = RetryPolicy::new(options.max_retries_per_item, options.inter_batch_delay);

        let run_id = match &self.state_manager {
            Some(manager) => Some(manager.start_run(entries.len()).await),
            None => None,
        };

        info!(
            "Starting ingestion of {} entries in batches of {} ({:?})",
            entries.len(),
            options.batch_size,
            options.execution
        );

        let mut outcomes: Vec<EntryOutcome> = Vec::with_capacity(entries.len());
        let chunks: Vec<&[Entry]> = entries.chunks(options.batch_size).collect();
        let mut cancelled_at = None;

        for (index, chunk) in chunks.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                cancelled_at = Some(index);
                break;
            }
            if index > 0 && !sleep_or_cancel(options.inter_batch_delay, &self.cancellation).await {
                cancelled_at = Some(index);
                break;
            }

            debug!(
                "Processing batch {}/{} ({} entries)",
                index + 1,
                chunks.len(),
                chunk.len()
            );

            match options.execution {
                ExecutionMode::Sequential => {
                    for entry in chunk.iter() {
                        let outcome = self.process_entry(entry, options, &policy).await;
                        self.publish(run_id, &outcome).await;
                        outcomes.push(outcome);
                    }
                }
                ExecutionMode::Concurrent => {
                    let batch: Vec<EntryOutcome> = stream::iter(chunk.iter())
                        .map(|entry| self.process_entry(entry, options, &policy))
                        .buffered(options.batch_size)
                        .collect()
                        .await;
                    for outcome in batch {
                        self.publish(run_id, &outcome).await;
                        outcomes.push(outcome);
                    }
                }
            }
        }

        if let Some(index) = cancelled_at {
            let remaining: usize = chunks[index..].iter().map(|c| c.len()).sum();
            warn!("Run cancelled, {} entries left unprocessed", remaining);
            for entry in chunks[index..].iter().flat_map(|c| c.iter()) {
                let outcome = EntryOutcome::failed(
                    entry,
                    "run cancelled before entry was processed".to_string(),
                    FailureStage::Cancelled,
                    0,
                );
                self.publish(run_id, &outcome).await;
                outcomes.push(outcome);
            }
        }

        let result = assemble(outcomes, entries.len(), started_at, start);

        info!(
            "Ingestion finished: {}/{} successful ({} degraded), {} failed, {} retries in {}ms",
            result.statistics.successful,
            result.statistics.total,
            result.statistics.degraded,
            result.statistics.failed,
            result.statistics.retries,
            result.statistics.processing_time_ms
        );

        if let (Some(manager), Some(run_id)) = (&self.state_manager, run_id) {
            let state = if cancelled_at.is_some() || self.cancellation.is_cancelled() {
                IngestionState::Cancelled
            } else {
                IngestionState::Completed
            };
            manager.finish_run(run_id, state, None).await;
        }

        Ok(result)
    }

    async fn publish(&self, run_id: Option<Uuid>, outcome: &EntryOutcome) {
        if let (Some(manager), Some(run_id)) = (&self.state_manager, run_id) {
            manager
                .record_entry(run_id, &outcome.entry_id, outcome.result.is_ok())
                .await;
        }
    }

    async fn process_entry(&self, entry: &Entry, options: &PipelineOptions, policy: &RetryPolicy) -> EntryOutcome {
        if !entry.has_valid_id() {
            let error = IngestError::malformed_entry(format!(
                "entry with source '{}' has a blank id",
                entry.source_ref
            ));
            warn!("{}", error);
            return EntryOutcome::failed(entry, error.to_string(), FailureStage::Entry, 0);
        }

        let operation_name = format!("entry {}", entry.id);
        let outcome = with_retry(
            policy,
            &self.cancellation,
            || self.attempt(entry, options),
            &operation_name,
        )
        .await;
        let attempts = outcome.attempts();

        match outcome {
            RetryOutcome::Succeeded { value, .. } => {
                let record = self.enrich(entry, value, options).await;
                EntryOutcome {
                    entry_id: entry.id.clone(),
                    result: Ok(record),
                    retries: attempts.saturating_sub(1),
                }
            }
            RetryOutcome::Exhausted { error, .. } if options.degradation.allows(&error) => {
                self.degrade(entry, &error, attempts)
            }
            RetryOutcome::Exhausted { error, .. } | RetryOutcome::Aborted { error, .. } => {
                EntryOutcome::failed(entry, error.to_string(), stage_for(&error), attempts)
            }
            RetryOutcome::Cancelled { error, .. } => EntryOutcome::failed(
                entry,
                format!("cancelled after {attempts} attempts: {error}"),
                FailureStage::Cancelled,
                attempts,
            ),
        }
    }

    /// One fetch → map → validate round trip
    async fn attempt(&self, entry: &Entry, options: &PipelineOptions) -> IngestResult<AgentRecord> {
        let payload = self.client.fetch(&entry.source_ref, options.locale).await?;
        let record = self.mapper.map_entry(&payload, entry, options.locale)?;

        let validation = self.validator.validate(&record);
        if !validation.is_valid {
            return Err(IngestError::Validation {
                entry_id: entry.id.clone(),
                errors: validation.errors,
            });
        }
        for warning in &validation.warnings {
            debug!("Entry '{}': {}", entry.id, warning);
        }
        Ok(record)
    }

    async fn enrich(&self, entry: &Entry, mut record: AgentRecord, options: &PipelineOptions) -> AgentRecord {
        let Some(locale) = options.secondary_locale else {
            return record;
        };

        match self.client.fetch(&entry.source_ref, locale).await {
            Ok(payload) => match RecordMapper::page_name(&payload) {
                Some(name) => {
                    record.localized_names.insert(locale, name);
                }
                None => debug!("Entry '{}': {} page has no name", entry.id, locale),
            },
            Err(e) => warn!("Entry '{}': ignoring {} name lookup failure: {}", entry.id, locale, e),
        }
        record
    }

    fn degrade(&self, entry: &Entry, last_error: &IngestError, attempts: u32) -> EntryOutcome {
        warn!(
            "Entry '{}' exhausted {} attempts ({}), emitting a degraded record",
            entry.id, attempts, last_error
        );

        let result = match self.degradation.build_minimal(entry) {
            Ok(record) => {
                let validation = self.validator.validate(&record);
                if validation.is_valid {
                    Ok(record)
                } else {
                    Err(FailedEntry {
                        entry_id: entry.id.clone(),
                        error: validation.errors.join("; "),
                        stage: FailureStage::Degrade,
                        attempts,
                    })
                }
            }
            Err(e) => Err(FailedEntry {
                entry_id: entry.id.clone(),
                error: e.to_string(),
                stage: FailureStage::Degrade,
                attempts,
            }),
        };

        EntryOutcome {
            entry_id: entry.id.clone(),
            result,
            retries: attempts.saturating_sub(1),
        }
    }
}

fn assemble(
    outcomes: Vec<EntryOutcome>,
    total: usize,
    started_at: chrono::DateTime<Utc>,
    start: Instant,
) -> BatchResult {
    let mut successful = Vec::new();
    let mut failed = Vec::new();
    let mut retries = 0u32;

    for outcome in outcomes {
        retries = retries.saturating_add(outcome.retries);
        match outcome.result {
            Ok(record) => successful.push(record),
            Err(failure) => failed.push(failure),
        }
    }

    let degraded = successful.iter().filter(|r| r.degraded).count();
    let statistics = BatchStatistics {
        total,
        successful: successful.len(),
        failed: failed.len(),
        retries,
        degraded,
        success_rate: BatchStatistics::rate(successful.len(), total),
        processing_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        started_at,
        completed_at: Utc::now(),
    };

    BatchResult {
        successful,
        failed,
        statistics,
    }
}

/// Judge a finished run against the minimum success rate. Never touches `result`.
pub fn validate_pipeline_outcome(result: &BatchResult, min_success_rate: f64) -> IngestResult<()> {
    let actual = result.statistics.success_rate;
    if actual < min_success_rate {
        return Err(IngestError::Policy {
            actual,
            required: min_success_rate,
        });
    }
    Ok(())
}
