//! Batch run results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::agent::AgentRecord;

/// Pipeline stage at which an entry was given up on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The entry itself was unusable
    Entry,
    Fetch,
    Map,
    Validate,
    Degrade,
    /// The run was cancelled before the entry finished
    Cancelled,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Entry => "entry",
            FailureStage::Fetch => "fetch",
            FailureStage::Map => "map",
            FailureStage::Validate => "validate",
            FailureStage::Degrade => "degrade",
            FailureStage::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Descriptor for an entry that produced no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEntry {
    pub entry_id: String,
    pub error: String,
    pub stage: FailureStage,
    /// Fetch→map→validate attempts actually made
    pub attempts: u32,
}

/// Aggregate counters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub retries: u32,
    /// Successful records that came from the degradation path
    pub degraded: usize,
    pub success_rate: f64,
    pub processing_time_ms: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl BatchStatistics {
    /// `successful / total`, or `0.0` for an empty run
    pub fn rate(successful: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64
        }
    }
}

/// Outcome of [`crate::ingestor::BatchPipeline::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub successful: Vec<AgentRecord>,
    pub failed: Vec<FailedEntry>,
    pub statistics: BatchStatistics,
}

impl BatchResult {
    /// Failure descriptor for an entry id, if that entry failed
    pub fn failure_for(&self, entry_id: &str) -> Option<&FailedEntry> {
        self.failed.iter().find(|f| f.entry_id == entry_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_handles_empty_runs() {
        assert_eq!(BatchStatistics::rate(0, 0), 0.0);
        assert_eq!(BatchStatistics::rate(1, 2), 0.5);
        assert_eq!(BatchStatistics::rate(3, 3), 1.0);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FailureStage::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(FailureStage::Fetch.to_string(), "fetch");
    }
}
