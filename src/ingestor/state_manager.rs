use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionState {
    Processing,
    Completed,
    Cancelled,
    Error,
}

impl IngestionState {
    pub fn is_active(&self) -> bool {
        matches!(self, IngestionState::Processing)
    }
}

impl std::fmt::Display for IngestionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionState::Processing => write!(f, "processing"),
            IngestionState::Completed => write!(f, "completed"),
            IngestionState::Cancelled => write!(f, "cancelled"),
            IngestionState::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionProgress {
    pub run_id: Uuid,
    pub state: IngestionState,
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub current_entry: Option<String>,
    pub percentage: f64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Run-scoped progress tracking with broadcast subscription
#[derive(Clone)]
pub struct IngestionStateManager {
    states: Arc<RwLock<HashMap<Uuid, IngestionProgress>>>,
    progress_tx: broadcast::Sender<IngestionProgress>,
}

impl IngestionStateManager {
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(1000);
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
            progress_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IngestionProgress> {
        self.progress_tx.subscribe()
    }

    pub async fn start_run(&self, total: usize) -> Uuid {
        let run_id = Uuid::new_v4();
        let now = Utc::now();
        let progress = IngestionProgress {
            run_id,
            state: IngestionState::Processing,
            total,
            processed: 0,
            successful: 0,
            failed: 0,
            current_entry: None,
            percentage: 0.0,
            started_at: now,
            updated_at: now,
            completed_at: None,
            error: None,
        };

        {
            let mut states = self.states.write().await;
            states.insert(run_id, progress.clone());
        }

        let _ = self.progress_tx.send(progress);
        run_id
    }

    /// Count one finished entry
    pub async fn record_entry(&self, run_id: Uuid, entry_id: &str, success: bool) {
        let updated = {
            let mut states = self.states.write().await;
            let Some(progress) = states.get_mut(&run_id) else {
                return;
            };
            progress.processed += 1;
            if success {
                progress.successful += 1;
            } else {
                progress.failed += 1;
            }
            progress.current_entry = Some(entry_id.to_string());
            progress.percentage = if progress.total == 0 {
                100.0
            } else {
                progress.processed as f64 / progress.total as f64 * 100.0
            };
            progress.updated_at = Utc::now();
            progress.clone()
        };

        let _ = self.progress_tx.send(updated);
    }

    pub async fn finish_run(&self, run_id: Uuid, state: IngestionState, error: Option<String>) {
        let updated = {
            let mut states = self.states.write().await;
            let Some(progress) = states.get_mut(&run_id) else {
                return;
            };
            let now = Utc::now();
            progress.state = state;
            progress.error = error;
            progress.current_entry = None;
            progress.updated_at = now;
            progress.completed_at = Some(now);
            progress.clone()
        };

        let _ = self.progress_tx.send(updated);
    }

    pub async fn get_progress(&self, run_id: Uuid) -> Option<IngestionProgress> {
        let states = self.states.read().await;
        states.get(&run_id).cloned()
    }

    pub async fn get_all_progress(&self) -> HashMap<Uuid, IngestionProgress> {
        let states = self.states.read().await;
        states.clone()
    }

    pub async fn has_active_runs(&self) -> bool {
        let states = self.states.read().await;
        states.values().any(|p| p.state.is_active())
    }
}

impl Default for IngestionStateManager {
    fn default() -> Self {
        Self::new()
    }
}
