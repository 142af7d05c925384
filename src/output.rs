//! Persistence of successful records

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputConfig;
use crate::errors::{IngestError, IngestResult};
use crate::models::AgentRecord;

#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn write(&self, records: &[AgentRecord]) -> IngestResult<()>;
}

/// Writes records as one JSON array, replacing the file atomically
pub struct JsonFileSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn output_error(&self, message: impl std::fmt::Display) -> IngestError {
        IngestError::output(self.path.display().to_string(), message.to_string())
    }
}

impl From<&OutputConfig> for JsonFileSink {
    fn from(config: &OutputConfig) -> Self {
        Self::new(config.path.clone()).with_pretty(config.pretty)
    }
}

#[async_trait]
impl OutputSink for JsonFileSink {
    async fn write(&self, records: &[AgentRecord]) -> IngestResult<()> {
        let body = if self.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        }
        .map_err(|e| self.output_error(e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, &body).await?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.output_error(e))?;

        info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
