use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::data_mapping::FieldRequirements;
use crate::errors::{IngestError, IngestResult};
use crate::ingestor::{DegradationPolicy, ExecutionMode, PipelineOptions};
use crate::models::{Locale, RecordField};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

/// Content API client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Batch pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches; also the unit of linear retry backoff
    #[serde(default = "default_inter_batch_delay", with = "duration_serde::duration")]
    pub inter_batch_delay: Duration,
    #[serde(default = "default_max_retries_per_item")]
    pub max_retries_per_item: u32,
    #[serde(default = "default_min_success_rate")]
    pub min_success_rate: f64,
    #[serde(default)]
    pub execution: ExecutionMode,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub secondary_locale: Option<Locale>,
    #[serde(default)]
    pub degradation: DegradationPolicy,
    /// Record fields whose absence fails mapping
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<RecordField>,
}

/// Where successful records are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_pretty_output")]
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}
fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_inter_batch_delay() -> Duration {
    DEFAULT_INTER_BATCH_DELAY
}
fn default_max_retries_per_item() -> u32 {
    DEFAULT_MAX_RETRIES_PER_ITEM
}
fn default_min_success_rate() -> f64 {
    DEFAULT_MIN_SUCCESS_RATE
}
fn default_required_fields() -> Vec<RecordField> {
    vec![
        RecordField::Attributes,
        RecordField::Specialty,
        RecordField::HpCurve,
        RecordField::AtkCurve,
        RecordField::DefCurve,
    ]
}
fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}
fn default_pretty_output() -> bool {
    DEFAULT_PRETTY_OUTPUT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            inter_batch_delay: default_inter_batch_delay(),
            max_retries_per_item: default_max_retries_per_item(),
            min_success_rate: default_min_success_rate(),
            execution: ExecutionMode::default(),
            locale: Locale::default(),
            secondary_locale: None,
            degradation: DegradationPolicy::default(),
            required_fields: default_required_fields(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: default_pretty_output(),
        }
    }
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            inter_batch_delay: config.inter_batch_delay,
            max_retries_per_item: config.max_retries_per_item,
            min_success_rate: config.min_success_rate,
            execution: config.execution,
            locale: config.locale,
            secondary_locale: config.secondary_locale,
            degradation: config.degradation,
        }
    }
}

impl PipelineConfig {
    pub fn field_requirements(&self) -> FieldRequirements {
        FieldRequirements::new(self.required_fields.iter().copied())
    }
}

impl Config {
    /// Layered sources: defaults, then the TOML file, then environment
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
    }

    pub fn load_from_file(config_file: Option<&Path>) -> IngestResult<Self> {
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(IngestError::configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from {}", path.display());
        }

        let config: Config = Self::figment(config_file)
            .extract()
            .map_err(|e| IngestError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IngestResult<()> {
        if self.client.base_url.trim().is_empty() {
            return Err(IngestError::configuration("client.base_url must not be empty"));
        }
        if self.client.timeout.is_zero() {
            return Err(IngestError::configuration("client.timeout must be greater than zero"));
        }
        PipelineOptions::from(&self.pipeline).validate()
    }

    /// The default configuration as a TOML document
    pub fn default_toml() -> IngestResult<String> {
        toml::to_string_pretty(&Config::default())
            .map_err(|e| IngestError::configuration(format!("Failed to render default config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(PipelineOptions::from(&config.pipeline), PipelineOptions::default());
        assert_eq!(config.pipeline.field_requirements(), FieldRequirements::default());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config: Config = Config::figment(None)
            .merge(Toml::string(
                r#"
                [pipeline]
                batch_size = 3
                inter_batch_delay = "250ms"
                execution = "concurrent"
                locale = "zh-cn"
                secondary_locale = "en-us"
                degradation = "always"
                required_fields = ["hp", "name"]
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.pipeline.batch_size, 3);
        assert_eq!(config.pipeline.inter_batch_delay, Duration::from_millis(250));
        assert_eq!(config.pipeline.execution, ExecutionMode::Concurrent);
        assert_eq!(config.pipeline.locale, Locale::ZhCn);
        assert_eq!(config.pipeline.secondary_locale, Some(Locale::EnUs));
        assert_eq!(config.pipeline.degradation, DegradationPolicy::Always);
        assert!(config.pipeline.field_requirements().is_required(RecordField::Name));
        assert_eq!(config.pipeline.max_retries_per_item, DEFAULT_MAX_RETRIES_PER_ITEM);
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_load_from_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pipeline]\nbatch_size = 0").unwrap();
        let err = Config::load_from_file(Some(file.path())).unwrap_err();
        assert!(matches!(err, IngestError::Configuration { .. }));

        let missing = Config::load_from_file(Some(Path::new("/nonexistent/hoyowiki.toml")));
        assert!(missing.is_err());
    }

    #[test]
    fn test_default_toml_round_trips() {
        let rendered = Config::default_toml().unwrap();
        let parsed: Config = Config::figment(None)
            .merge(Toml::string(&rendered))
            .extract()
            .unwrap();
        assert_eq!(parsed, Config::default());
    }
}
