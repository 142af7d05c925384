/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
use std::time::Duration;

// Client defaults
pub const DEFAULT_BASE_URL: &str = "https://sg-wiki-api-static.hoyolab.com/hoyowiki/zzz/wapi";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("hoyowiki-ingest/", env!("CARGO_PKG_VERSION"));

// Pipeline defaults
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_RETRIES_PER_ITEM: u32 = 2;
pub const DEFAULT_MIN_SUCCESS_RATE: f64 = 0.8;

// Output defaults
pub const DEFAULT_OUTPUT_PATH: &str = "./data/agents.json";
pub const DEFAULT_PRETTY_OUTPUT: bool = true;

// Environment overrides, e.g. HOYOWIKI_INGEST_PIPELINE__BATCH_SIZE=5
pub const ENV_PREFIX: &str = "HOYOWIKI_INGEST_";
pub const ENV_SEPARATOR: &str = "__";
