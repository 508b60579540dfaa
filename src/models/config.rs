//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{QuestionId, TimelineSelectors};
use crate::error::{AppError, Result};

/// Upper bound for `fetcher.timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Upper bound for `fetcher.delay_secs`.
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input/output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Page fetching behavior
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Result batching
    #[serde(default)]
    pub batch: BatchConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Timeline markup selectors
    #[serde(default)]
    pub selectors: TimelineSelectors,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.paths.ids_file.trim().is_empty() {
            return Err(AppError::validation("paths.ids_file is empty"));
        }
        if self.paths.results_file.trim().is_empty() {
            return Err(AppError::validation("paths.results_file is empty"));
        }
        if self.batch.size == 0 {
            return Err(AppError::validation("batch.size must be > 0"));
        }
        if self.fetcher.timeout_secs == 0 || self.fetcher.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(AppError::validation(format!(
                "fetcher.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"
            )));
        }
        if !(0.0..=MAX_DELAY_SECS).contains(&self.fetcher.delay_secs) {
            return Err(AppError::validation(format!(
                "fetcher.delay_secs must be between 0 and {MAX_DELAY_SECS}"
            )));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        self.fetcher.base_url()?;
        if let Some(url) = &self.fetcher.webdriver_url {
            Url::parse(url)
                .map_err(|e| AppError::validation(format!("fetcher.webdriver_url: {e}")))?;
        }
        self.logging.level_filter()?;
        if self.logging.progress_interval == 0 {
            return Err(AppError::validation(
                "logging.progress_interval must be > 0",
            ));
        }
        Ok(())
    }

    /// Full path of the question ID source.
    pub fn ids_path(&self) -> PathBuf {
        self.paths.input_dir.join(&self.paths.ids_file)
    }

    /// Full path of the result store.
    pub fn results_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.paths.results_file)
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory containing the question ID source
    #[serde(default = "defaults::input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving results and log files
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// Question ID source file name within `input_dir`
    #[serde(default = "defaults::ids_file")]
    pub ids_file: String,

    /// Result store name within `output_dir`
    #[serde(default = "defaults::results_file")]
    pub results_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: defaults::input_dir(),
            output_dir: defaults::output_dir(),
            ids_file: defaults::ids_file(),
            results_file: defaults::results_file(),
        }
    }
}

/// Page fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Site root the timeline paths are resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for plain HTTP fetching
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Page load timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Fixed delay before every fetch, in seconds
    #[serde(default = "defaults::delay")]
    pub delay_secs: f64,

    /// Run the browser without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// WebDriver endpoint (e.g. `http://localhost:9515`). Plain HTTP is used
    /// when unset.
    #[serde(default)]
    pub webdriver_url: Option<String>,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.delay_secs)
            .map_err(|e| AppError::validation(format!("fetcher.delay_secs: {e}")))
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| AppError::validation(format!("fetcher.base_url: {e}")))
    }

    /// Timeline page URL for a question.
    pub fn timeline_url(&self, question_id: QuestionId) -> Result<Url> {
        let path = format!("posts/{question_id}/timeline");
        Ok(self.base_url()?.join(&path)?)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            delay_secs: defaults::delay(),
            headless: defaults::headless(),
            webdriver_url: None,
        }
    }
}

/// Result batching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of results collected before appending to the store
    #[serde(default = "defaults::batch_size")]
    pub size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: defaults::batch_size(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: debug, info, warning, error or critical
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Log file name within the output directory. A timestamped name is
    /// generated when unset.
    #[serde(default)]
    pub file: Option<String>,

    /// Emit periodic progress lines
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,

    /// Number of attempted questions between progress lines
    #[serde(default = "defaults::progress_interval")]
    pub progress_interval: usize,
}

impl LoggingConfig {
    /// Parse the configured level.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        match self.level.trim().to_lowercase().as_str() {
            "debug" => Ok(LevelFilter::Debug),
            "info" => Ok(LevelFilter::Info),
            "warn" | "warning" => Ok(LevelFilter::Warn),
            "error" | "critical" => Ok(LevelFilter::Error),
            other => Err(AppError::validation(format!(
                "logging.level '{other}' is not one of debug, info, warning, error, critical"
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: None,
            show_progress: defaults::show_progress(),
            progress_interval: defaults::progress_interval(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Path defaults
    pub fn input_dir() -> PathBuf {
        PathBuf::from("./input_data")
    }
    pub fn output_dir() -> PathBuf {
        PathBuf::from("./output_data")
    }
    pub fn ids_file() -> String {
        "bounty_question_ids.parquet".into()
    }
    pub fn results_file() -> String {
        "bounty_timeline_results.parquet".into()
    }

    // Fetcher defaults
    pub fn base_url() -> String {
        "https://stackoverflow.com".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bounty-timeline/0.1)".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn delay() -> f64 {
        0.1
    }
    pub fn headless() -> bool {
        true
    }

    // Batch defaults
    pub fn batch_size() -> usize {
        1000
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn show_progress() -> bool {
        true
    }
    pub fn progress_interval() -> usize {
        100
    }
}
