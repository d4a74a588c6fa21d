//! Validator configuration.
//!
//! Configuration is layered: built-in defaults (see [`constants`](crate::constants)),
//! then an optional TOML file, then command-line flags and environment variables
//! applied by the binary. Every field has a default, so an empty file is valid.
//!
//! ```toml
//! [reader]
//! hints = ["rfid", "uhf"]
//!
//! [api]
//! base_url = "http://checkpoint.local:9062/api/checkpoint-posto/6100/4041/1"
//! method = "POST"
//! timeout_ms = 2500
//! headers = { Authorization = "Bearer secret" }
//!
//! [timing]
//! idle_threshold_ms = 30000
//!
//! [feedback]
//! backend = "gpio"
//! green_pin = 17
//! ```

use crate::constants::*;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub reader: ReaderConfig,
    pub api: ApiConfig,
    pub timing: TimingConfig,
    pub feedback: FeedbackConfig,
    pub storage: StorageConfig,
}

impl ValidatorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` on malformed TOML or unknown keys, and
    /// `Error::Config` when a value is out of range.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ValidatorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field and range constraints.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.reader.hints.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::Config(
                "reader.hints must contain at least one non-empty hint".to_string(),
            ));
        }

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api.base_url must be an http(s) URL, got {url:?}"
            )));
        }

        if !(MIN_API_TIMEOUT_MS..=MAX_API_TIMEOUT_MS).contains(&self.api.timeout_ms) {
            return Err(Error::Config(format!(
                "api.timeout_ms must be {MIN_API_TIMEOUT_MS}-{MAX_API_TIMEOUT_MS}, got {}",
                self.api.timeout_ms
            )));
        }

        if self.timing.poll_interval_ms == 0 || self.timing.reminder_interval_ms == 0 {
            return Err(Error::Config(
                "timing.poll_interval_ms and timing.reminder_interval_ms must be positive"
                    .to_string(),
            ));
        }

        let pins = [
            self.feedback.green_pin,
            self.feedback.red_pin,
            self.feedback.buzzer_pin,
        ];
        if pins[0] == pins[1] || pins[1] == pins[2] || pins[0] == pins[2] {
            return Err(Error::Config(format!(
                "feedback pins must be distinct, got green={} red={} buzzer={}",
                pins[0], pins[1], pins[2]
            )));
        }

        Ok(())
    }
}

/// Reader discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Case-insensitive name fragments identifying the reader.
    pub hints: Vec<String>,

    /// Request exclusive access to the device so scans do not leak into the console.
    pub grab: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            hints: RFID_HINTS.iter().map(|h| h.to_string()).collect(),
            grab: true,
        }
    }
}

/// HTTP method used for validation requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[default]
    #[serde(alias = "post")]
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Checkpoint service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL; the tag is appended as the last path segment.
    pub base_url: String,

    pub method: HttpMethod,

    /// Timeout for the whole request (milliseconds).
    pub timeout_ms: u64,

    /// Static headers sent with every request (e.g. a bearer token).
    pub headers: BTreeMap<String, String>,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            method: HttpMethod::Post,
            timeout_ms: DEFAULT_API_TIMEOUT_MS,
            headers: BTreeMap::new(),
            use_system_proxy: true,
        }
    }
}

/// Debounce and idle-alarm timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub idle_threshold_ms: u64,
    pub reminder_interval_ms: u64,
    pub min_repeat_ms: u64,
    pub poll_interval_ms: u64,
}

impl TimingConfig {
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_millis(self.idle_threshold_ms)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_millis(self.reminder_interval_ms)
    }

    pub fn min_repeat_interval(&self) -> Duration {
        Duration::from_millis(self.min_repeat_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_threshold_ms: DEFAULT_IDLE_THRESHOLD_MS,
            reminder_interval_ms: DEFAULT_REMINDER_INTERVAL_MS,
            min_repeat_ms: DEFAULT_MIN_REPEAT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Where feedback signals are played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackBackend {
    /// Raspberry Pi GPIO lines.
    #[default]
    Gpio,
    /// Log line changes only (bench setups without LEDs).
    Console,
}

/// Feedback hardware wiring (BCM pin numbers).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackConfig {
    pub backend: FeedbackBackend,
    pub green_pin: u8,
    pub red_pin: u8,
    pub buzzer_pin: u8,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            backend: FeedbackBackend::Gpio,
            green_pin: PIN_GREEN,
            red_pin: PIN_RED,
            buzzer_pin: PIN_BUZZER,
        }
    }
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub access_log: PathBuf,
    pub lock_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_log: PathBuf::from(DEFAULT_ACCESS_LOG),
            lock_file: PathBuf::from(DEFAULT_LOCK_FILE),
        }
    }
}
