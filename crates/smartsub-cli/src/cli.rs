use anyhow::Context;
use clap::Parser;
use smartsub_core::{FeedbackBackend, ValidatorConfig};
use std::path::PathBuf;

/// RFID checkpoint validator.
///
/// Reads tags from a keyboard-emulating reader, validates them against the
/// checkpoint service and signals the verdict on LEDs and a buzzer.
#[derive(Debug, Parser)]
#[command(name = "smartsub")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long, env = "SMARTSUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Validation service base URL, overriding the configuration file
    #[arg(long, env = "SMARTSUB_API_URL")]
    pub api_url: Option<String>,

    /// Log feedback instead of driving GPIO lines
    #[arg(long)]
    pub console_feedback: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Print input devices and which ones match the reader hints, then exit
    #[arg(long)]
    pub list_devices: bool,

    /// Print the last N access-log records, then exit
    #[arg(long, value_name = "N")]
    pub recent_reads: Option<usize>,
}

impl Cli {
    /// Defaults, then the config file, then flags and environment.
    pub fn load_config(&self) -> anyhow::Result<ValidatorConfig> {
        let mut config = match &self.config {
            Some(path) => ValidatorConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => ValidatorConfig::default(),
        };

        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if self.console_feedback {
            config.feedback.backend = FeedbackBackend::Console;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}
