//! SmartSub checkpoint validator (`smartsub`).
//!
//! # Exit codes
//! - `0`: stopped by SIGINT/SIGTERM, or `--list-devices`/`--recent-reads` finished
//! - `1`: startup or configuration failure
//! - `2`: another instance holds the lock file
//! - `3`: no input device matches the reader hints
//! - `4`: the reader failed or disappeared; a supervisor should restart us

mod audit;
mod cli;
mod lock;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use smartsub_core::constants::{
    EXIT_ALREADY_RUNNING, EXIT_DEVICE_LOST, EXIT_NO_READER, EXIT_OK, EXIT_STARTUP_FAILURE,
};
use smartsub_core::{VERSION, ValidatorConfig};
use smartsub_engine::{ServiceExit, ValidatorService};
use smartsub_hardware::{
    AnyKeySource, EvdevReader, FeedbackLines, HardwareError, list_input_devices, matches_hints,
};
use smartsub_network::{ValidationClient, ValidationClientConfig};
use smartsub_storage::FileAccessLog;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            EXIT_STARTUP_FAILURE
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Install the global subscriber; `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.load_config()?;

    if cli.list_devices {
        print_devices(&config);
        return Ok(EXIT_OK);
    }

    if let Some(count) = cli.recent_reads {
        let log = FileAccessLog::new(config.storage.access_log.clone());
        return runtime()?.block_on(audit::print_recent_reads(&log, count));
    }

    info!(version = VERSION, "SmartSub validator starting");

    let instance = match lock::InstanceLock::acquire(&config.storage.lock_file) {
        Ok(lock) => lock,
        Err(lock::LockError::Held { path }) => {
            error!(path = %path.display(), "Another validator instance is running");
            return Ok(EXIT_ALREADY_RUNNING);
        }
        Err(e) => return Err(e.into()),
    };
    info!(lock = %instance.path().display(), "Instance lock held");

    let code = runtime()?.block_on(serve(config));
    drop(instance);
    code
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building the async runtime")
}

async fn serve(config: ValidatorConfig) -> anyhow::Result<i32> {
    let reader = match EvdevReader::discover(&config.reader.hints, config.reader.grab) {
        Ok(reader) => AnyKeySource::from(reader),
        Err(e @ HardwareError::NoMatchingDevice { .. }) => {
            error!(error = %e, "No RFID reader found");
            return Ok(EXIT_NO_READER);
        }
        Err(e) => return Err(e).context("opening the RFID reader"),
    };

    let client = ValidationClient::new(ValidationClientConfig::from(&config.api))
        .context("building the validation client")?;
    let lines = FeedbackLines::from_config(&config.feedback)
        .context("claiming the feedback lines")?;
    let access_log = FileAccessLog::new(config.storage.access_log.clone());

    info!(
        api = %config.api.base_url,
        method = %config.api.method,
        access_log = %config.storage.access_log.display(),
        "Validator ready"
    );

    let service = ValidatorService::new(client, access_log, lines, &config.timing);
    match service.run(reader, shutdown_signal()).await {
        ServiceExit::Shutdown => {
            info!("Validator stopped");
            Ok(EXIT_OK)
        }
        ServiceExit::DeviceLost(_) => Ok(EXIT_DEVICE_LOST),
    }
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

fn print_devices(config: &ValidatorConfig) {
    let devices = list_input_devices();
    if devices.is_empty() {
        println!("No input devices found (is this user in the 'input' group?)");
        return;
    }
    for device in devices {
        let marker = if matches_hints(&device.name, &config.reader.hints) {
            "*"
        } else {
            " "
        };
        println!("{marker} {device}");
    }
    println!();
    println!("* matches reader hints: {}", config.reader.hints.join(", "));
}
