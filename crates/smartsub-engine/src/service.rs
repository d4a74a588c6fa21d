//! The running validator.
//!
//! [`ValidatorService`] owns the shared session and feedback controller,
//! runs the input decoder in the foreground and the idle watchdog in the
//! background, and forces every feedback line off on the way out.

use crate::decoder::InputDecoder;
use crate::processor::{SharedFeedback, TagProcessor};
use crate::session::Session;
use crate::watchdog::IdleWatchdog;
use smartsub_core::config::TimingConfig;
use smartsub_hardware::{FeedbackController, FeedbackLines, HardwareError, KeySource};
use smartsub_network::TagValidator;
use smartsub_storage::AccessLogRepository;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Longest wait for in-flight feedback before lines are forced off anyway.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Why [`ValidatorService::run`] returned.
#[derive(Debug)]
pub enum ServiceExit {
    /// The shutdown future completed.
    Shutdown,
    /// The reader failed or disappeared.
    DeviceLost(HardwareError),
}

/// Decoder, processor and watchdog wired to one session.
#[derive(Debug)]
pub struct ValidatorService<V, L> {
    processor: Arc<TagProcessor<V, L>>,
    session: Arc<Session>,
    feedback: SharedFeedback,
    timing: TimingConfig,
}

impl<V, L> ValidatorService<V, L>
where
    V: TagValidator,
    L: AccessLogRepository,
{
    pub fn new(validator: V, access_log: L, lines: FeedbackLines, timing: &TimingConfig) -> Self {
        let session = Arc::new(Session::new());
        let feedback = Arc::new(Mutex::new(FeedbackController::new(lines)));
        let processor = TagProcessor::new(
            validator,
            access_log,
            Arc::clone(&session),
            Arc::clone(&feedback),
            timing.min_repeat_interval(),
        );

        Self {
            processor: Arc::new(processor),
            session,
            feedback,
            timing: timing.clone(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn feedback(&self) -> &SharedFeedback {
        &self.feedback
    }

    /// Read tags from `source` until it fails or `shutdown` completes.
    ///
    /// Each tag is processed in its own task. On return the watchdog is
    /// stopped and the feedback lines are released.
    pub async fn run<K, S>(&self, source: K, shutdown: S) -> ServiceExit
    where
        K: KeySource,
        S: Future<Output = ()>,
    {
        let device = source.info().to_string();
        info!(device = %device, "Reading tags");

        let watchdog = IdleWatchdog::new(
            Arc::clone(&self.session),
            Arc::clone(&self.feedback),
            &self.timing,
        );
        let watchdog = tokio::spawn(watchdog.run());

        let mut decoder = InputDecoder::new(source);
        let exit = tokio::select! {
            e = decoder.run(|tag| {
                self.processor.dispatch(tag);
            }) => {
                error!(device = %device, error = %e, "Reader lost");
                ServiceExit::DeviceLost(e)
            }
            () = shutdown => {
                info!("Shutdown requested");
                ServiceExit::Shutdown
            }
        };

        watchdog.abort();
        self.teardown().await;
        exit
    }

    /// Turn every line off and release the feedback hardware.
    ///
    /// Waits briefly for a pattern in progress to finish first.
    pub async fn teardown(&self) {
        match tokio::time::timeout(TEARDOWN_TIMEOUT, self.feedback.lock()).await {
            Ok(mut feedback) => feedback.shutdown(),
            Err(_) => warn!("Feedback still busy at shutdown, lines left to drop"),
        }
    }
}
