//! Idle watchdog.
//!
//! After the first accepted tag the checkpoint is expected to keep seeing
//! valid tags. When none has been accepted for `idle_threshold`, the watchdog
//! plays the ALERT pattern and repeats it every `reminder_interval` until a
//! new success arrives.
//!
//! # States
//!
//! - `Dormant`: nothing accepted since startup, never alerts
//! - `Armed`: last success is younger than the threshold
//! - `Alerting`: last success is at least the threshold old
//!
//! The state is recomputed from a session snapshot on every poll; the
//! watchdog itself keeps nothing but its next sleep.

use crate::processor::SharedFeedback;
use crate::session::{Session, SessionSnapshot};
use serde::{Deserialize, Serialize};
use smartsub_core::config::TimingConfig;
use smartsub_core::constants::IDLE_REPORT_EVERY_SECS;
use smartsub_hardware::FeedbackSignal;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Where the watchdog stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchdogState {
    /// No success since startup.
    Dormant,
    /// Waiting for the threshold to pass.
    Armed,
    /// Threshold exceeded; alerts are due.
    Alerting,
}

impl fmt::Display for WatchdogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            WatchdogState::Dormant => "dormant",
            WatchdogState::Armed => "armed",
            WatchdogState::Alerting => "alerting",
        };
        write!(f, "{}", state_str)
    }
}

/// One evaluation of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleReading {
    pub state: WatchdogState,
    /// Time since the last success, zero when dormant.
    pub idle_for: Duration,
}

/// Decide the watchdog state for `snapshot` at `now`.
///
/// Processing is not considered here; the caller skips polls while a tag
/// is in flight.
pub fn evaluate(snapshot: &SessionSnapshot, now: Instant, threshold: Duration) -> IdleReading {
    let last_success = match snapshot.last_success {
        Some(at) if snapshot.has_succeeded_once => at,
        _ => {
            return IdleReading {
                state: WatchdogState::Dormant,
                idle_for: Duration::ZERO,
            };
        }
    };

    let idle_for = now.saturating_duration_since(last_success);
    let state = if idle_for >= threshold {
        WatchdogState::Alerting
    } else {
        WatchdogState::Armed
    };
    IdleReading { state, idle_for }
}

/// Polls the session and plays ALERT while the checkpoint is idle.
#[derive(Debug)]
pub struct IdleWatchdog {
    session: Arc<Session>,
    feedback: SharedFeedback,
    threshold: Duration,
    poll_interval: Duration,
    reminder_interval: Duration,
}

impl IdleWatchdog {
    pub fn new(session: Arc<Session>, feedback: SharedFeedback, timing: &TimingConfig) -> Self {
        Self {
            session,
            feedback,
            threshold: timing.idle_threshold(),
            poll_interval: timing.poll_interval(),
            reminder_interval: timing.reminder_interval(),
        }
    }

    /// Evaluate the session right now.
    pub fn check(&self) -> IdleReading {
        evaluate(&self.session.snapshot(), Instant::now(), self.threshold)
    }

    /// Run until the task is aborted.
    pub async fn run(self) {
        let mut delay = self.poll_interval;
        loop {
            tokio::time::sleep(delay).await;
            delay = self.poll_interval;

            if self.session.is_processing() {
                continue;
            }

            let reading = self.check();
            match reading.state {
                WatchdogState::Dormant => {}
                WatchdogState::Armed => {
                    let secs = reading.idle_for.as_secs();
                    if secs > 0 && secs % IDLE_REPORT_EVERY_SECS == 0 {
                        debug!(idle_for_ms = reading.idle_for.as_millis() as u64, "Idle");
                    }
                }
                WatchdogState::Alerting => {
                    if self.alert().await {
                        delay = self.reminder_interval;
                    }
                }
            }
        }
    }

    /// Play one ALERT if the session is still idle once the lock is held.
    ///
    /// Returns `true` if the pattern was played.
    async fn alert(&self) -> bool {
        let mut feedback = self.feedback.lock().await;

        // A tag may have been accepted while we waited for the lock.
        if self.session.is_processing() {
            return false;
        }
        let reading = self.check();
        if reading.state != WatchdogState::Alerting {
            return false;
        }

        info!(
            idle_for_ms = reading.idle_for.as_millis() as u64,
            "No valid tag within idle threshold, alerting"
        );
        if let Err(e) = feedback.play(FeedbackSignal::Alert).await {
            warn!(error = %e, "Alert feedback failed");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const THRESHOLD: Duration = Duration::from_secs(30);

    fn snapshot(last_success: Option<Instant>) -> SessionSnapshot {
        SessionSnapshot {
            has_succeeded_once: last_success.is_some(),
            last_success,
            last_seen_tag: None,
            last_seen_at: None,
            processing: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dormant_without_success() {
        let reading = evaluate(&snapshot(None), Instant::now(), THRESHOLD);
        assert_eq!(reading.state, WatchdogState::Dormant);
        assert_eq!(reading.idle_for, Duration::ZERO);
    }

    #[rstest]
    #[case(0, WatchdogState::Armed)]
    #[case(29_999, WatchdogState::Armed)]
    #[case(30_000, WatchdogState::Alerting)]
    #[case(95_000, WatchdogState::Alerting)]
    #[tokio::test(start_paused = true)]
    async fn test_state_by_idle_time(#[case] idle_ms: u64, #[case] expected: WatchdogState) {
        let t0 = Instant::now();
        let now = t0 + Duration::from_millis(idle_ms);
        let reading = evaluate(&snapshot(Some(t0)), now, THRESHOLD);
        assert_eq!(reading.state, expected);
        assert_eq!(reading.idle_for, Duration::from_millis(idle_ms));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WatchdogState::Dormant.to_string(), "dormant");
        assert_eq!(WatchdogState::Alerting.to_string(), "alerting");
    }
}
