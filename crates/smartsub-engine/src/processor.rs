//! Per-tag processing pipeline.
//!
//! Each tag accepted by the input decoder runs through [`TagProcessor::process`]
//! in its own task:
//!
//! 1. mark the session as processing (released on every exit path);
//! 2. drop the tag if it repeats the previous read within the repeat window;
//! 3. validate it over the network, without holding any lock;
//! 4. under the feedback lock, play OK or NOK and record a success;
//! 5. append the access record (a write failure is logged, never fatal).

use crate::session::{Observation, Session};
use smartsub_core::{Tag, Verdict};
use smartsub_hardware::{FeedbackController, FeedbackSignal};
use smartsub_network::TagValidator;
use smartsub_storage::{AccessLogRepository, AccessRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Feedback controller shared by tag tasks and the watchdog.
///
/// Holding the lock is the only way to drive the lines, so two patterns can
/// never overlap.
pub type SharedFeedback = Arc<Mutex<FeedbackController>>;

/// What happened to one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Ignored as a repeat of the previous read.
    Debounced,
    /// Validated, signalled and logged.
    Completed(Verdict),
}

/// Runs the pipeline for each accepted tag.
#[derive(Debug)]
pub struct TagProcessor<V, L> {
    validator: V,
    access_log: L,
    session: Arc<Session>,
    feedback: SharedFeedback,
    min_repeat: Duration,
}

impl<V, L> TagProcessor<V, L>
where
    V: TagValidator,
    L: AccessLogRepository,
{
    /// Create a processor.
    pub fn new(
        validator: V,
        access_log: L,
        session: Arc<Session>,
        feedback: SharedFeedback,
        min_repeat: Duration,
    ) -> Self {
        Self {
            validator,
            access_log,
            session,
            feedback,
            min_repeat,
        }
    }

    /// Session this processor updates.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Process one tag to completion.
    pub async fn process(&self, tag: Tag) -> ProcessOutcome {
        let _processing = self.session.begin_processing();

        if let Observation::Repeat { since } =
            self.session.observe(&tag, Instant::now(), self.min_repeat)
        {
            debug!(%tag, since_ms = since.as_millis() as u64, "Repeated tag ignored");
            return ProcessOutcome::Debounced;
        }

        let read_at = AccessRecord::now();
        info!(%tag, "Tag read");

        let verdict = Verdict::from(self.validator.validate(&tag).await);

        {
            let mut feedback = self.feedback.lock().await;
            let signal = if verdict.is_ok() {
                FeedbackSignal::Ok
            } else {
                FeedbackSignal::Nok
            };
            if let Err(e) = feedback.play(signal).await {
                warn!(%tag, %signal, error = %e, "Feedback failed");
            }
            if verdict.is_ok() {
                self.session.record_success(Instant::now());
                debug!("Idle timer restarted");
            }
        }

        info!(%tag, %verdict, "Tag processed");

        let record = AccessRecord::new(read_at, tag, verdict);
        if let Err(e) = self.access_log.append(&record).await {
            warn!(tag = %record.tag, error = %e, "Could not write access record");
        }

        ProcessOutcome::Completed(verdict)
    }

    /// Run [`process`](Self::process) in a new task and return immediately.
    pub fn dispatch(self: &Arc<Self>, tag: Tag) -> JoinHandle<ProcessOutcome> {
        let processor = Arc::clone(self);
        tokio::spawn(async move { processor.process(tag).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartsub_hardware::FeedbackLines;
    use smartsub_hardware::mock::LineTrace;
    use smartsub_storage::MemoryAccessLog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts tags starting with "OK", counting calls.
    #[derive(Debug, Default)]
    struct PrefixValidator {
        calls: AtomicUsize,
    }

    impl TagValidator for PrefixValidator {
        async fn validate(&self, tag: &Tag) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tag.as_str().starts_with("OK")
        }
    }

    type Processor = TagProcessor<PrefixValidator, MemoryAccessLog>;

    fn processor() -> (Arc<Processor>, LineTrace, MemoryAccessLog) {
        let (lines, trace) = FeedbackLines::mock();
        let log = MemoryAccessLog::new();
        let processor = TagProcessor::new(
            PrefixValidator::default(),
            log.clone(),
            Arc::new(Session::new()),
            Arc::new(Mutex::new(FeedbackController::new(lines))),
            Duration::from_secs(1),
        );
        (Arc::new(processor), trace, log)
    }

    fn tag(s: &str) -> Tag {
        Tag::new(s).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_tag() {
        let (processor, trace, log) = processor();

        let outcome = processor.process(tag("OK001")).await;
        assert_eq!(outcome, ProcessOutcome::Completed(Verdict::Ok));

        assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Ok]));
        let snapshot = processor.session().snapshot();
        assert!(snapshot.has_succeeded_once);
        assert!(!snapshot.processing);

        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag, tag("OK001"));
        assert_eq!(records[0].verdict, Verdict::Ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_tag_does_not_count_as_success() {
        let (processor, trace, log) = processor();

        let outcome = processor.process(tag("BAD42")).await;
        assert_eq!(outcome, ProcessOutcome::Completed(Verdict::Nok));

        assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Nok]));
        assert!(!processor.session().snapshot().has_succeeded_once);
        assert_eq!(log.records()[0].verdict, Verdict::Nok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_within_window_validates_once() {
        let (processor, trace, log) = processor();

        processor.process(tag("OK001")).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        // Feedback took 180 ms, so this is well inside the window.
        let outcome = processor.process(tag("OK001")).await;

        assert_eq!(outcome, ProcessOutcome::Debounced);
        assert_eq!(processor.validator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(log.records().len(), 1);
        assert_eq!(trace.signals().map(|s| s.len()), Some(1));
        assert!(!processor.session().is_processing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_after_window_validates_twice() {
        let (processor, _trace, log) = processor();

        processor.process(tag("OK001")).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        let outcome = processor.process(tag("OK001")).await;

        assert_eq!(outcome, ProcessOutcome::Completed(Verdict::Ok));
        assert_eq!(processor.validator.calls.load(Ordering::SeqCst), 2);
        assert_eq!(log.records().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_failure_is_not_fatal() {
        let (processor, trace, log) = processor();
        log.set_failing(true);

        let outcome = processor.process(tag("OK001")).await;
        assert_eq!(outcome, ProcessOutcome::Completed(Verdict::Ok));
        assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Ok]));
        assert!(processor.session().snapshot().has_succeeded_once);
        assert!(!processor.session().is_processing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_feedback_failure_still_records_verdict() {
        let (processor, trace, log) = processor();
        trace.set_failing(true);

        let outcome = processor.process(tag("OK001")).await;
        assert_eq!(outcome, ProcessOutcome::Completed(Verdict::Ok));
        assert!(processor.session().snapshot().has_succeeded_once);
        assert_eq!(log.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_runs_in_background() {
        let (processor, trace, _log) = processor();

        let handle = processor.dispatch(tag("OK001"));
        assert_eq!(handle.await.unwrap(), ProcessOutcome::Completed(Verdict::Ok));
        assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Ok]));
    }
}
