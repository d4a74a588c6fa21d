//! Concurrency and timing behaviour of the validator engine.
//!
//! Every test runs on a paused tokio clock, so feedback patterns and the
//! idle watchdog play out in virtual time.

use smartsub_core::config::TimingConfig;
use smartsub_core::{Tag, Verdict};
use smartsub_engine::{
    IdleWatchdog, ProcessOutcome, ServiceExit, Session, SharedFeedback, TagProcessor,
    ValidatorService,
};
use smartsub_hardware::mock::{LineTrace, MockKeyboard};
use smartsub_hardware::{AnyKeySource, FeedbackController, FeedbackLines, FeedbackSignal};
use smartsub_network::TagValidator;
use smartsub_storage::MemoryAccessLog;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tokio::time::{Instant, sleep};

/// Accepts tags starting with "OK" after a fixed network delay.
/// Panics on "PANIC".
#[derive(Debug, Clone)]
struct SlowValidator {
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl SlowValidator {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TagValidator for SlowValidator {
    async fn validate(&self, tag: &Tag) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        if tag.as_str() == "PANIC" {
            panic!("validator failure");
        }
        tag.as_str().starts_with("OK")
    }
}

fn tag(s: &str) -> Tag {
    Tag::new(s).unwrap()
}

fn shared_feedback() -> (SharedFeedback, LineTrace) {
    let (lines, trace) = FeedbackLines::mock();
    (Arc::new(Mutex::new(FeedbackController::new(lines))), trace)
}

fn timing() -> TimingConfig {
    TimingConfig::default()
}

// =============================================================================
// Tag processing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_tags_never_interleave_feedback() {
    let (feedback, trace) = shared_feedback();
    let log = MemoryAccessLog::new();
    let validator = SlowValidator::new(Duration::from_millis(50));
    let processor = Arc::new(TagProcessor::new(
        validator.clone(),
        log.clone(),
        Arc::new(Session::new()),
        feedback,
        timing().min_repeat_interval(),
    ));

    // All three validations finish at the same instant and race for the lock.
    let handles = [
        processor.dispatch(tag("OK001")),
        processor.dispatch(tag("BAD002")),
        processor.dispatch(tag("OK003")),
    ];
    for handle in handles {
        assert!(matches!(handle.await.unwrap(), ProcessOutcome::Completed(_)));
    }

    assert_eq!(validator.calls(), 3);
    let signals = trace.signals().expect("feedback patterns interleaved");
    assert_eq!(signals.len(), 3);
    assert_eq!(signals.iter().filter(|s| **s == FeedbackSignal::Ok).count(), 2);
    assert_eq!(signals.iter().filter(|s| **s == FeedbackSignal::Nok).count(), 1);

    let periods = trace.busy_periods();
    for pair in periods.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }

    assert_eq!(log.records().len(), 3);
    assert!(!processor.session().is_processing());
}

#[tokio::test(start_paused = true)]
async fn test_validator_panic_clears_processing() {
    let (feedback, trace) = shared_feedback();
    let log = MemoryAccessLog::new();
    let processor = Arc::new(TagProcessor::new(
        SlowValidator::new(Duration::from_millis(10)),
        log.clone(),
        Arc::new(Session::new()),
        Arc::clone(&feedback),
        timing().min_repeat_interval(),
    ));

    let result = processor.dispatch(tag("PANIC")).await;
    assert!(result.unwrap_err().is_panic());
    assert!(!processor.session().is_processing());
    assert!(log.records().is_empty());

    // The feedback lock was never taken, so the next tag plays normally.
    let outcome = processor.process(tag("OK001")).await;
    assert_eq!(outcome, ProcessOutcome::Completed(Verdict::Ok));
    assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Ok]));
}

#[tokio::test(start_paused = true)]
async fn test_processing_indicator_while_validating() {
    let (feedback, _trace) = shared_feedback();
    let processor = Arc::new(TagProcessor::new(
        SlowValidator::new(Duration::from_millis(500)),
        MemoryAccessLog::new(),
        Arc::new(Session::new()),
        feedback,
        timing().min_repeat_interval(),
    ));

    assert!(!processor.session().is_processing());
    let handle = processor.dispatch(tag("OK001"));
    sleep(Duration::from_millis(100)).await;
    assert!(processor.session().is_processing());
    handle.await.unwrap();
    assert!(!processor.session().is_processing());
}

// =============================================================================
// Service
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_service_debounces_repeated_reads() {
    let (lines, trace) = FeedbackLines::mock();
    let validator = SlowValidator::new(Duration::from_millis(20));
    let log = MemoryAccessLog::new();
    let service = ValidatorService::new(validator.clone(), log.clone(), lines, &timing());

    let (keyboard, handle) = MockKeyboard::new();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let driver = async move {
        handle.type_tag("OK001").await.unwrap();
        sleep(Duration::from_millis(300)).await;
        handle.type_tag("OK001").await.unwrap();
        sleep(Duration::from_millis(500)).await;
        // 0.8 s after the accepted read.
        handle.type_tag("OK001").await.unwrap();
        sleep(Duration::from_millis(300)).await;
        // 1.1 s after the accepted read; the ignored ones do not count.
        handle.type_tag("OK001").await.unwrap();
        sleep(Duration::from_secs(2)).await;
        handle.type_tag("OK001").await.unwrap();
        sleep(Duration::from_secs(1)).await;
        stop_tx.send(()).unwrap();
        handle
    };
    let shutdown = async {
        let _ = stop_rx.await;
    };

    let (exit, _handle) = tokio::join!(service.run(keyboard, shutdown), driver);

    assert!(matches!(exit, ServiceExit::Shutdown));
    assert_eq!(validator.calls(), 3);
    assert_eq!(log.records().len(), 3);
    assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Ok; 3]));
    assert!(service.feedback().lock().await.is_shut_down());
}

#[tokio::test(start_paused = true)]
async fn test_service_reports_device_loss() {
    let (lines, _trace) = FeedbackLines::mock();
    let service = ValidatorService::new(
        SlowValidator::new(Duration::from_millis(20)),
        MemoryAccessLog::new(),
        lines,
        &timing(),
    );

    let (keyboard, handle) = MockKeyboard::new();
    handle.type_tag("OK001").await.unwrap();
    handle.disconnect();

    // Same dispatch path the binary uses for the evdev reader.
    let source = AnyKeySource::from(keyboard);
    let exit = service.run(source, std::future::pending()).await;

    match exit {
        ServiceExit::DeviceLost(e) => assert!(e.is_device_loss()),
        other => panic!("unexpected exit: {other:?}"),
    }
    assert!(service.feedback().lock().await.is_shut_down());
}

// =============================================================================
// Idle watchdog
// =============================================================================

/// Timer wheel granularity is 1 ms.
fn assert_near(actual: Instant, expected: Instant) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= Duration::from_millis(5),
        "off by {diff:?} from expected instant"
    );
}

fn spawn_watchdog(session: &Arc<Session>) -> (tokio::task::JoinHandle<()>, LineTrace) {
    let (feedback, trace) = shared_feedback();
    let watchdog = IdleWatchdog::new(Arc::clone(session), feedback, &timing());
    (tokio::spawn(watchdog.run()), trace)
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_dormant_never_alerts() {
    let session = Arc::new(Session::new());
    let (watchdog, trace) = spawn_watchdog(&session);

    sleep(Duration::from_secs(120)).await;

    assert!(trace.transitions().is_empty());
    watchdog.abort();
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_alerts_after_threshold_and_repeats() {
    let session = Arc::new(Session::new());
    let t0 = Instant::now();
    session.record_success(t0);
    let (watchdog, trace) = spawn_watchdog(&session);

    sleep(Duration::from_secs(29)).await;
    assert!(trace.transitions().is_empty());

    sleep(Duration::from_secs(7)).await;
    let periods = trace.busy_periods();
    // Alerts at 30 s, 32.48 s and 34.96 s, two flashes each.
    assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Alert; 3]));
    assert_near(periods[0].start, t0 + Duration::from_secs(30));
    assert_near(periods[2].start, t0 + Duration::from_millis(32_480));
    assert_near(periods[4].start, t0 + Duration::from_millis(34_960));

    watchdog.abort();
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_new_success_rearms() {
    let session = Arc::new(Session::new());
    session.record_success(Instant::now());
    let (watchdog, trace) = spawn_watchdog(&session);

    sleep(Duration::from_millis(31_500)).await;
    assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Alert]));

    session.record_success(Instant::now());
    trace.clear();

    sleep(Duration::from_secs(29)).await;
    assert!(trace.transitions().is_empty());

    // Polls stay aligned to the last reminder: alert at 62.48 s.
    sleep(Duration::from_secs(3)).await;
    assert_eq!(trace.signals().map(|s| s.len()), Some(1));

    watchdog.abort();
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_waits_while_processing() {
    let session = Arc::new(Session::new());
    session.record_success(Instant::now());
    let (watchdog, trace) = spawn_watchdog(&session);

    {
        let _processing = session.begin_processing();
        sleep(Duration::from_millis(40_500)).await;
        assert!(trace.transitions().is_empty());
    }

    // Next poll at 41 s.
    sleep(Duration::from_secs(1)).await;
    assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Alert]));

    watchdog.abort();
}
