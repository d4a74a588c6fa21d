//! Mock output lines that record every transition.
//!
//! All lines created from one [`LineTrace`] append to the same timeline, so a
//! test can check the exact sequence of LED and buzzer changes across lines,
//! including whether two feedback patterns ever overlapped.

use crate::{
    HardwareError, Result,
    traits::OutputLine,
    types::{FeedbackSignal, LineId},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

/// One recorded level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTransition {
    /// Line that changed.
    pub line: LineId,
    /// New level.
    pub on: bool,
    /// When the change happened (tokio clock, so paused time works).
    pub at: Instant,
}

/// Shape of one busy period, as produced by the feedback patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    /// Green alone: the OK signal.
    Green,
    /// Red and buzzer, buzzer released first: the NOK signal.
    RedBeepTail,
    /// Red and buzzer released together: one half of the idle alert.
    RedBeep,
}

/// A contiguous stretch during which at least one line was asserted.
///
/// Feedback patterns always release every line before returning, so OK and
/// NOK each show up as one period and the idle alert as two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyPeriod {
    /// First line asserted.
    pub start: Instant,
    /// Last line released.
    pub end: Instant,
    /// Transitions inside the period, in order.
    pub transitions: Vec<LineTransition>,
}

impl BusyPeriod {
    /// Length of the period.
    pub fn duration(&self) -> std::time::Duration {
        self.end - self.start
    }

    /// Number of times `line` was switched on.
    pub fn pulses(&self, line: LineId) -> usize {
        self.transitions
            .iter()
            .filter(|t| t.line == line && t.on)
            .count()
    }

    fn released_at(&self, line: LineId) -> Option<Instant> {
        self.transitions
            .iter()
            .rev()
            .find(|t| t.line == line && !t.on)
            .map(|t| t.at)
    }

    /// Classify the period; `None` means lines from different patterns mixed.
    pub fn pulse(&self) -> Option<Pulse> {
        let green = self.pulses(LineId::Green);
        let red = self.pulses(LineId::Red);
        let beeps = self.pulses(LineId::Buzzer);
        match (green, red, beeps) {
            (1, 0, 0) => Some(Pulse::Green),
            (0, 1, 1) => {
                if self.released_at(LineId::Buzzer) < self.released_at(LineId::Red) {
                    Some(Pulse::RedBeepTail)
                } else {
                    Some(Pulse::RedBeep)
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct TraceInner {
    transitions: Mutex<Vec<LineTransition>>,
    failing: AtomicBool,
}

/// Shared timeline of transitions across a set of mock lines.
#[derive(Debug, Clone, Default)]
pub struct LineTrace {
    inner: Arc<TraceInner>,
}

impl LineTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LineTransition>> {
        // A poisoned trace only happens after a test already panicked.
        self.inner
            .transitions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, line: LineId, on: bool) {
        self.lock().push(LineTransition {
            line,
            on,
            at: Instant::now(),
        });
    }

    /// Make every subsequent `set` on any line fail.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    fn is_failing(&self) -> bool {
        self.inner.failing.load(Ordering::SeqCst)
    }

    /// All transitions so far, in order.
    pub fn transitions(&self) -> Vec<LineTransition> {
        self.lock().clone()
    }

    /// Forget all recorded transitions.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Split the timeline into busy periods.
    ///
    /// A period still open at the end of the trace is not included.
    pub fn busy_periods(&self) -> Vec<BusyPeriod> {
        let mut periods = Vec::new();
        let mut current: Vec<LineTransition> = Vec::new();
        let mut asserted: Vec<LineId> = Vec::new();

        for t in self.transitions() {
            if t.on {
                if !asserted.contains(&t.line) {
                    asserted.push(t.line);
                }
            } else {
                asserted.retain(|l| *l != t.line);
            }

            if t.on || !current.is_empty() {
                current.push(t);
            }

            if asserted.is_empty() && !current.is_empty() {
                let start = current[0].at;
                periods.push(BusyPeriod {
                    start,
                    end: t.at,
                    transitions: std::mem::take(&mut current),
                });
            }
        }
        periods
    }

    /// Shapes of all completed busy periods, in order.
    pub fn pulses(&self) -> Vec<Option<Pulse>> {
        self.busy_periods().iter().map(BusyPeriod::pulse).collect()
    }

    /// Fold the busy periods back into the signals that produced them.
    ///
    /// Returns `None` if any period is unrecognizable or an alert is missing
    /// its second flash.
    pub fn signals(&self) -> Option<Vec<FeedbackSignal>> {
        let mut signals = Vec::new();
        let mut pending_alert = false;
        for pulse in self.pulses() {
            match pulse? {
                Pulse::Green if !pending_alert => signals.push(FeedbackSignal::Ok),
                Pulse::RedBeepTail if !pending_alert => signals.push(FeedbackSignal::Nok),
                Pulse::RedBeep if pending_alert => {
                    signals.push(FeedbackSignal::Alert);
                    pending_alert = false;
                }
                Pulse::RedBeep => pending_alert = true,
                _ => return None,
            }
        }
        (!pending_alert).then_some(signals)
    }
}

/// Mock output line for testing and development.
///
/// # Examples
///
/// ```
/// use smartsub_hardware::mock::{LineTrace, MockLine};
/// use smartsub_hardware::traits::OutputLine;
/// use smartsub_hardware::types::LineId;
///
/// let trace = LineTrace::new();
/// let mut red = MockLine::new(LineId::Red, trace.clone());
///
/// red.set(true).unwrap();
/// assert!(red.is_asserted());
/// assert_eq!(trace.transitions().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockLine {
    id: LineId,
    asserted: bool,
    trace: LineTrace,
}

impl MockLine {
    /// Create a released mock line recording into `trace`.
    pub fn new(id: LineId, trace: LineTrace) -> Self {
        Self {
            id,
            asserted: false,
            trace,
        }
    }
}

impl OutputLine for MockLine {
    fn id(&self) -> LineId {
        self.id
    }

    fn set(&mut self, on: bool) -> Result<()> {
        if self.trace.is_failing() {
            return Err(HardwareError::line(self.id.as_str(), "injected failure"));
        }
        self.asserted = on;
        self.trace.record(self.id, on);
        Ok(())
    }

    fn is_asserted(&self) -> bool {
        self.asserted
    }
}
