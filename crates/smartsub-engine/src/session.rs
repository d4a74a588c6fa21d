//! Shared session state.
//!
//! One [`Session`] lives for the whole process and is shared by every tag
//! task and the idle watchdog. Its fields sit behind a short-held mutex and
//! are only reachable through snapshots and named transitions, so no caller
//! can hold the lock across an `.await`.

use smartsub_core::Tag;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct SessionState {
    has_succeeded_once: bool,
    last_success: Option<Instant>,
    last_seen: Option<(Tag, Instant)>,
    in_flight: usize,
}

/// Point-in-time copy of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// A validation has succeeded at least once since startup.
    pub has_succeeded_once: bool,
    /// Time of the latest successful validation.
    pub last_success: Option<Instant>,
    /// Latest tag received, accepted or not.
    pub last_seen_tag: Option<Tag>,
    /// When `last_seen_tag` was last received.
    pub last_seen_at: Option<Instant>,
    /// At least one tag is between acceptance and completion.
    pub processing: bool,
}

/// Result of registering a received tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Process the tag.
    Fresh,
    /// Same tag as the previous read, within the repeat window.
    Repeat {
        /// Time since the previous read of this tag.
        since: Duration,
    },
}

/// Mutable state shared by the tag processor and the idle watchdog.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// Create a zeroed session.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Every critical section is a handful of assignments that cannot
        // panic midway, so a poisoned lock still holds consistent state.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            has_succeeded_once: state.has_succeeded_once,
            last_success: state.last_success,
            last_seen_tag: state.last_seen.as_ref().map(|(tag, _)| tag.clone()),
            last_seen_at: state.last_seen.as_ref().map(|(_, at)| *at),
            processing: state.in_flight > 0,
        }
    }

    /// Returns `true` while any tag is being processed.
    pub fn is_processing(&self) -> bool {
        self.lock().in_flight > 0
    }

    /// Mark a tag as in flight until the returned guard drops.
    ///
    /// Guards nest: the session reports processing until the last one is
    /// gone, including when a task unwinds.
    pub fn begin_processing(&self) -> ProcessingGuard<'_> {
        self.lock().in_flight += 1;
        ProcessingGuard { session: self }
    }

    /// Register a received tag and decide whether it is a repeat.
    ///
    /// Only fresh reads are recorded. An ignored repeat leaves the previous
    /// receive time in place, so a tag held against the reader is accepted
    /// again once per `min_repeat`.
    pub fn observe(&self, tag: &Tag, now: Instant, min_repeat: Duration) -> Observation {
        let mut state = self.lock();
        if let Some((last, at)) = &state.last_seen
            && last == tag
        {
            let since = now.saturating_duration_since(*at);
            if since < min_repeat {
                return Observation::Repeat { since };
            }
        }
        state.last_seen = Some((tag.clone(), now));
        Observation::Fresh
    }

    /// Record a successful validation.
    pub fn record_success(&self, at: Instant) {
        let mut state = self.lock();
        state.has_succeeded_once = true;
        state.last_success = Some(at);
    }
}

/// Keeps the session in the processing state while alive.
#[derive(Debug)]
#[must_use = "processing ends as soon as the guard is dropped"]
pub struct ProcessingGuard<'a> {
    session: &'a Session,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}
