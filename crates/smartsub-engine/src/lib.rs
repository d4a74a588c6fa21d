//! Validator engine for the SmartSub checkpoint.
//!
//! Turns reader key events into tags, validates each tag in its own task,
//! plays the verdict on the feedback lines, writes the access log, and
//! raises an alarm when no valid tag has been seen for too long.
//!
//! # Components
//!
//! - [`decoder`]: key events to sanitized tags
//! - [`processor`]: debounce, validate, signal, log
//! - [`session`]: state shared between tag tasks and the watchdog
//! - [`watchdog`]: idle detection and repeated ALERT
//! - [`service`]: wiring and teardown

pub mod decoder;
pub mod processor;
pub mod service;
pub mod session;
pub mod watchdog;

pub use decoder::{InputDecoder, TagAssembler};
pub use processor::{ProcessOutcome, SharedFeedback, TagProcessor};
pub use service::{ServiceExit, ValidatorService};
pub use session::{Observation, ProcessingGuard, Session, SessionSnapshot};
pub use watchdog::{IdleReading, IdleWatchdog, WatchdogState, evaluate};
