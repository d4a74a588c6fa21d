//! Hardware abstraction layer for the SmartSub checkpoint validator.
//!
//! The validator talks to two kinds of peripherals:
//!
//! - a keyboard-emulating RFID reader, read as raw key events through the
//!   [`KeySource`] trait (evdev on Linux, [`mock::MockKeyboard`] in tests);
//! - three on/off feedback lines (green LED, red LED, buzzer) behind the
//!   [`OutputLine`] trait (GPIO on a Raspberry Pi, console logging on a bench,
//!   [`mock::MockLine`] in tests).
//!
//! The [`FeedbackController`] turns signals into timed patterns on those lines.
//!
//! # Design Philosophy
//!
//! - **Async where it waits**: reading the reader is `async fn` in a trait
//!   (Rust 1.90 + Edition 2024 RPITIT); driving a line is a synchronous write.
//! - **Enum dispatch**: [`devices::AnyKeySource`] and [`devices::AnyOutputLine`]
//!   stand in for trait objects, with real backends behind feature flags.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result] with
//!   [`HardwareError`].
//!
//! # Example
//!
//! ```
//! use smartsub_hardware::{FeedbackController, FeedbackLines, FeedbackSignal};
//!
//! #[tokio::main]
//! async fn main() -> smartsub_hardware::Result<()> {
//!     let (lines, trace) = FeedbackLines::mock();
//!     let mut feedback = FeedbackController::new(lines);
//!
//!     feedback.play(FeedbackSignal::Ok).await?;
//!     assert_eq!(trace.signals(), Some(vec![FeedbackSignal::Ok]));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `hardware-gpio` (default): GPIO feedback lines through `rppal`.

pub mod console;
pub mod devices;
pub mod error;
pub mod feedback;
#[cfg(feature = "hardware-gpio")]
pub mod gpio;
pub mod keymap;
pub mod mock;
pub mod reader;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyKeySource, AnyOutputLine};
pub use error::{HardwareError, Result};
pub use feedback::{FeedbackController, FeedbackLines};
pub use reader::{EvdevReader, list_input_devices, matches_hints};
pub use traits::{KeySource, OutputLine};
pub use types::{FeedbackSignal, InputDeviceInfo, KeyEvent, KeyState, LineId};
