//! Hardware device trait definitions.
//!
//! These traits are the seam between the validator engine and the physical
//! peripherals: a keyboard-emulating RFID reader on the input side and three
//! on/off output lines (two LEDs and a buzzer) on the feedback side. Mock and
//! real implementations are interchangeable behind them.
//!
//! [`KeySource`] uses native `async fn` (Edition 2024 RPITIT), so it is not
//! object-safe; concrete dispatch goes through the enums in
//! [`devices`](crate::devices).

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{InputDeviceInfo, KeyEvent, LineId};

/// A stream of raw key events from the reader.
///
/// # Examples
///
/// ```no_run
/// use smartsub_hardware::traits::KeySource;
/// use smartsub_hardware::types::KeyState;
/// use smartsub_hardware::Result;
///
/// async fn count_presses<K: KeySource>(source: &mut K, n: usize) -> Result<usize> {
///     let mut presses = 0;
///     for _ in 0..n {
///         if source.next_event().await?.state == KeyState::Pressed {
///             presses += 1;
///         }
///     }
///     Ok(presses)
/// }
/// ```
pub trait KeySource: Send {
    /// Wait for the next key event.
    ///
    /// Non-key events (sync, misc, LED) are filtered out by implementations.
    ///
    /// # Errors
    ///
    /// Returns an error when the device disappears or its event stream fails.
    /// Callers should treat any error as loss of the reader.
    async fn next_event(&mut self) -> Result<KeyEvent>;

    /// Metadata about the underlying device.
    fn info(&self) -> &InputDeviceInfo;
}

/// A single digital output line (LED or buzzer).
///
/// Driving a line is a fast register write, so the interface is synchronous;
/// timing between transitions belongs to the caller.
pub trait OutputLine: Send {
    /// Which feedback line this is.
    fn id(&self) -> LineId;

    /// Assert (`true`) or release (`false`) the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be driven.
    fn set(&mut self, on: bool) -> Result<()>;

    /// Last level successfully written.
    fn is_asserted(&self) -> bool;
}
