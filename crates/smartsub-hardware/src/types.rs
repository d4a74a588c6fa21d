//! Common types shared across hardware device implementations.
//!
//! This module defines the raw key events delivered by the reader, the
//! identifiers of the feedback output lines, the signal patterns the
//! feedback controller can play, and input device metadata.

use std::fmt;
use std::path::PathBuf;

/// State of a key in a raw key event.
///
/// Mirrors the kernel's `EV_KEY` value: 0 released, 1 pressed, 2 autorepeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key went up.
    Released,
    /// Key went down.
    Pressed,
    /// Key is held and the kernel is auto-repeating it.
    Repeated,
}

impl KeyState {
    /// Convert a raw `EV_KEY` value into a key state.
    ///
    /// Returns `None` for values the kernel never emits for keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartsub_hardware::types::KeyState;
    ///
    /// assert_eq!(KeyState::from_raw(1), Some(KeyState::Pressed));
    /// assert_eq!(KeyState::from_raw(7), None);
    /// ```
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Released),
            1 => Some(Self::Pressed),
            2 => Some(Self::Repeated),
            _ => None,
        }
    }

    /// Returns `true` while the key is down (pressed or repeating).
    pub fn is_down(self) -> bool {
        matches!(self, Self::Pressed | Self::Repeated)
    }
}

/// A single key event from the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Linux key code (`KEY_*`).
    pub code: u16,

    /// Key state.
    pub state: KeyState,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(code: u16, state: KeyState) -> Self {
        Self { code, state }
    }

    /// Create a key-down event.
    pub fn pressed(code: u16) -> Self {
        Self::new(code, KeyState::Pressed)
    }

    /// Create a key-up event.
    pub fn released(code: u16) -> Self {
        Self::new(code, KeyState::Released)
    }
}

/// Identifies one of the three feedback output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineId {
    /// Green indicator LED.
    Green,
    /// Red indicator LED.
    Red,
    /// Buzzer.
    Buzzer,
}

impl LineId {
    /// All lines, in the order they are switched off on teardown.
    pub const ALL: [LineId; 3] = [LineId::Green, LineId::Red, LineId::Buzzer];

    /// Lowercase name used in log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Buzzer => "buzzer",
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feedback pattern played on the output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackSignal {
    /// Tag accepted: one green flash, silent.
    Ok,
    /// Tag rejected: red flash with one beep, red held a little past the beep.
    Nok,
    /// Idle reminder: two red flashes, each with a beep.
    Alert,
}

impl fmt::Display for FeedbackSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "ok",
            Self::Nok => "nok",
            Self::Alert => "alert",
        };
        f.write_str(name)
    }
}

/// Metadata about an input device visible to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceInfo {
    /// Device node (e.g., `/dev/input/event3`).
    pub path: PathBuf,

    /// Name reported by the kernel; empty when the device has none.
    pub name: String,
}

impl InputDeviceInfo {
    /// Create a new InputDeviceInfo.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for InputDeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}
