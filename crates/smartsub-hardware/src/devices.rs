//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT, Edition 2024) is not object-safe, so
//! `Box<dyn KeySource>` is not an option. These enums give concrete dispatch
//! instead, with real backends behind feature flags where they need platform
//! crates.
//!
//! # Examples
//!
//! ```
//! use smartsub_hardware::devices::AnyKeySource;
//! use smartsub_hardware::mock::MockKeyboard;
//! use smartsub_hardware::traits::KeySource;
//!
//! let (reader, _handle) = MockKeyboard::new();
//! let source = AnyKeySource::Mock(reader);
//! assert_eq!(source.info().name, "Mock RFID Reader");
//! ```

use crate::Result;
use crate::console::ConsoleLine;
#[cfg(feature = "hardware-gpio")]
use crate::gpio::GpioLine;
use crate::mock::{MockKeyboard, MockLine};
use crate::reader::EvdevReader;
use crate::traits::{KeySource, OutputLine};
use crate::types::{InputDeviceInfo, KeyEvent, LineId};

/// Enum wrapper for reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyKeySource {
    /// Mock reader for development and testing.
    Mock(MockKeyboard),
    /// Linux input device.
    Evdev(EvdevReader),
}

impl KeySource for AnyKeySource {
    async fn next_event(&mut self) -> Result<KeyEvent> {
        match self {
            Self::Mock(device) => device.next_event().await,
            Self::Evdev(device) => device.next_event().await,
        }
    }

    fn info(&self) -> &InputDeviceInfo {
        match self {
            Self::Mock(device) => device.info(),
            Self::Evdev(device) => device.info(),
        }
    }
}

impl From<MockKeyboard> for AnyKeySource {
    fn from(device: MockKeyboard) -> Self {
        Self::Mock(device)
    }
}

impl From<EvdevReader> for AnyKeySource {
    fn from(device: EvdevReader) -> Self {
        Self::Evdev(device)
    }
}

/// Enum wrapper for output line dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputLine {
    /// Mock line recording into a trace.
    Mock(MockLine),
    /// Line that only logs.
    Console(ConsoleLine),
    /// Raspberry Pi GPIO pin.
    #[cfg(feature = "hardware-gpio")]
    Gpio(GpioLine),
}

impl OutputLine for AnyOutputLine {
    fn id(&self) -> LineId {
        match self {
            Self::Mock(line) => line.id(),
            Self::Console(line) => line.id(),
            #[cfg(feature = "hardware-gpio")]
            Self::Gpio(line) => line.id(),
        }
    }

    fn set(&mut self, on: bool) -> Result<()> {
        match self {
            Self::Mock(line) => line.set(on),
            Self::Console(line) => line.set(on),
            #[cfg(feature = "hardware-gpio")]
            Self::Gpio(line) => line.set(on),
        }
    }

    fn is_asserted(&self) -> bool {
        match self {
            Self::Mock(line) => line.is_asserted(),
            Self::Console(line) => line.is_asserted(),
            #[cfg(feature = "hardware-gpio")]
            Self::Gpio(line) => line.is_asserted(),
        }
    }
}
