//! Mock keyboard-emulating reader for testing and development.
//!
//! The reader half implements [`KeySource`]; the handle half lets a test type
//! text, inject raw key events, simulate a stream error, or unplug the device.

use crate::{
    HardwareError, Result,
    keymap::{KEY_ENTER, KEY_LEFTSHIFT, char_to_key},
    traits::KeySource,
    types::{InputDeviceInfo, KeyEvent, KeyState},
};
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 256;

/// Internal event type for the mock keyboard.
#[derive(Debug)]
enum KeyboardEvent {
    Key(KeyEvent),
    Fail(String),
}

/// Mock keyboard-emulating RFID reader.
///
/// # Examples
///
/// ```
/// use smartsub_hardware::mock::MockKeyboard;
/// use smartsub_hardware::traits::KeySource;
/// use smartsub_hardware::types::KeyState;
///
/// #[tokio::main]
/// async fn main() -> smartsub_hardware::Result<()> {
///     let (mut reader, handle) = MockKeyboard::new();
///
///     handle.type_text("a").await?;
///
///     let event = reader.next_event().await?;
///     assert_eq!(event.state, KeyState::Pressed);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeyboard {
    event_rx: mpsc::Receiver<KeyboardEvent>,
    info: InputDeviceInfo,
}

impl MockKeyboard {
    /// Create a new mock reader with the default name.
    pub fn new() -> (Self, MockKeyboardHandle) {
        Self::with_name("Mock RFID Reader")
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockKeyboardHandle) {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let info = InputDeviceInfo::new("/dev/input/mock0", name);

        let reader = Self { event_rx, info };
        let handle = MockKeyboardHandle { event_tx };

        (reader, handle)
    }
}

impl KeySource for MockKeyboard {
    async fn next_event(&mut self) -> Result<KeyEvent> {
        let event = self
            .event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(self.info.name.clone()))?;

        match event {
            KeyboardEvent::Key(key) => Ok(key),
            KeyboardEvent::Fail(message) => Err(std::io::Error::other(message).into()),
        }
    }

    fn info(&self) -> &InputDeviceInfo {
        &self.info
    }
}

/// Handle for driving a [`MockKeyboard`].
///
/// Dropping every clone of the handle unplugs the reader.
#[derive(Debug, Clone)]
pub struct MockKeyboardHandle {
    event_tx: mpsc::Sender<KeyboardEvent>,
}

impl MockKeyboardHandle {
    async fn send(&self, event: KeyboardEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("mock reader dropped"))
    }

    /// Inject a raw key event.
    pub async fn key(&self, code: u16, state: KeyState) -> Result<()> {
        self.send(KeyboardEvent::Key(KeyEvent::new(code, state)))
            .await
    }

    /// Press and release a key.
    pub async fn tap(&self, code: u16) -> Result<()> {
        self.key(code, KeyState::Pressed).await?;
        self.key(code, KeyState::Released).await
    }

    /// Type text the way a US-layout reader would, holding shift where needed.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for a character with no key in the layout.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        for c in text.chars() {
            let (code, shift) = char_to_key(c)
                .ok_or_else(|| HardwareError::unsupported(format!("typing {c:?}")))?;
            if shift {
                self.key(KEY_LEFTSHIFT, KeyState::Pressed).await?;
            }
            self.tap(code).await?;
            if shift {
                self.key(KEY_LEFTSHIFT, KeyState::Released).await?;
            }
        }
        Ok(())
    }

    /// Type text followed by Enter, as a reader does for one tag.
    pub async fn type_tag(&self, text: &str) -> Result<()> {
        self.type_text(text).await?;
        self.tap(KEY_ENTER).await
    }

    /// Make the reader's next read fail with an I/O error.
    pub async fn fail(&self, message: impl Into<String>) -> Result<()> {
        self.send(KeyboardEvent::Fail(message.into())).await
    }

    /// Unplug the reader once queued events are drained.
    pub fn disconnect(self) {
        drop(self);
    }
}
