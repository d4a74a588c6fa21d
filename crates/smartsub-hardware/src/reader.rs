//! Keyboard-emulating RFID readers through the Linux evdev interface.
//!
//! The reader is located by matching the kernel-reported device name against
//! a list of hints. Once opened it is grabbed exclusively when possible, so
//! tags do not also land in whatever console has focus.

use crate::{
    HardwareError, Result,
    traits::KeySource,
    types::{InputDeviceInfo, KeyEvent, KeyState},
};
use evdev::{Device, EventStream, EventType};

/// Returns `true` if `name` contains any non-empty hint, ignoring case.
///
/// # Examples
///
/// ```
/// use smartsub_hardware::reader::matches_hints;
///
/// let hints = vec!["rfid".to_string(), "swusb".to_string()];
/// assert!(matches_hints("SWUSB HID Reader", &hints));
/// assert!(!matches_hints("AT Translated Set 2 keyboard", &hints));
/// ```
pub fn matches_hints(name: &str, hints: &[String]) -> bool {
    let name = name.to_lowercase();
    hints
        .iter()
        .filter(|h| !h.is_empty())
        .any(|h| name.contains(&h.to_lowercase()))
}

/// Index of the first device whose name matches the hints.
pub fn find_reader(devices: &[InputDeviceInfo], hints: &[String]) -> Option<usize> {
    devices.iter().position(|d| matches_hints(&d.name, hints))
}

/// Enumerate every input device the process can open.
pub fn list_input_devices() -> Vec<InputDeviceInfo> {
    evdev::enumerate()
        .map(|(path, device)| InputDeviceInfo::new(path, device.name().unwrap_or_default()))
        .collect()
}

/// An evdev input device delivering the reader's key events.
pub struct EvdevReader {
    stream: EventStream,
    info: InputDeviceInfo,
}

impl std::fmt::Debug for EvdevReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevReader")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl EvdevReader {
    /// Open the first input device matching `hints`.
    ///
    /// A refused exclusive grab is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns `NoMatchingDevice` (listing every device name seen) when
    /// nothing matches, or an I/O error if the matched device cannot be
    /// turned into an event stream.
    pub fn discover(hints: &[String], grab: bool) -> Result<Self> {
        let (infos, mut devices): (Vec<_>, Vec<_>) = evdev::enumerate()
            .map(|(path, device)| {
                let info = InputDeviceInfo::new(path, device.name().unwrap_or_default());
                (info, Some(device))
            })
            .unzip();

        let Some(index) = find_reader(&infos, hints) else {
            let found = infos.into_iter().map(|d| d.name).collect();
            return Err(HardwareError::no_matching_device(hints, found));
        };

        let device = devices[index]
            .take()
            .ok_or_else(|| HardwareError::initialization_failed("device already taken"))?;
        Self::open(device, infos[index].clone(), grab)
    }

    fn open(mut device: Device, info: InputDeviceInfo, grab: bool) -> Result<Self> {
        if grab
            && let Err(e) = device.grab()
        {
            tracing::warn!(device = %info, error = %e, "Exclusive grab refused, continuing shared");
        }

        let stream = device.into_event_stream()?;
        tracing::info!(device = %info, "Reader opened");

        Ok(Self { stream, info })
    }
}

impl KeySource for EvdevReader {
    async fn next_event(&mut self) -> Result<KeyEvent> {
        loop {
            let event = self.stream.next_event().await?;
            if event.event_type() != EventType::KEY {
                continue;
            }
            if let Some(state) = KeyState::from_raw(event.value()) {
                return Ok(KeyEvent::new(event.code(), state));
            }
        }
    }

    fn info(&self) -> &InputDeviceInfo {
        &self.info
    }
}
