//! Key events to tags.
//!
//! The reader types each tag as key presses terminated by Enter.
//! [`TagAssembler`] is the pure state machine; [`InputDecoder`] drives it
//! from a [`KeySource`] and hands each finished tag to a dispatch closure.

use smartsub_core::Tag;
use smartsub_hardware::keymap::{KEY_BACKSPACE, KEY_ENTER, is_shift, key_to_char};
use smartsub_hardware::{HardwareError, KeyEvent, KeySource, KeyState};
use tracing::debug;

/// Shift level and the characters typed since the last Enter.
#[derive(Debug, Default)]
pub struct TagAssembler {
    shift: bool,
    buffer: String,
}

impl TagAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Characters buffered so far.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Feed one key event; returns a tag when Enter completes one.
    ///
    /// Shift follows the modifier level (down or repeating sets it, up
    /// clears it). Every other key acts only on its initial press.
    pub fn handle(&mut self, event: KeyEvent) -> Option<Tag> {
        if is_shift(event.code) {
            self.shift = event.state.is_down();
            return None;
        }
        if event.state != KeyState::Pressed {
            return None;
        }

        match event.code {
            KEY_ENTER => {
                let raw = std::mem::take(&mut self.buffer);
                let tag = Tag::sanitize(&raw);
                if tag.is_none() {
                    debug!(raw = %raw, "Empty tag discarded");
                }
                tag
            }
            KEY_BACKSPACE => {
                self.buffer.pop();
                None
            }
            code => {
                if let Some(c) = key_to_char(code, self.shift) {
                    self.buffer.push(c);
                }
                None
            }
        }
    }
}

/// Reads a [`KeySource`] until it fails.
#[derive(Debug)]
pub struct InputDecoder<K> {
    source: K,
    assembler: TagAssembler,
}

impl<K: KeySource> InputDecoder<K> {
    pub fn new(source: K) -> Self {
        Self {
            source,
            assembler: TagAssembler::new(),
        }
    }

    /// Decode events and call `dispatch` for every complete tag.
    ///
    /// `dispatch` must not block; the next event is read as soon as it
    /// returns. Only returns when the source errors or closes.
    pub async fn run(&mut self, mut dispatch: impl FnMut(Tag)) -> HardwareError {
        loop {
            match self.source.next_event().await {
                Ok(event) => {
                    if let Some(tag) = self.assembler.handle(event) {
                        dispatch(tag);
                    }
                }
                Err(e) => return e,
            }
        }
    }
}
