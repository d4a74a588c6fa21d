//! Timed LED and buzzer patterns.
//!
//! The [`FeedbackController`] owns the three output lines. Callers that share
//! it (tag processors and the idle watchdog) wrap it in a single async mutex,
//! which is what keeps two patterns from ever interleaving on the hardware.
//!
//! Patterns:
//!
//! | Signal | Sequence |
//! |--------|----------|
//! | OK     | green on, 180 ms, green off |
//! | NOK    | red + buzzer on, 150 ms, buzzer off, 50 ms, red off |
//! | ALERT  | twice: red + buzzer on, 120 ms, both off, 120 ms |

use crate::{
    HardwareError, Result,
    console::ConsoleLine,
    devices::AnyOutputLine,
    mock::{LineTrace, MockLine},
    traits::OutputLine,
    types::{FeedbackSignal, LineId},
};
use smartsub_core::{FeedbackBackend, FeedbackConfig};
use std::time::Duration;
use tokio::time::sleep;

/// Green flash for an accepted tag.
pub const OK_FLASH: Duration = Duration::from_millis(180);

/// Beep length for a rejected tag.
pub const NOK_BEEP: Duration = Duration::from_millis(150);

/// How long red stays on after the rejection beep ends.
pub const NOK_TAIL: Duration = Duration::from_millis(50);

/// On time of one alert flash.
pub const ALERT_ON: Duration = Duration::from_millis(120);

/// Pause after each alert flash.
pub const ALERT_OFF: Duration = Duration::from_millis(120);

/// Flashes per alert.
pub const ALERT_FLASHES: usize = 2;

/// The three feedback lines.
#[derive(Debug)]
pub struct FeedbackLines {
    pub green: AnyOutputLine,
    pub red: AnyOutputLine,
    pub buzzer: AnyOutputLine,
}

impl FeedbackLines {
    /// Build the lines for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if a GPIO pin cannot be claimed, or
    /// `Unsupported` if the GPIO backend is requested in a build without the
    /// `hardware-gpio` feature.
    pub fn from_config(config: &FeedbackConfig) -> Result<Self> {
        match config.backend {
            FeedbackBackend::Console => Ok(Self::console()),
            FeedbackBackend::Gpio => Self::gpio(config),
        }
    }

    /// Lines that only log.
    pub fn console() -> Self {
        Self {
            green: AnyOutputLine::Console(ConsoleLine::new(LineId::Green)),
            red: AnyOutputLine::Console(ConsoleLine::new(LineId::Red)),
            buzzer: AnyOutputLine::Console(ConsoleLine::new(LineId::Buzzer)),
        }
    }

    /// Mock lines sharing one trace.
    pub fn mock() -> (Self, LineTrace) {
        let trace = LineTrace::new();
        let line = |id| AnyOutputLine::Mock(MockLine::new(id, trace.clone()));
        let lines = Self {
            green: line(LineId::Green),
            red: line(LineId::Red),
            buzzer: line(LineId::Buzzer),
        };
        (lines, trace)
    }

    #[cfg(feature = "hardware-gpio")]
    fn gpio(config: &FeedbackConfig) -> Result<Self> {
        use crate::gpio::{GpioLine, open_controller};

        let gpio = open_controller()?;
        Ok(Self {
            green: AnyOutputLine::Gpio(GpioLine::open(&gpio, LineId::Green, config.green_pin)?),
            red: AnyOutputLine::Gpio(GpioLine::open(&gpio, LineId::Red, config.red_pin)?),
            buzzer: AnyOutputLine::Gpio(GpioLine::open(
                &gpio,
                LineId::Buzzer,
                config.buzzer_pin,
            )?),
        })
    }

    #[cfg(not(feature = "hardware-gpio"))]
    fn gpio(_config: &FeedbackConfig) -> Result<Self> {
        Err(HardwareError::unsupported(
            "gpio feedback backend (built without the hardware-gpio feature)",
        ))
    }

    fn get_mut(&mut self, id: LineId) -> &mut AnyOutputLine {
        match id {
            LineId::Green => &mut self.green,
            LineId::Red => &mut self.red,
            LineId::Buzzer => &mut self.buzzer,
        }
    }

    /// Release every line, attempting all of them even if one fails.
    ///
    /// Returns the first error encountered.
    pub fn all_off(&mut self) -> Result<()> {
        let mut first_error = None;
        for id in LineId::ALL {
            if let Err(e) = self.get_mut(id).set(false) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Plays feedback patterns on the owned lines.
///
/// After [`shutdown`](Self::shutdown) the lines are released (GPIO pins go
/// back to the system) and further patterns fail with `Disconnected`.
#[derive(Debug)]
pub struct FeedbackController {
    lines: Option<FeedbackLines>,
}

impl FeedbackController {
    /// Take ownership of the lines.
    pub fn new(lines: FeedbackLines) -> Self {
        Self { lines: Some(lines) }
    }

    fn lines(&mut self) -> Result<&mut FeedbackLines> {
        self.lines
            .as_mut()
            .ok_or_else(|| HardwareError::disconnected("feedback lines (shut down)"))
    }

    /// Play one pattern to completion.
    ///
    /// Every line is off when this returns, whether the pattern completed or
    /// failed midway.
    ///
    /// # Errors
    ///
    /// Returns the first line error, or `Disconnected` after shutdown.
    pub async fn play(&mut self, signal: FeedbackSignal) -> Result<()> {
        tracing::debug!(%signal, "Playing feedback");
        let lines = self.lines()?;
        let result = match signal {
            FeedbackSignal::Ok => play_ok(lines).await,
            FeedbackSignal::Nok => play_nok(lines).await,
            FeedbackSignal::Alert => play_alert(lines).await,
        };
        if result.is_err() {
            let _ = lines.all_off();
        }
        result
    }

    /// Force every line off.
    pub fn all_off(&mut self) -> Result<()> {
        self.lines()?.all_off()
    }

    /// Force every line off and release the hardware. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut lines) = self.lines.take() {
            if let Err(e) = lines.all_off() {
                tracing::warn!(error = %e, "Could not switch feedback lines off");
            }
            tracing::debug!("Feedback lines released");
        }
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.lines.is_none()
    }
}

impl Drop for FeedbackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn play_ok(lines: &mut FeedbackLines) -> Result<()> {
    lines.green.set(true)?;
    sleep(OK_FLASH).await;
    lines.green.set(false)
}

async fn play_nok(lines: &mut FeedbackLines) -> Result<()> {
    lines.red.set(true)?;
    lines.buzzer.set(true)?;
    sleep(NOK_BEEP).await;
    lines.buzzer.set(false)?;
    sleep(NOK_TAIL).await;
    lines.red.set(false)
}

async fn play_alert(lines: &mut FeedbackLines) -> Result<()> {
    for _ in 0..ALERT_FLASHES {
        lines.red.set(true)?;
        lines.buzzer.set(true)?;
        sleep(ALERT_ON).await;
        lines.red.set(false)?;
        lines.buzzer.set(false)?;
        sleep(ALERT_OFF).await;
    }
    Ok(())
}
