//! Raspberry Pi GPIO output lines.
//!
//! Pins use BCM numbering and are claimed as outputs driven low. `rppal`
//! restores a pin to its original mode when the [`GpioLine`] is dropped, which
//! releases the hardware for the next process.

use crate::{HardwareError, Result, traits::OutputLine, types::LineId};
use rppal::gpio::{Gpio, OutputPin};

/// One BCM pin driven as a feedback line.
#[derive(Debug)]
pub struct GpioLine {
    id: LineId,
    pin: OutputPin,
    asserted: bool,
}

impl GpioLine {
    /// Claim `bcm` as an output, initially low.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the pin is unavailable or already
    /// claimed by another process.
    pub fn open(gpio: &Gpio, id: LineId, bcm: u8) -> Result<Self> {
        let pin = gpio
            .get(bcm)
            .map_err(|e| {
                HardwareError::initialization_failed(format!("GPIO{bcm} for {id} line: {e}"))
            })?
            .into_output_low();

        tracing::debug!(line = %id, pin = bcm, "GPIO line claimed");

        Ok(Self {
            id,
            pin,
            asserted: false,
        })
    }
}

impl OutputLine for GpioLine {
    fn id(&self) -> LineId {
        self.id
    }

    fn set(&mut self, on: bool) -> Result<()> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        self.asserted = on;
        Ok(())
    }

    fn is_asserted(&self) -> bool {
        self.asserted
    }
}

/// Open the GPIO controller.
///
/// # Errors
///
/// Returns `InitializationFailed` when `/dev/gpiomem` is missing or not
/// accessible (not a Raspberry Pi, or missing group permissions).
pub fn open_controller() -> Result<Gpio> {
    Gpio::new().map_err(|e| HardwareError::initialization_failed(format!("GPIO controller: {e}")))
}
