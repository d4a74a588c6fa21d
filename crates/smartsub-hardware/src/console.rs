//! Output lines that only log, for bench setups without GPIO.

use crate::{Result, traits::OutputLine, types::LineId};

/// An output line that emits a tracing event on every level change.
#[derive(Debug)]
pub struct ConsoleLine {
    id: LineId,
    asserted: bool,
}

impl ConsoleLine {
    /// Create a released console line.
    pub fn new(id: LineId) -> Self {
        Self {
            id,
            asserted: false,
        }
    }
}

impl OutputLine for ConsoleLine {
    fn id(&self) -> LineId {
        self.id
    }

    fn set(&mut self, on: bool) -> Result<()> {
        if on != self.asserted {
            tracing::info!(line = %self.id, on, "Feedback line");
        }
        self.asserted = on;
        Ok(())
    }

    fn is_asserted(&self) -> bool {
        self.asserted
    }
}
