//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod keyboard;
pub mod line;

// Re-export commonly used types
pub use keyboard::{MockKeyboard, MockKeyboardHandle};
pub use line::{BusyPeriod, LineTrace, LineTransition, MockLine, Pulse};
