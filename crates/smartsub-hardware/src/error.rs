//! Error types for hardware operations.
//!
//! This module defines error types for the reader input device and the
//! feedback output lines, covering discovery failures, disconnection,
//! line access errors, and unsupported backends.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// No input device matched the configured reader hints.
    #[error("No reader matched hints {hints:?}; devices found: {found:?}")]
    NoMatchingDevice {
        hints: Vec<String>,
        found: Vec<String>,
    },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation is not supported by this device or build.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// An output line could not be driven.
    #[error("Line {line} error: {message}")]
    LineError { line: String, message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new no-matching-device error.
    pub fn no_matching_device(hints: &[String], found: Vec<String>) -> Self {
        Self::NoMatchingDevice {
            hints: hints.to_vec(),
            found,
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new line error.
    pub fn line(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LineError {
            line: line.into(),
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` when the error means the reader's event stream is gone.
    ///
    /// The input loop treats these as fatal.
    pub fn is_device_loss(&self) -> bool {
        matches!(self, Self::Disconnected { .. } | Self::Io(_))
    }
}
