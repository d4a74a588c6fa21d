//! Core constants for the checkpoint validator.
//!
//! Defaults for every tunable live here so the configuration layer, the engine
//! and the binary agree on a single value. Durations are expressed in
//! milliseconds, matching the `*_ms` fields of the configuration file.
//!
//! # Usage
//!
//! ```
//! use smartsub_core::constants::*;
//! use std::time::Duration;
//!
//! let idle = Duration::from_millis(DEFAULT_IDLE_THRESHOLD_MS);
//! assert_eq!(idle.as_secs(), 30);
//!
//! assert!(RFID_HINTS.contains(&"rfid"));
//! ```

// ============================================================================
// Reader Identification
// ============================================================================

/// Name fragments that identify a keyboard-emulating RFID reader.
///
/// Matching is case-insensitive substring matching against the name the kernel
/// reports for each input device.
pub const RFID_HINTS: &[&str] = &["swusb", "m-id", "uhf", "rfid", "scanner"];

// ============================================================================
// Validation API
// ============================================================================

/// Default base URL of the checkpoint service.
///
/// The tag is appended as the final, percent-encoded path segment.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:9062/api/checkpoint-posto";

/// Default timeout for one validation request (milliseconds).
///
/// # Value: 2500ms
pub const DEFAULT_API_TIMEOUT_MS: u64 = 2500;

/// Minimum accepted validation timeout (milliseconds).
pub const MIN_API_TIMEOUT_MS: u64 = 100;

/// Maximum accepted validation timeout (milliseconds).
///
/// Anything longer leaves the operator staring at a dark LED.
pub const MAX_API_TIMEOUT_MS: u64 = 60_000;

/// Boolean fields inspected in a JSON response, in priority order.
pub const VERDICT_FIELDS: &[&str] = &["registered", "valid", "ok", "success"];

/// Fallback field whose string value carries the verdict.
pub const STATUS_FIELD: &str = "status";

/// Accepted (lowercase) values of the `status` field.
pub const STATUS_ACCEPTED: &[&str] = &["ok", "success", "valid"];

/// Accepted (trimmed, lowercase) plain-text response bodies.
pub const TEXT_ACCEPTED: &[&str] = &["ok", "true", "1", "valid"];

/// Number of body characters included in debug output.
pub const BODY_EXCERPT_CHARS: usize = 100;

// ============================================================================
// Timing
// ============================================================================

/// Idle time after the last success before the alarm engages (milliseconds).
///
/// # Value: 30000ms (30 seconds)
pub const DEFAULT_IDLE_THRESHOLD_MS: u64 = 30_000;

/// Pause between repeated alarms once the idle threshold is exceeded (milliseconds).
///
/// # Value: 2000ms
pub const DEFAULT_REMINDER_INTERVAL_MS: u64 = 2_000;

/// Window in which a repeated read of the same tag is ignored (milliseconds).
///
/// # Value: 1000ms
pub const DEFAULT_MIN_REPEAT_MS: u64 = 1_000;

/// Watchdog polling period (milliseconds).
///
/// # Value: 1000ms
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// How often the watchdog reports idle progress while armed (seconds).
pub const IDLE_REPORT_EVERY_SECS: u64 = 10;

// ============================================================================
// Feedback Hardware (BCM numbering)
// ============================================================================

/// Green indicator LED.
pub const PIN_GREEN: u8 = 17;

/// Red indicator LED.
pub const PIN_RED: u8 = 27;

/// Buzzer.
pub const PIN_BUZZER: u8 = 22;

// ============================================================================
// Files
// ============================================================================

/// Default access log file name.
pub const DEFAULT_ACCESS_LOG: &str = "tag_reads.log";

/// Default single-instance lock file name.
pub const DEFAULT_LOCK_FILE: &str = ".smartsub_validator.lock";

/// Timestamp format of access log records.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Process Exit Codes
// ============================================================================

/// Normal shutdown.
pub const EXIT_OK: i32 = 0;

/// Startup or configuration failure.
pub const EXIT_STARTUP_FAILURE: i32 = 1;

/// Another instance holds the lock file.
pub const EXIT_ALREADY_RUNNING: i32 = 2;

/// No input device matched the reader hints.
pub const EXIT_NO_READER: i32 = 3;

/// The reader's event stream failed or closed.
pub const EXIT_DEVICE_LOST: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            EXIT_OK,
            EXIT_STARTUP_FAILURE,
            EXIT_ALREADY_RUNNING,
            EXIT_NO_READER,
            EXIT_DEVICE_LOST,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_pins_are_distinct() {
        assert_ne!(PIN_GREEN, PIN_RED);
        assert_ne!(PIN_RED, PIN_BUZZER);
        assert_ne!(PIN_GREEN, PIN_BUZZER);
    }

    #[test]
    fn test_api_timeout_bounds() {
        assert!((MIN_API_TIMEOUT_MS..=MAX_API_TIMEOUT_MS).contains(&DEFAULT_API_TIMEOUT_MS));
    }
}
