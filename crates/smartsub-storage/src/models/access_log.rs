use crate::error::{StorageError, StorageResult};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use smartsub_core::constants::LOG_TIMESTAMP_FORMAT;
use smartsub_core::{Tag, Verdict};

/// One processed tag, as written to the access log.
///
/// The on-disk form is a single tab-separated line in local time:
///
/// ```text
/// 2025-03-14 08:02:11<TAB>E2003412<TAB>OK
/// ```
///
/// The timestamp is when the tag was read, not when the verdict arrived, so
/// records of concurrent tags can appear slightly out of order.
///
/// # Examples
///
/// ```
/// use smartsub_storage::models::AccessRecord;
/// use smartsub_core::{Tag, Verdict};
/// use chrono::NaiveDate;
///
/// let at = NaiveDate::from_ymd_opt(2025, 3, 14)
///     .unwrap()
///     .and_hms_opt(8, 2, 11)
///     .unwrap();
/// let record = AccessRecord::new(at, Tag::new("E2003412").unwrap(), Verdict::Ok);
///
/// assert_eq!(record.to_line(), "2025-03-14 08:02:11\tE2003412\tOK\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Local wall-clock time the tag was read
    pub timestamp: NaiveDateTime,

    /// Sanitized tag
    pub tag: Tag,

    /// Validation outcome
    pub verdict: Verdict,
}

impl AccessRecord {
    /// Create a record for a read at `timestamp`.
    pub fn new(timestamp: NaiveDateTime, tag: Tag, verdict: Verdict) -> Self {
        Self {
            timestamp,
            tag,
            verdict,
        }
    }

    /// Current local time, truncated to what the log stores.
    pub fn now() -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    /// Format as one log line, newline included.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\n",
            self.timestamp.format(LOG_TIMESTAMP_FORMAT),
            self.tag,
            self.verdict
        )
    }

    /// Parse one log line (with or without its newline).
    ///
    /// `line_no` is only used in error messages.
    pub fn parse_line(line: &str, line_no: usize) -> StorageResult<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.split('\t');
        let (Some(ts), Some(tag), Some(verdict), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(StorageError::malformed(line_no, "expected three tab-separated fields"));
        };

        let timestamp = NaiveDateTime::parse_from_str(ts, LOG_TIMESTAMP_FORMAT)
            .map_err(|e| StorageError::malformed(line_no, format!("timestamp {ts:?}: {e}")))?;
        let tag = Tag::new(tag).map_err(|e| StorageError::malformed(line_no, e.to_string()))?;
        let verdict = match verdict {
            "OK" => Verdict::Ok,
            "NOK" => Verdict::Nok,
            other => {
                return Err(StorageError::malformed(
                    line_no,
                    format!("verdict {other:?}"),
                ));
            }
        };

        Ok(Self::new(timestamp, tag, verdict))
    }
}
