//! Reading the access log back for operators.

use anyhow::Context;
use smartsub_core::constants::EXIT_OK;
use smartsub_storage::{AccessLogRepository, AccessRecord, StorageResult};
use std::io::Write;

/// The last `count` records, oldest first.
pub async fn recent_reads<L: AccessLogRepository>(
    log: &L,
    count: usize,
) -> StorageResult<Vec<AccessRecord>> {
    let mut records = log.read_all().await?;
    let skip = records.len().saturating_sub(count);
    records.drain(..skip);
    Ok(records)
}

/// Write the last `count` records to stdout in log format.
pub async fn print_recent_reads<L: AccessLogRepository>(
    log: &L,
    count: usize,
) -> anyhow::Result<i32> {
    let records = recent_reads(log, count)
        .await
        .context("reading the access log")?;

    let mut stdout = std::io::stdout().lock();
    for record in &records {
        stdout.write_all(record.to_line().as_bytes())?;
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartsub_storage::{FileAccessLog, StorageError};

    const LOG: &str = "2025-03-14 08:00:00\tAA01\tOK\n\
                       2025-03-14 08:00:05\tBB02\tNOK\n\
                       2025-03-14 08:01:00\tCC03\tOK\n";

    fn file_log(contents: &str) -> (tempfile::TempDir, FileAccessLog) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tag_reads.log");
        std::fs::write(&path, contents).unwrap();
        (dir, FileAccessLog::new(path))
    }

    #[tokio::test]
    async fn test_recent_reads_keeps_newest() {
        let (_dir, log) = file_log(LOG);
        let records = recent_reads(&log, 2).await.unwrap();
        let tags: Vec<_> = records.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, ["BB02", "CC03"]);
    }

    #[tokio::test]
    async fn test_recent_reads_more_than_available() {
        let (_dir, log) = file_log(LOG);
        assert_eq!(recent_reads(&log, 10).await.unwrap().len(), 3);
        assert!(recent_reads(&log, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_reads_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileAccessLog::new(dir.path().join("absent.log"));
        assert!(recent_reads(&log, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_reads_reports_corrupt_line() {
        let (_dir, log) = file_log("2025-03-14 08:00:00\tAA01\tOK\ngarbage\n");
        let err = recent_reads(&log, 5).await.unwrap_err();
        assert!(matches!(err, StorageError::Malformed { line: 2, .. }));
    }
}
