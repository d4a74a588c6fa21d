use crate::error::{StorageError, StorageResult};
use crate::models::AccessRecord;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Repository trait for access log records
///
/// The log is append-only: records are never updated or removed.
///
/// # Implementation Note
///
/// The futures are declared `Send` so appends can happen inside spawned
/// tasks; implementors can still write plain `async fn`.
pub trait AccessLogRepository: Send + Sync + 'static {
    /// Append one record
    fn append(&self, record: &AccessRecord) -> impl Future<Output = StorageResult<()>> + Send;

    /// Read every record, oldest first
    fn read_all(&self) -> impl Future<Output = StorageResult<Vec<AccessRecord>>> + Send;
}

/// Append-only UTF-8 text file implementation of AccessLogRepository
///
/// The file is opened per append in append mode and created if missing, so
/// it can be rotated or removed underneath a running process. Appends from
/// concurrent tasks are serialized so lines never interleave.
#[derive(Debug)]
pub struct FileAccessLog {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileAccessLog {
    /// Create a repository writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccessLogRepository for FileAccessLog {
    async fn append(&self, record: &AccessRecord) -> StorageResult<()> {
        let line = record.to_line();
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        tracing::trace!(path = %self.path.display(), tag = %record.tag, "Access record appended");
        Ok(())
    }

    async fn read_all(&self) -> StorageResult<Vec<AccessRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .map(|(i, line)| AccessRecord::parse_line(line, i + 1))
            .collect()
    }
}

/// In-memory implementation of AccessLogRepository for tests and dry runs
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccessLog {
    records: Arc<Mutex<Vec<AccessRecord>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryAccessLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent append fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<AccessRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl AccessLogRepository for MemoryAccessLog {
    async fn append(&self, record: &AccessRecord) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Internal("injected append failure".to_string()));
        }
        self.records
            .lock()
            .map_err(|_| StorageError::Internal("access log poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }

    async fn read_all(&self) -> StorageResult<Vec<AccessRecord>> {
        Ok(self.records())
    }
}
