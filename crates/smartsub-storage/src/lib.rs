//! Storage layer for the SmartSub checkpoint validator.
//!
//! Every processed tag leaves one line in an append-only text log, the audit
//! trail operators grep when a checkpoint disputes a reading.
//!
//! # Architecture
//!
//! - [`AccessRecord`] - One processed tag and its verdict, with its line format
//! - [`AccessLogRepository`] - Append/read contract the engine writes through
//! - [`FileAccessLog`] - The production text file
//! - [`MemoryAccessLog`] - In-memory log for tests
//!
//! # Examples
//!
//! ```no_run
//! use smartsub_storage::{AccessLogRepository, AccessRecord, FileAccessLog};
//! use smartsub_core::{Tag, Verdict};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let log = FileAccessLog::new("tag_reads.log");
//! let record = AccessRecord::new(AccessRecord::now(), Tag::new("E2003412")?, Verdict::Ok);
//! log.append(&record).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod repositories;

pub use error::{StorageError, StorageResult};
pub use models::AccessRecord;
pub use repositories::{AccessLogRepository, FileAccessLog, MemoryAccessLog};
