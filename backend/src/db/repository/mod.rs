//! Repository trait for abstracting access to the attendance log.
//!
//! The log is append-only and owned by the ingestion side; the engine only ever
//! reads it in full, once per analysis pass.

pub mod error;

use async_trait::async_trait;

use crate::models::RawRecord;

pub use error::{RepositoryContext, RepositoryError, RepositoryResult};

/// A full read of the attendance log.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    /// Records in log order, including ones the normalizer will reject.
    pub records: Vec<RawRecord>,
    /// Hex SHA-256 identifying the snapshot that was read.
    pub fingerprint: String,
    /// Lines that were not valid record objects. Each is also present in
    /// `records` as an empty record.
    pub malformed_lines: usize,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of raw attendance records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one instance is shared by every
/// request handler.
#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// Check if the data source is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the source can be read
    /// - `Ok(false)` if it is unavailable but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Read every record currently in the log.
    async fn fetch_records(&self) -> RepositoryResult<RecordBatch>;

    /// Human-readable description of the source, used in logs and `/health`.
    fn describe(&self) -> String;
}
