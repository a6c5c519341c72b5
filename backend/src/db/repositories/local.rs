//! In-memory local repository implementation.
//!
//! Holds raw records in a `Vec` behind a shared lock, suitable for unit tests
//! and local development. Clones share the same storage.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::db::checksum::calculate_checksum;
use crate::db::repository::*;
use crate::models::RawRecord;

/// In-memory local repository.
///
/// # Example
/// ```
/// use gym_attendance::db::repositories::LocalRepository;
/// use gym_attendance::models::RawRecord;
///
/// let repo = LocalRepository::new();
/// repo.push(RawRecord::new("2025-10-13T10:05:00+02:00", 10));
/// assert_eq!(repo.record_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    records: Vec<RawRecord>,
    // Connection health
    is_available: bool,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a repository pre-populated with `records`.
    pub fn with_records(records: Vec<RawRecord>) -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                records,
                is_available: true,
            })),
        }
    }

    /// Append a record, as the scraper would.
    pub fn push(&self, record: RawRecord) {
        self.data.write().records.push(record);
    }

    pub fn extend(&self, records: impl IntoIterator<Item = RawRecord>) {
        self.data.write().records.extend(records);
    }

    /// Toggle availability to simulate an unreachable upstream store.
    pub fn set_available(&self, available: bool) {
        self.data.write().is_available = available;
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.data.write().records.clear();
    }

    pub fn record_count(&self) -> usize {
        self.data.read().records.len()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObservationRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_available)
    }

    async fn fetch_records(&self) -> RepositoryResult<RecordBatch> {
        let data = self.data.read();
        if !data.is_available {
            return Err(RepositoryError::connection("In-memory store marked unavailable"));
        }

        let serialized = serde_json::to_string(&data.records).map_err(|e| {
            RepositoryError::internal(format!("Failed to serialize records: {}", e))
        })?;

        Ok(RecordBatch {
            records: data.records.clone(),
            fingerprint: calculate_checksum(serialized.as_bytes()),
            malformed_lines: 0,
        })
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.record_count())
    }
}
