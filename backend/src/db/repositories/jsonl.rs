//! JSON-lines file repository.
//!
//! Reads the scraper's append-only log (one JSON object per line) in full on
//! every call. Nothing is cached here; freshness is the result cache's job.

use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::db::checksum::calculate_checksum;
use crate::db::repository::*;
use crate::models::RawRecord;

/// Repository backed by a local JSONL file.
#[derive(Debug, Clone)]
pub struct JsonLinesRepository {
    path: PathBuf,
}

impl JsonLinesRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn context(&self, operation: &str) -> RepositoryContext {
        RepositoryContext::new(operation).with_source(self.path.display().to_string())
    }
}

/// Parse JSONL content into records.
///
/// Blank lines are skipped. Lines that are not record objects become empty
/// records so the normalizer accounts for them as skipped; the returned count
/// says how many there were.
pub fn parse_json_lines(content: &str) -> (Vec<RawRecord>, usize) {
    let mut records = Vec::new();
    let mut malformed = 0;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                malformed += 1;
                warn!("Skipping malformed log line {}: {}", idx + 1, e);
                records.push(RawRecord::default());
            }
        }
    }

    (records, malformed)
}

#[async_trait]
impl ObservationRepository for JsonLinesRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        tokio::fs::try_exists(&self.path).await.map_err(|e| {
            RepositoryError::io_with_context(
                e.to_string(),
                self.context("health_check").with_details(e.kind().to_string()),
            )
        })
    }

    async fn fetch_records(&self) -> RepositoryResult<RecordBatch> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            let context = self.context("fetch_records").with_details(e.kind().to_string());
            if e.kind() == std::io::ErrorKind::NotFound {
                RepositoryError::not_found_with_context("Attendance log does not exist", context)
            } else {
                RepositoryError::io_with_context(e.to_string(), context)
            }
        })?;

        let fingerprint = calculate_checksum(&bytes);
        let content = String::from_utf8_lossy(&bytes);
        let (records, malformed_lines) = parse_json_lines(&content);

        debug!(
            "Read {} records ({} malformed) from {}",
            records.len(),
            malformed_lines,
            self.path.display()
        );

        Ok(RecordBatch {
            records,
            fingerprint,
            malformed_lines,
        })
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}
