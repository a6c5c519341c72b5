//! Repository factory for dependency injection.
//!
//! Builds the configured data source once at startup; the result is shared by
//! reference for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::repositories::{JsonLinesRepository, LocalRepository};
use super::repository::{ObservationRepository, RepositoryError, RepositoryResult};
use crate::config::RepositorySettings;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// Append-only JSON-lines log on disk
    #[default]
    Jsonl,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("jsonl", "local").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "json-lines" | "file" => Ok(Self::Jsonl),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use gym_attendance::config::RepositorySettings;
/// use gym_attendance::db::{RepositoryFactory, RepositoryType};
///
/// let settings = RepositorySettings {
///     repo_type: RepositoryType::Local,
///     path: None,
/// };
/// let repo = RepositoryFactory::create(&settings).unwrap();
/// assert!(repo.describe().starts_with("memory"));
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance from settings.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn ObservationRepository>)` - Shared repository instance
    /// * `Err(RepositoryError::Configuration)` - If a JSONL source has no path
    pub fn create(settings: &RepositorySettings) -> RepositoryResult<Arc<dyn ObservationRepository>> {
        match settings.repo_type {
            RepositoryType::Jsonl => {
                let path = settings.path.as_ref().ok_or_else(|| {
                    RepositoryError::configuration("JSONL repository requires 'repository.path'")
                })?;
                Ok(Arc::new(JsonLinesRepository::new(path.clone())))
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create an empty in-memory repository.
    pub fn create_local() -> Arc<dyn ObservationRepository> {
        Arc::new(LocalRepository::new())
    }
}
