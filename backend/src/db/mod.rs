//! Data access for the attendance log.
//!
//! This module provides abstractions over where raw readings come from via the
//! Repository pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Service Layer (services::dashboard) - analysis passes  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository) - ObservationRepository  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴───────────────┐
//!     │                               │
//! ┌───▼──────────────────┐   ┌────────▼──────────┐
//! │  JsonLinesRepository │   │  LocalRepository  │
//! │  (append-only log)   │   │  (in-memory)      │
//! └──────────────────────┘   └───────────────────┘
//! ```
//!
//! The log is written by the ingestion collaborator; nothing in this crate
//! appends to it.

pub mod checksum;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use checksum::calculate_checksum;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::{parse_json_lines, JsonLinesRepository, LocalRepository};
pub use repository::{
    ObservationRepository, RecordBatch, RepositoryContext, RepositoryError, RepositoryResult,
};
