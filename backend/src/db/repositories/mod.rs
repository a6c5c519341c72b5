//! Repository implementations module.
//!
//! This module contains the implementations of the `ObservationRepository` trait:
//! - `jsonl`: the scraper's append-only JSON-lines log on disk
//! - `local`: In-memory implementation for unit testing and local development
pub mod jsonl;
pub mod local;

pub use jsonl::{parse_json_lines, JsonLinesRepository};
pub use local::LocalRepository;
