//! # Gym Attendance Analytics
//!
//! Analysis engine behind the gym attendance dashboard.
//!
//! The scraper appends one `{timestamp, count, status}` reading per line to an
//! append-only log. This crate reads that log in full, and derives the views
//! the dashboard renders: today's readings against the typical curve for the
//! same weekday, a weekday x hour summary table with per-day peaks, and full
//! weekly profiles. Results are cached for a configurable freshness window.
//!
//! ## Architecture
//!
//! - [`models`]: raw records, observations, weekdays, time slots, timestamp
//!   parsing and flooring
//! - [`db`]: repository pattern over the attendance log (JSON lines, in-memory)
//! - [`services`]: normalizer, bucketer, aggregator, view assembler, result
//!   cache and the dashboard service
//! - [`api`]: render-ready DTOs
//! - [`config`]: TOML configuration and environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;


#[cfg(feature = "http-server")]
pub mod http;

pub use error::{AnalyticsError, AnalyticsResult};
