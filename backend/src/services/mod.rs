//! Service layer: the attendance analysis engine and its orchestration.
//!
//! Data flows one way through the engine:
//!
//! ```text
//! RawRecord batch -> normalizer -> bucketer -> aggregator -> views -> cache
//! ```
//!
//! [`dashboard::DashboardService`] ties the stages to a repository, a clock
//! and the result cache.

pub mod aggregator;
pub mod bucketer;
pub mod cache;
pub mod clock;
pub mod dashboard;
pub mod normalizer;
pub mod views;


pub use aggregator::{
    AggregateEntry, Aggregation, Aggregator, PeakEntry, TodayReading, TodayVsTypical,
    WeeklyProfile, WeeklySummary,
};
pub use bucketer::{BucketKey, BucketedObservation, Bucketer};
pub use cache::ResultCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use dashboard::{build_dashboard, DashboardService};
pub use normalizer::{normalize, NormalizedSeries, SkipReason, SkipStats};
