//! Data Transfer Objects for the HTTP API.
//!
//! The dashboard views are re-exported from [`crate::api`] since they already
//! derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    DashboardMeta, DashboardPayload, HistoryPoint, PeakRow, ProfileRow, SummaryCell, SummaryRow,
    TimePoint, TodayPanel, TodayVsTypicalView, TypicalPoint, WeeklySummaryView,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Data source status (`available`, `unavailable` or `error: ...`)
    pub data_source: String,
    /// Description of the configured source
    pub source: String,
    /// When the cached payload was computed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_at: Option<chrono::DateTime<chrono::Utc>>,
}
