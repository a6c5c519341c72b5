//! Public API surface for the attendance dashboard.
//!
//! This file consolidates the render-ready DTO types produced by the view
//! assembler. All types derive Serialize/Deserialize for JSON serialization.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::{TimeSlot, Weekday};

/// One of today's readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePoint {
    pub time: TimeSlot,
    pub count: u32,
}

/// A point of the typical curve (mean over the lookback window).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypicalPoint {
    pub time: TimeSlot,
    pub count: f64,
    pub sample_size: usize,
}

/// Today's readings against the typical curve of the same weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayVsTypicalView {
    pub weekday: Weekday,
    pub date: NaiveDate,
    pub today: Vec<TimePoint>,
    pub typical: Vec<TypicalPoint>,
}

/// Long-form summary table cell; `mean_count` is rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCell {
    pub weekday: Weekday,
    pub slot: TimeSlot,
    pub mean_count: u32,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakRow {
    pub weekday: Weekday,
    pub peak_time: DateTime<FixedOffset>,
    pub peak_count: u32,
}

/// Pivoted summary row: one cell per coarse slot header, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub weekday: Weekday,
    pub cells: Vec<Option<u32>>,
    pub peak_time: Option<TimeSlot>,
    pub peak_count: Option<u32>,
}

/// Weekday x coarse-slot means plus the per-weekday peaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummaryView {
    /// Coarse slot header, spanning opening hours.
    pub slots: Vec<TimeSlot>,
    pub table: Vec<SummaryCell>,
    pub peaks: Vec<PeakRow>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub weekday: Weekday,
    pub time: TimeSlot,
    pub visitors: f64,
}

/// A normalized observation for the all-time chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub count: u32,
}

/// State of the today-vs-typical panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TodayPanel {
    Ready(TodayVsTypicalView),
    NoReadingsToday { reason: String },
}

impl TodayPanel {
    pub fn is_ready(&self) -> bool {
        matches!(self, TodayPanel::Ready(_))
    }

    pub fn view(&self) -> Option<&TodayVsTypicalView> {
        match self {
            TodayPanel::Ready(view) => Some(view),
            TodayPanel::NoReadingsToday { .. } => None,
        }
    }
}

/// Facts about the pass that produced a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMeta {
    pub computed_at: DateTime<Utc>,
    /// "now" expressed in the reference zone.
    pub reference_now: DateTime<FixedOffset>,
    pub timezone: String,
    pub total_records: usize,
    pub skipped_records: usize,
    pub duplicate_records: usize,
    pub malformed_lines: usize,
    pub observations: usize,
    pub dataset_fingerprint: String,
}

/// Everything the dashboard renders, produced by one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    pub meta: DashboardMeta,
    pub today_vs_typical: TodayPanel,
    pub weekly_summary: WeeklySummaryView,
    pub weekly_profile: Vec<ProfileRow>,
    pub history: Vec<HistoryPoint>,
}
