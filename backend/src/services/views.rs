//! View assembler.
//!
//! Reshapes aggregation output into the render-ready DTOs in [`crate::api`].
//! No aggregation happens here: only filtering to opening hours, ordering,
//! pivoting and rounding of table values.

use std::collections::BTreeMap;

use crate::api::{
    HistoryPoint, PeakRow, ProfileRow, SummaryCell, SummaryRow, TimePoint, TodayPanel,
    TodayVsTypicalView, TypicalPoint, WeeklySummaryView,
};
use crate::error::AnalyticsResult;
use crate::models::{OpeningHours, Observation, TimeSlot, Weekday};
use crate::services::aggregator::{TodayVsTypical, WeeklyProfile, WeeklySummary};
use crate::services::bucketer::Bucketer;

/// Round a mean for table display (half away from zero).
pub fn round_count(mean: f64) -> u32 {
    mean.round().max(0.0) as u32
}

pub fn today_vs_typical_view(result: &TodayVsTypical, hours: OpeningHours) -> TodayVsTypicalView {
    TodayVsTypicalView {
        weekday: result.weekday,
        date: result.date,
        today: result
            .today
            .iter()
            .filter(|reading| hours.contains_slot(reading.slot))
            .map(|reading| TimePoint {
                time: reading.slot,
                count: reading.count,
            })
            .collect(),
        typical: result
            .typical
            .iter()
            .filter(|entry| hours.contains_slot(entry.key.slot))
            .map(|entry| TypicalPoint {
                time: entry.key.slot,
                count: entry.mean_count,
                sample_size: entry.sample_size,
            })
            .collect(),
    }
}

/// Ready view, or the "no readings yet today" state for an insufficient
/// data failure. Any other failure is passed through.
pub fn today_panel(
    result: &AnalyticsResult<TodayVsTypical>,
    hours: OpeningHours,
) -> AnalyticsResult<TodayPanel> {
    match result {
        Ok(today) => Ok(TodayPanel::Ready(today_vs_typical_view(today, hours))),
        Err(err) if err.is_insufficient_data() => Ok(TodayPanel::NoReadingsToday {
            reason: err.reason().to_string(),
        }),
        Err(err) => Err(err.clone()),
    }
}

pub fn weekly_summary_view(summary: &WeeklySummary, bucketer: &Bucketer) -> WeeklySummaryView {
    let slots = bucketer.coarse_labels();
    let hours = bucketer.opening_hours();

    let table: Vec<SummaryCell> = summary
        .entries
        .iter()
        .filter(|entry| hours.contains_slot(entry.key.slot))
        .map(|entry| SummaryCell {
            weekday: entry.key.weekday,
            slot: entry.key.slot,
            mean_count: round_count(entry.mean_count),
            sample_size: entry.sample_size,
        })
        .collect();

    let peaks: Vec<PeakRow> = summary
        .peaks
        .iter()
        .map(|peak| PeakRow {
            weekday: peak.weekday,
            peak_time: peak.timestamp.fixed_offset(),
            peak_count: peak.count,
        })
        .collect();

    let mut by_day: BTreeMap<Weekday, BTreeMap<TimeSlot, u32>> = BTreeMap::new();
    for cell in &table {
        by_day
            .entry(cell.weekday)
            .or_default()
            .insert(cell.slot, cell.mean_count);
    }
    for peak in &summary.peaks {
        by_day.entry(peak.weekday).or_default();
    }

    let rows = by_day
        .into_iter()
        .map(|(weekday, cells)| {
            let peak = summary.peaks.iter().find(|p| p.weekday == weekday);
            SummaryRow {
                weekday,
                cells: slots.iter().map(|slot| cells.get(slot).copied()).collect(),
                peak_time: peak.map(|p| bucketer.fine_slot(&p.timestamp)),
                peak_count: peak.map(|p| p.count),
            }
        })
        .collect();

    WeeklySummaryView {
        slots,
        table,
        peaks,
        rows,
    }
}

pub fn weekly_profile_rows(profile: &WeeklyProfile, hours: OpeningHours) -> Vec<ProfileRow> {
    profile
        .entries
        .iter()
        .filter(|entry| hours.contains_slot(entry.key.slot))
        .map(|entry| ProfileRow {
            weekday: entry.key.weekday,
            time: entry.key.slot,
            visitors: entry.mean_count,
        })
        .collect()
}

/// Every observation, unfiltered.
pub fn history_points(observations: &[Observation]) -> Vec<HistoryPoint> {
    observations
        .iter()
        .map(|obs| HistoryPoint {
            timestamp: obs.timestamp.fixed_offset(),
            count: obs.count,
        })
        .collect()
}
