//! Record normalizer.
//!
//! Turns the raw log into the normalized series the rest of the engine works
//! on: validated, converted to the reference zone, floored to the fine
//! granularity, sorted, and with one observation per floored timestamp.

use chrono::DateTime;
use chrono_tz::Tz;
use log::warn;

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult, ErrorContext, Stage};
use crate::models::{floor_to_granularity, parse_timestamp, Observation, RawRecord};

/// Why a raw record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingField,
    InvalidTimestamp,
    InvalidCount,
}

/// Per-reason counts of dropped records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStats {
    pub missing_fields: usize,
    pub invalid_timestamps: usize,
    pub invalid_counts: usize,
}

impl SkipStats {
    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingField => self.missing_fields += 1,
            SkipReason::InvalidTimestamp => self.invalid_timestamps += 1,
            SkipReason::InvalidCount => self.invalid_counts += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_fields + self.invalid_timestamps + self.invalid_counts
    }
}

/// Ordered, floored, de-duplicated observations.
///
/// Timestamps are strictly increasing: when several raw samples floor to the
/// same slot, the one with the latest raw timestamp is kept (later input
/// wins on equal raw timestamps).
#[derive(Debug, Clone)]
pub struct NormalizedSeries {
    observations: Vec<Observation>,
    pub total_records: usize,
    pub skipped: SkipStats,
    pub duplicates: usize,
}

impl NormalizedSeries {
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn skipped_records(&self) -> usize {
        self.skipped.total()
    }
}

struct Sample {
    floored: DateTime<Tz>,
    raw: DateTime<Tz>,
    count: u32,
}

fn validate(record: &RawRecord, config: &AnalyticsConfig) -> Result<Sample, SkipReason> {
    let (Some(raw_ts), Some(raw_count)) = (record.timestamp.as_deref(), record.count) else {
        return Err(SkipReason::MissingField);
    };
    let count = u32::try_from(raw_count).map_err(|_| SkipReason::InvalidCount)?;
    let raw = parse_timestamp(raw_ts, config.timezone, config.naive_timestamps)
        .ok_or(SkipReason::InvalidTimestamp)?;

    Ok(Sample {
        floored: floor_to_granularity(raw, config.granularity_minutes),
        raw,
        count,
    })
}

/// Normalize a batch of raw records.
///
/// # Errors
/// `AnalyticsError::Data` when the input is empty or no record survives
/// validation; the context carries the skipped count.
pub fn normalize(records: &[RawRecord], config: &AnalyticsConfig) -> AnalyticsResult<NormalizedSeries> {
    if records.is_empty() {
        return Err(AnalyticsError::data(
            "input series is empty",
            ErrorContext::at(Stage::Normalize).with_skipped(0),
        ));
    }

    let mut skipped = SkipStats::default();
    let mut samples = Vec::with_capacity(records.len());
    for record in records {
        match validate(record, config) {
            Ok(sample) => samples.push(sample),
            Err(reason) => skipped.record(reason),
        }
    }

    if samples.is_empty() {
        return Err(AnalyticsError::data(
            "no valid records after filtering",
            ErrorContext::at(Stage::Normalize)
                .with_skipped(skipped.total())
                .with_details(format!(
                    "missing_fields={}, invalid_timestamps={}, invalid_counts={}",
                    skipped.missing_fields, skipped.invalid_timestamps, skipped.invalid_counts
                )),
        ));
    }

    // Stable: equal (floored, raw) pairs keep input order, so the last one
    // of a run is the latest sample.
    samples.sort_by(|a, b| a.floored.cmp(&b.floored).then(a.raw.cmp(&b.raw)));

    let mut observations: Vec<Observation> = Vec::with_capacity(samples.len());
    let mut duplicates = 0;
    for sample in samples {
        let observation = Observation {
            timestamp: sample.floored,
            count: sample.count,
        };
        match observations.last_mut() {
            Some(last) if last.timestamp == observation.timestamp => {
                *last = observation;
                duplicates += 1;
            }
            _ => observations.push(observation),
        }
    }

    if skipped.total() > 0 {
        warn!(
            "Skipped {} of {} records (missing fields: {}, bad timestamps: {}, bad counts: {})",
            skipped.total(),
            records.len(),
            skipped.missing_fields,
            skipped.invalid_timestamps,
            skipped.invalid_counts
        );
    }

    Ok(NormalizedSeries {
        observations,
        total_records: records.len(),
        skipped,
        duplicates,
    })
}
