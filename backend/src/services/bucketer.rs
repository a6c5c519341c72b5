//! Temporal bucketing.
//!
//! Maps normalized observations onto `(weekday, slot)` keys at two widths:
//! the fine slot (native granularity, used by the profile and the typical
//! curve) and the coarse slot (summary table). Everything here is a pure
//! function of the configuration and the timestamp.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::models::{minute_of_day, Observation, OpeningHours, TimeSlot, Weekday};

/// `(weekday, slot)` grouping key. Orders Monday first, then by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BucketKey {
    pub weekday: Weekday,
    pub slot: TimeSlot,
}

impl BucketKey {
    pub fn new(weekday: Weekday, slot: TimeSlot) -> Self {
        Self { weekday, slot }
    }
}

/// An observation together with every key derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketedObservation {
    pub observation: Observation,
    pub weekday: Weekday,
    /// Local calendar date in the reference zone.
    pub date: NaiveDate,
    pub fine: TimeSlot,
    /// `None` outside opening hours.
    pub coarse: Option<TimeSlot>,
    pub in_opening_hours: bool,
}

impl BucketedObservation {
    pub fn fine_key(&self) -> BucketKey {
        BucketKey::new(self.weekday, self.fine)
    }

    pub fn coarse_key(&self) -> Option<BucketKey> {
        self.coarse.map(|slot| BucketKey::new(self.weekday, slot))
    }
}

/// Stateless slot mapper built from an [`AnalyticsConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Bucketer {
    timezone: Tz,
    granularity: u32,
    coarse_step: u32,
    hours: OpeningHours,
}

impl Bucketer {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            timezone: config.timezone,
            granularity: config.granularity_minutes.max(1),
            coarse_step: config.coarse_step_minutes.max(1),
            hours: config.opening_hours,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn opening_hours(&self) -> OpeningHours {
        self.hours
    }

    /// Express an instant in the reference zone.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.timezone)
    }

    pub fn weekday(&self, ts: &DateTime<Tz>) -> Weekday {
        Weekday::from(ts.with_timezone(&self.timezone).weekday())
    }

    /// Fine slot of a timestamp, floored to the native granularity.
    pub fn fine_slot(&self, ts: &DateTime<Tz>) -> TimeSlot {
        let minute = minute_of_day(&ts.with_timezone(&self.timezone));
        let floored = minute - minute % self.granularity;
        TimeSlot::wrapping(floored)
    }

    /// Coarse slot `[b, b + step)` anchored at opening time, or `None` when
    /// the timestamp falls outside opening hours.
    pub fn coarse_slot(&self, ts: &DateTime<Tz>) -> Option<TimeSlot> {
        let minute = minute_of_day(&ts.with_timezone(&self.timezone));
        if !self.hours.contains(minute) {
            return None;
        }
        let open = self.hours.opening();
        TimeSlot::from_minutes(open + ((minute - open) / self.coarse_step) * self.coarse_step)
    }

    pub fn is_open(&self, ts: &DateTime<Tz>) -> bool {
        self.hours.contains(minute_of_day(&ts.with_timezone(&self.timezone)))
    }

    /// Ordered coarse labels spanning opening hours.
    pub fn coarse_labels(&self) -> Vec<TimeSlot> {
        (self.hours.opening()..self.hours.closing())
            .step_by(self.coarse_step as usize)
            .filter_map(TimeSlot::from_minutes)
            .collect()
    }

    pub fn bucket(&self, observation: &Observation) -> BucketedObservation {
        let local = observation.timestamp.with_timezone(&self.timezone);
        BucketedObservation {
            observation: *observation,
            weekday: self.weekday(&local),
            date: local.date_naive(),
            fine: self.fine_slot(&local),
            coarse: self.coarse_slot(&local),
            in_opening_hours: self.is_open(&local),
        }
    }

    pub fn bucket_series(&self, observations: &[Observation]) -> Vec<BucketedObservation> {
        observations.iter().map(|o| self.bucket(o)).collect()
    }
}
