//! Aggregation of bucketed observations into the three analysis views.
//!
//! Every view is a two-pass computation: bucket each observation into a key,
//! then fold observations sharing a key into a running `(sum, count, max)`
//! accumulator. Results come out of a `BTreeMap`, so ordering follows
//! [`BucketKey`]'s `Ord` (Monday first, then ascending time).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult, ErrorContext, Stage};
use crate::models::{Observation, TimeSlot, Weekday};
use crate::services::bucketer::{BucketKey, BucketedObservation, Bucketer};
use crate::services::normalizer::NormalizedSeries;

/// Mean count of one `(weekday, slot)` group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateEntry {
    pub key: BucketKey,
    pub mean_count: f64,
    pub sample_size: usize,
}

/// Highest single observation of a weekday within the lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakEntry {
    pub weekday: Weekday,
    pub timestamp: DateTime<Tz>,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayReading {
    pub slot: TimeSlot,
    pub count: u32,
}

/// Today's readings next to the typical curve for the same weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct TodayVsTypical {
    pub weekday: Weekday,
    pub date: NaiveDate,
    pub today: Vec<TodayReading>,
    pub typical: Vec<AggregateEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    /// Non-empty `(weekday, coarse slot)` groups.
    pub entries: Vec<AggregateEntry>,
    /// At most one peak per weekday, Monday first.
    pub peaks: Vec<PeakEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyProfile {
    pub entries: Vec<AggregateEntry>,
}

/// Output of one aggregation pass.
///
/// `today` fails independently: an empty today series does not prevent the
/// weekly views from being computed.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub today: AnalyticsResult<TodayVsTypical>,
    pub summary: WeeklySummary,
    pub profile: WeeklyProfile,
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: u64,
    count: usize,
    max: Option<Observation>,
}

impl Accumulator {
    fn add(&mut self, observation: &Observation) {
        self.sum += u64::from(observation.count);
        self.count += 1;
        let replace = match self.max {
            None => true,
            Some(current) => {
                observation.count > current.count
                    || (observation.count == current.count
                        && observation.timestamp < current.timestamp)
            }
        };
        if replace {
            self.max = Some(*observation);
        }
    }

    fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }

    fn entry(&self, key: BucketKey) -> AggregateEntry {
        AggregateEntry {
            key,
            mean_count: self.mean(),
            sample_size: self.count,
        }
    }
}

fn fold<'a, K, I>(items: I) -> BTreeMap<K, Accumulator>
where
    K: Ord,
    I: IntoIterator<Item = (K, &'a Observation)>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for (key, observation) in items {
        groups.entry(key).or_default().add(observation);
    }
    groups
}

fn entries(groups: &BTreeMap<BucketKey, Accumulator>) -> Vec<AggregateEntry> {
    groups.iter().map(|(key, acc)| acc.entry(*key)).collect()
}

/// Computes the analysis views for a reference "now" and lookback window.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    bucketer: Bucketer,
    lookback: Duration,
}

impl Aggregator {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            bucketer: Bucketer::new(config),
            lookback: config.lookback,
        }
    }

    pub fn bucketer(&self) -> &Bucketer {
        &self.bucketer
    }

    fn in_lookback(&self, item: &BucketedObservation, now: DateTime<Utc>) -> bool {
        match now.checked_sub_signed(self.lookback) {
            Some(start) => item.observation.timestamp.with_timezone(&Utc) >= start,
            // Window reaches past the representable range.
            None => true,
        }
    }

    /// Today's readings and, per fine slot, the mean over the same weekday
    /// within the lookback window. Today's own samples count towards the
    /// typical mean.
    ///
    /// # Errors
    /// `AnalyticsError::InsufficientData` when there is no reading for
    /// today's date inside opening hours.
    pub fn today_vs_typical(
        &self,
        items: &[BucketedObservation],
        now: DateTime<Utc>,
    ) -> AnalyticsResult<TodayVsTypical> {
        let local_now = self.bucketer.localize(now);
        let weekday = self.bucketer.weekday(&local_now);
        let date = local_now.date_naive();

        let mut today: Vec<TodayReading> = items
            .iter()
            .filter(|item| item.in_opening_hours && item.date == date)
            .map(|item| TodayReading {
                slot: item.fine,
                count: item.observation.count,
            })
            .collect();

        if today.is_empty() {
            return Err(AnalyticsError::insufficient_data(
                "no readings yet today",
                ErrorContext::at(Stage::Aggregate).with_details(format!("date={}", date)),
            ));
        }
        today.sort_by_key(|reading| reading.slot);

        let typical = fold(
            items
                .iter()
                .filter(|item| item.in_opening_hours && item.weekday == weekday)
                .filter(|item| self.in_lookback(item, now))
                .map(|item| (item.fine_key(), &item.observation)),
        );

        Ok(TodayVsTypical {
            weekday,
            date,
            today,
            typical: entries(&typical),
        })
    }

    /// Mean per `(weekday, coarse slot)` and the peak observation per weekday,
    /// both restricted to the lookback window and opening hours.
    pub fn weekly_summary(&self, items: &[BucketedObservation], now: DateTime<Utc>) -> WeeklySummary {
        let windowed: Vec<&BucketedObservation> = items
            .iter()
            .filter(|item| self.in_lookback(item, now))
            .collect();

        let groups = fold(
            windowed
                .iter()
                .filter_map(|item| item.coarse_key().map(|key| (key, &item.observation))),
        );
        let per_day = fold(
            windowed
                .iter()
                .filter(|item| item.in_opening_hours)
                .map(|item| (item.weekday, &item.observation)),
        );

        let peaks = per_day
            .iter()
            .filter_map(|(weekday, acc)| {
                acc.max.map(|obs| PeakEntry {
                    weekday: *weekday,
                    timestamp: obs.timestamp,
                    count: obs.count,
                })
            })
            .collect();

        WeeklySummary {
            entries: entries(&groups),
            peaks,
        }
    }

    /// Mean per `(weekday, fine slot)` over the whole series, opening hours only.
    pub fn weekly_profile(&self, items: &[BucketedObservation]) -> WeeklyProfile {
        let groups = fold(
            items
                .iter()
                .filter(|item| item.in_opening_hours)
                .map(|item| (item.fine_key(), &item.observation)),
        );
        WeeklyProfile {
            entries: entries(&groups),
        }
    }

    /// Bucket the series once and compute every view.
    pub fn run(&self, series: &NormalizedSeries, now: DateTime<Utc>) -> Aggregation {
        let items = self.bucketer.bucket_series(series.observations());
        Aggregation {
            today: self.today_vs_typical(&items, now),
            summary: self.weekly_summary(&items, now),
            profile: self.weekly_profile(&items),
        }
    }
}
