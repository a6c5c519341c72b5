//! Dashboard pipeline and service facade.
//!
//! [`build_dashboard`] runs one full analysis pass over a record batch:
//! normalize, bucket, aggregate, assemble. [`DashboardService`] puts that pass
//! behind the result cache and the configured repository, and is the object
//! request handlers talk to.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::api::{DashboardMeta, DashboardPayload, TodayPanel, TodayVsTypicalView};
use crate::config::AnalyticsConfig;
use crate::db::{ObservationRepository, RecordBatch, RepositoryResult};
use crate::error::{AnalyticsError, AnalyticsResult, ErrorContext, Stage};
use crate::services::aggregator::Aggregator;
use crate::services::cache::ResultCache;
use crate::services::clock::Clock;
use crate::services::normalizer::normalize;
use crate::services::views;

/// Run one analysis pass over `batch` with `now` as the reference instant.
///
/// # Errors
/// `AnalyticsError::Data` when the batch holds no usable record. An empty
/// today series is not an error here: it is reported through
/// [`TodayPanel::NoReadingsToday`] so the weekly views are still produced.
pub fn build_dashboard(
    batch: &RecordBatch,
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> AnalyticsResult<DashboardPayload> {
    let series = normalize(&batch.records, config)?;

    let aggregator = Aggregator::new(config);
    let aggregation = aggregator.run(&series, now);
    let bucketer = aggregator.bucketer();
    let hours = config.opening_hours;

    let today_vs_typical = views::today_panel(&aggregation.today, hours)?;

    Ok(DashboardPayload {
        meta: DashboardMeta {
            computed_at: now,
            reference_now: bucketer.localize(now).fixed_offset(),
            timezone: config.timezone.name().to_string(),
            total_records: series.total_records,
            skipped_records: series.skipped_records(),
            duplicate_records: series.duplicates,
            malformed_lines: batch.malformed_lines,
            observations: series.len(),
            dataset_fingerprint: batch.fingerprint.clone(),
        },
        today_vs_typical,
        weekly_summary: views::weekly_summary_view(&aggregation.summary, bucketer),
        weekly_profile: views::weekly_profile_rows(&aggregation.profile, hours),
        history: views::history_points(series.observations()),
    })
}

/// Cached access to the dashboard views for one data source.
pub struct DashboardService {
    repository: Arc<dyn ObservationRepository>,
    config: AnalyticsConfig,
    clock: Arc<dyn Clock>,
    cache: ResultCache<DashboardPayload>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn ObservationRepository>,
        config: AnalyticsConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = ResultCache::new(Arc::clone(&clock), config.cache_ttl);
        Self {
            repository,
            config,
            clock,
            cache,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn describe(&self) -> String {
        self.repository.describe()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The full payload, served from cache while fresh.
    pub async fn dashboard(&self) -> AnalyticsResult<Arc<DashboardPayload>> {
        self.cache.get_or_compute(|now| self.recompute(now)).await
    }

    /// The today-vs-typical view alone.
    ///
    /// # Errors
    /// `AnalyticsError::InsufficientData` when there are no readings today.
    pub async fn today_vs_typical(&self) -> AnalyticsResult<TodayVsTypicalView> {
        let payload = self.dashboard().await?;
        match &payload.today_vs_typical {
            TodayPanel::Ready(view) => Ok(view.clone()),
            TodayPanel::NoReadingsToday { reason } => Err(AnalyticsError::insufficient_data(
                reason.clone(),
                ErrorContext::at(Stage::Assemble),
            )),
        }
    }

    pub async fn health(&self) -> RepositoryResult<bool> {
        self.repository.health_check().await
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.cache.computed_at()
    }

    async fn recompute(&self, now: DateTime<Utc>) -> AnalyticsResult<DashboardPayload> {
        let started = Instant::now();
        let batch = self.repository.fetch_records().await.map_err(|e| {
            warn!("Failed to read {}: {}", self.repository.describe(), e);
            AnalyticsError::from(e)
        })?;

        let config = self.config.clone();
        let payload = tokio::task::spawn_blocking(move || build_dashboard(&batch, now, &config))
            .await
            .map_err(|e| {
                AnalyticsError::internal(
                    format!("analysis task failed: {}", e),
                    ErrorContext::at(Stage::Aggregate),
                )
            })??;

        info!(
            "Recomputed dashboard from {} records ({} skipped, {} observations) in {:?}",
            payload.meta.total_records,
            payload.meta.skipped_records,
            payload.meta.observations,
            started.elapsed()
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use chrono::TimeZone;

    fn batch(records: Vec<RawRecord>) -> RecordBatch {
        RecordBatch {
            records,
            fingerprint: "abc".to_string(),
            malformed_lines: 0,
        }
    }

    #[test]
    fn test_build_dashboard_meta() {
        let now = Utc.with_ymd_and_hms(2025, 10, 13, 8, 20, 0).unwrap();
        let payload = build_dashboard(
            &batch(vec![
                RawRecord::new("2025-10-13T10:05:00+02:00", 10),
                RawRecord::new("2025-10-13T10:07:00+02:00", 11),
                RawRecord::new("bad", 1),
            ]),
            now,
            &AnalyticsConfig::default(),
        )
        .unwrap();

        assert_eq!(payload.meta.computed_at, now);
        assert_eq!(payload.meta.reference_now.to_rfc3339(), "2025-10-13T10:20:00+02:00");
        assert_eq!(payload.meta.timezone, "Europe/Zurich");
        assert_eq!(payload.meta.total_records, 3);
        assert_eq!(payload.meta.skipped_records, 1);
        assert_eq!(payload.meta.duplicate_records, 1);
        assert_eq!(payload.meta.observations, 1);
        assert_eq!(payload.meta.dataset_fingerprint, "abc");
        assert_eq!(payload.history.len(), 1);
        assert_eq!(payload.history[0].count, 11);
    }

    #[test]
    fn test_build_dashboard_empty_batch_is_data_error() {
        let now = Utc.with_ymd_and_hms(2025, 10, 13, 8, 20, 0).unwrap();
        let err = build_dashboard(&batch(vec![]), now, &AnalyticsConfig::default()).unwrap_err();
        assert!(err.is_data());
    }
}
