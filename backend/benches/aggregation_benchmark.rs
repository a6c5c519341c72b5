use std::hint::black_box;

use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Europe::Zurich;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gym_attendance::config::AnalyticsConfig;
use gym_attendance::db::{parse_json_lines, RecordBatch};
use gym_attendance::models::RawRecord;
use gym_attendance::services::{build_dashboard, normalize, Aggregator};

/// One reading every 10 minutes, with a little jitter, for `weeks` weeks.
fn synthetic_records(weeks: i64) -> Vec<RawRecord> {
    let start = Zurich.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
    let samples = weeks * 7 * 24 * 6;
    (0..samples)
        .map(|i| {
            let ts = start + Duration::minutes(i * 10) + Duration::seconds(i % 37);
            let count = (i * 7919) % 180;
            RawRecord::new(ts.to_rfc3339(), count).with_status("ok")
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let config = AnalyticsConfig::default();

    for weeks in [1i64, 4, 12] {
        let records = synthetic_records(weeks);
        group.bench_with_input(BenchmarkId::new("weeks", weeks), &records, |b, input| {
            b.iter(|| normalize(black_box(input), &config));
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let config = AnalyticsConfig::default();
    let now = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();

    for weeks in [4i64, 12] {
        let series = match normalize(&synthetic_records(weeks), &config) {
            Ok(series) => series,
            Err(e) => panic!("synthetic series failed to normalize: {}", e),
        };
        let aggregator = Aggregator::new(&config);
        group.bench_with_input(BenchmarkId::new("weeks", weeks), &series, |b, input| {
            b.iter(|| aggregator.run(black_box(input), now));
        });
    }

    group.finish();
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");
    let config = AnalyticsConfig::default();
    let now = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();

    let content: String = synthetic_records(12)
        .iter()
        .filter_map(|r| serde_json::to_string(r).ok())
        .collect::<Vec<_>>()
        .join("\n");

    group.bench_function("parse_and_build_12_weeks", |b| {
        b.iter(|| {
            let (records, malformed_lines) = parse_json_lines(black_box(&content));
            let batch = RecordBatch {
                records,
                fingerprint: String::new(),
                malformed_lines,
            };
            black_box(build_dashboard(&batch, now, &config))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_aggregate, bench_full_pass);
criterion_main!(benches);
