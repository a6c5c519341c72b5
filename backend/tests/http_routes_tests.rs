//! Functional tests for the HTTP routes, driven through the router with
//! `tower::ServiceExt::oneshot`.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use gym_attendance::config::AnalyticsConfig;
use gym_attendance::db::LocalRepository;
use gym_attendance::http::{create_router, AppState};
use gym_attendance::models::RawRecord;
use gym_attendance::services::{DashboardService, ManualClock};

fn app(repo: LocalRepository) -> Router {
    // Monday 2025-10-13 10:30 in Zurich.
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 10, 13, 8, 30, 0).unwrap(),
    ));
    let service = DashboardService::new(Arc::new(repo), AnalyticsConfig::default(), clock);
    create_router(AppState::new(Arc::new(service)))
}

fn sample_repo() -> LocalRepository {
    LocalRepository::with_records(vec![
        RawRecord::new("2025-10-13T10:05:00+02:00", 10),
        RawRecord::new("2025-10-13T10:15:00+02:00", 12),
        RawRecord::new("2025-10-06T10:10:00+02:00", 8),
        RawRecord::new("2025-10-07T18:00:00+02:00", 100),
        RawRecord::new("2025-10-07T23:00:00+02:00", 3),
    ])
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(sample_repo()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data_source"], "available");
    assert!(body["source"].as_str().unwrap().starts_with("memory"));
}

#[tokio::test]
async fn test_health_reports_unavailable_source() {
    let repo = sample_repo();
    repo.set_available(false);
    let (status, body) = get(app(repo), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "unavailable");
}

#[tokio::test]
async fn test_dashboard_payload() {
    let (status, body) = get(app(sample_repo()), "/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["timezone"], "Europe/Zurich");
    assert_eq!(body["meta"]["observations"], 5);
    assert_eq!(body["today_vs_typical"]["status"], "ready");
    assert_eq!(body["today_vs_typical"]["today"][0]["time"], "10:00");
    assert_eq!(body["history"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_dashboard_serves_cached_payload_as_is() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 10, 13, 8, 30, 0).unwrap(),
    ));
    let service = Arc::new(DashboardService::new(
        Arc::new(sample_repo()),
        AnalyticsConfig::default(),
        clock,
    ));
    let router = create_router(AppState::new(Arc::clone(&service)));

    let (status, body) = get(router.clone(), "/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    let cached = service.dashboard().await.unwrap();
    assert_eq!(body, serde_json::to_value(cached.as_ref()).unwrap());

    let (_, again) = get(router, "/v1/dashboard").await;
    assert_eq!(again, body);
}

#[tokio::test]
async fn test_today_vs_typical_endpoint() {
    let (status, body) = get(app(sample_repo()), "/v1/today-vs-typical").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weekday"], "Monday");
    assert_eq!(body["today"][1]["count"], 12);
    assert_eq!(body["typical"][1]["time"], "10:10");
    assert_eq!(body["typical"][1]["count"], 10.0);
}

#[tokio::test]
async fn test_today_vs_typical_without_readings_is_404() {
    let repo = LocalRepository::with_records(vec![RawRecord::new(
        "2025-10-12T10:00:00+02:00",
        4,
    )]);
    let router = app(repo);

    let (status, body) = get(router.clone(), "/v1/today-vs-typical").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NO_READINGS_TODAY");

    let (status, body) = get(router, "/v1/weekly-profile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["weekday"], "Sunday");
}

#[tokio::test]
async fn test_weekly_summary_endpoint() {
    let (status, body) = get(app(sample_repo()), "/v1/weekly-summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"][0], "06:00");

    let peaks = body["peaks"].as_array().unwrap();
    let tuesday = peaks.iter().find(|p| p["weekday"] == "Tuesday").unwrap();
    assert_eq!(tuesday["peak_count"], 100);
    assert_eq!(tuesday["peak_time"], "2025-10-07T18:00:00+02:00");

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows[0]["weekday"], "Monday");
    assert_eq!(rows[1]["peak_time"], "18:00");
}

#[tokio::test]
async fn test_weekly_profile_is_ordered() {
    let (status, body) = get(app(sample_repo()), "/v1/weekly-profile").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    let days: Vec<&str> = rows.iter().map(|r| r["weekday"].as_str().unwrap()).collect();
    assert_eq!(days, vec!["Monday", "Monday", "Tuesday"]);
    assert_eq!(rows[0]["time"], "10:00");
    assert_eq!(rows[1]["visitors"], 10.0);
}

#[tokio::test]
async fn test_empty_source_is_503() {
    let (status, body) = get(app(LocalRepository::new()), "/v1/dashboard").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "NO_DATA");
    assert!(body["details"].as_str().unwrap().contains("stage=normalize"));
}

#[tokio::test]
async fn test_history_is_unfiltered() {
    let (status, body) = get(app(sample_repo()), "/v1/history").await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[4]["timestamp"], "2025-10-13T10:10:00+02:00");
    // Closed-hours reading stays in the all-time series.
    assert_eq!(points[2]["timestamp"], "2025-10-07T23:00:00+02:00");
    assert_eq!(points[2]["count"], 3);
}
