//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! dashboard service. Every view is cut from the same cached payload.

use std::sync::Arc;

use axum::{extract::State, Json};

use super::dto::{
    DashboardPayload, HealthResponse, HistoryPoint, ProfileRow, TodayVsTypicalView,
    WeeklySummaryView,
};
use super::error::AppError;
use super::state::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the attendance
/// log is readable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let data_source = match state.service.health().await {
        Ok(true) => "available".to_string(),
        Ok(false) => "unavailable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        data_source,
        source: state.service.describe(),
        computed_at: state.service.computed_at(),
    }))
}

// =============================================================================
// Dashboard views
// =============================================================================

/// GET /v1/dashboard
///
/// Every view plus pass metadata.
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> HandlerResult<Arc<DashboardPayload>> {
    let payload = state.service.dashboard().await?;
    Ok(Json(payload))
}

/// GET /v1/today-vs-typical
///
/// Responds 404 `NO_READINGS_TODAY` when nothing has been recorded today.
pub async fn get_today_vs_typical(
    State(state): State<AppState>,
) -> HandlerResult<TodayVsTypicalView> {
    let view = state.service.today_vs_typical().await?;
    Ok(Json(view))
}

/// GET /v1/weekly-summary
pub async fn get_weekly_summary(State(state): State<AppState>) -> HandlerResult<WeeklySummaryView> {
    let payload = state.service.dashboard().await?;
    Ok(Json(payload.weekly_summary.clone()))
}

/// GET /v1/weekly-profile
pub async fn get_weekly_profile(State(state): State<AppState>) -> HandlerResult<Vec<ProfileRow>> {
    let payload = state.service.dashboard().await?;
    Ok(Json(payload.weekly_profile.clone()))
}

/// GET /v1/history
///
/// All-time series, not restricted to opening hours or the lookback window.
pub async fn get_history(State(state): State<AppState>) -> HandlerResult<Vec<HistoryPoint>> {
    let payload = state.service.dashboard().await?;
    Ok(Json(payload.history.clone()))
}
