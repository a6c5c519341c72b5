//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Internal server error
    Internal(String),
    /// Analysis engine error
    Analytics(AnalyticsError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Analytics(e) => {
                let details = e.context().map(|ctx| ctx.to_string());
                let (status, code) = match &e {
                    AnalyticsError::Data { .. } => (StatusCode::SERVICE_UNAVAILABLE, "NO_DATA"),
                    AnalyticsError::InsufficientData { .. } => {
                        (StatusCode::NOT_FOUND, "NO_READINGS_TODAY")
                    }
                    AnalyticsError::Configuration { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
                    }
                    AnalyticsError::Internal { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                let mut error = ApiError::new(code, e.reason());
                if let Some(details) = details {
                    error = error.with_details(details);
                }
                (status, error)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        AppError::Analytics(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorContext, Stage};

    #[test]
    fn test_status_mapping() {
        let data = AppError::from(AnalyticsError::data(
            "input series is empty",
            ErrorContext::at(Stage::Normalize).with_skipped(0),
        ));
        assert_eq!(data.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let today = AppError::from(AnalyticsError::insufficient_data(
            "no readings yet today",
            ErrorContext::at(Stage::Aggregate),
        ));
        assert_eq!(today.into_response().status(), StatusCode::NOT_FOUND);

        let config = AppError::from(AnalyticsError::configuration("bad zone"));
        assert_eq!(
            config.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_omits_empty_details() {
        let body = serde_json::to_value(ApiError::new("NO_DATA", "empty")).unwrap();
        assert!(body.get("details").is_none());
    }
}
