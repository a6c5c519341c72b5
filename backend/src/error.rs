//! Error types for the analysis pass.
//!
//! Every failure carries an [`ErrorContext`] naming the stage that failed and,
//! where relevant, how many input records were skipped before it did.

use std::fmt;

use crate::db::RepositoryError;

/// Result type for engine operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Normalize,
    Aggregate,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Normalize => "normalize",
            Stage::Aggregate => "aggregate",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Structured context attached to engine errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub stage: Option<Stage>,
    pub skipped_records: Option<usize>,
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn at(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Default::default()
        }
    }

    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped_records = Some(skipped);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(stage) = self.stage {
            parts.push(format!("stage={}", stage));
        }
        if let Some(skipped) = self.skipped_records {
            parts.push(format!("skipped={}", skipped));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for the attendance analysis engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyticsError {
    /// Input is empty or nothing survived validation. Nothing is cached.
    #[error("No data: {reason} {context}")]
    Data { reason: String, context: ErrorContext },

    /// The series is valid but holds no samples for the current day.
    #[error("Insufficient data: {reason} {context}")]
    InsufficientData { reason: String, context: ErrorContext },

    /// Invalid engine settings.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    Internal { message: String, context: ErrorContext },
}

impl AnalyticsError {
    pub fn data(reason: impl Into<String>, context: ErrorContext) -> Self {
        Self::Data {
            reason: reason.into(),
            context,
        }
    }

    pub fn insufficient_data(reason: impl Into<String>, context: ErrorContext) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Internal {
            message: message.into(),
            context,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    /// The reason or message without the context suffix.
    pub fn reason(&self) -> &str {
        match self {
            Self::Data { reason, .. } | Self::InsufficientData { reason, .. } => reason,
            Self::Configuration { message } | Self::Internal { message, .. } => message,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Data { context, .. }
            | Self::InsufficientData { context, .. }
            | Self::Internal { context, .. } => Some(context),
            Self::Configuration { .. } => None,
        }
    }
}

impl From<RepositoryError> for AnalyticsError {
    fn from(err: RepositoryError) -> Self {
        AnalyticsError::data(
            "failed to acquire attendance records",
            ErrorContext::at(Stage::Fetch).with_details(err.to_string()),
        )
    }
}
