//! Error types for repository operations.
//!
//! Repository errors describe why the attendance log could not be acquired.
//! The engine never retries; it converts them into a `DataError` at the fetch
//! stage and leaves retry policy to the caller.

use std::fmt;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Structured context for repository errors.
#[derive(Debug, Clone, Default)]
pub struct RepositoryContext {
    /// The operation being performed (e.g., "fetch_records")
    pub operation: Option<String>,
    /// The data source involved (file path, bucket object, "memory")
    pub source: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether a later attempt may succeed
    pub retryable: bool,
}

impl RepositoryContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for RepositoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref source) = self.source {
            parts.push(format!("source={}", source));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The configured log does not exist.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: RepositoryContext,
    },

    /// Reading the log failed.
    #[error("I/O error: {message} {context}")]
    Io {
        message: String,
        context: RepositoryContext,
    },

    /// The upstream store is unreachable. Typically transient.
    #[error("Connection error: {message} {context}")]
    Connection {
        message: String,
        context: RepositoryContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: RepositoryContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    Internal {
        message: String,
        context: RepositoryContext,
    },
}

impl RepositoryError {
    pub fn not_found_with_context(message: impl Into<String>, context: RepositoryContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn io_with_context(message: impl Into<String>, context: RepositoryContext) -> Self {
        Self::Io {
            message: message.into(),
            context,
        }
    }

    /// Create a connection error. Connection errors are always retryable.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: RepositoryContext::default().retryable(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: RepositoryContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: RepositoryContext::default(),
        }
    }

    pub fn context(&self) -> &RepositoryContext {
        match self {
            Self::NotFound { context, .. }
            | Self::Io { context, .. }
            | Self::Connection { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }
}
