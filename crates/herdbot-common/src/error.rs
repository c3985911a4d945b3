//! Error types and utilities for herdbot

use thiserror::Error;

/// Result type alias for herdbot operations
pub type Result<T> = std::result::Result<T, HerdBotError>;

/// Main error type for herdbot operations
#[derive(Error, Debug)]
pub enum HerdBotError {
    /// The upstream dataset could not be reached (network/transport failure)
    #[error("Source unavailable: {message}")]
    Source {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream payload could not be parsed into (date, count) records
    #[error("Source format error: {message}")]
    SourceFormat {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The series is too short to compute a rolling average
    #[error("Insufficient history: have {have} observations, need at least {need}")]
    InsufficientHistory { have: usize, need: usize },

    /// The smoothed rate is zero or negative, so no completion date exists
    #[error("No progress: cannot project with smoothed rate {rate}")]
    NoProgress { rate: f64 },

    /// Chart rendering failed
    #[error("Render error: {message}")]
    Render {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Posting to the social-media account failed
    #[error("Publish error: {message}")]
    Publish {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for configuration values or ingested data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HerdBotError {
    /// Create a new source-unavailable error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new source-unavailable error with an HTTP status code
    pub fn source_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Source {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new source-unavailable error with a source
    pub fn source_with_cause(
        msg: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Source {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(cause)),
        }
    }

    /// Create a new source-format error
    pub fn source_format(msg: impl Into<String>) -> Self {
        Self::SourceFormat {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new source-format error with a source
    pub fn source_format_with_cause(
        msg: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SourceFormat {
            message: msg.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a new insufficient-history error
    pub fn insufficient_history(have: usize, need: usize) -> Self {
        Self::InsufficientHistory { have, need }
    }

    /// Create a new no-progress error
    pub fn no_progress(rate: f64) -> Self {
        Self::NoProgress { rate }
    }

    /// Create a new render error
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new render error with a source
    pub fn render_with_cause(
        msg: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Render {
            message: msg.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a new publish error
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new publish error with an HTTP status code
    pub fn publish_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Publish {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new publish error with a source
    pub fn publish_with_cause(
        msg: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Publish {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(cause)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with a source
    pub fn config_with_cause(
        msg: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error is fatal for the run. Every variant aborts the
    /// pipeline; the distinction exists for the trigger boundary, which maps
    /// upstream trouble to 502 and everything else to 500.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Source { .. } | Self::SourceFormat { .. })
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error, classifying timeouts and connection failures
impl From<reqwest::Error> for HerdBotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::source_with_cause("Request timeout", err)
        } else if err.is_connect() {
            Self::source_with_cause("Connection failed", err)
        } else if err.is_status() {
            let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::Source {
                message: format!("HTTP error: {}", status),
                status_code: Some(status),
                source: Some(Box::new(err)),
            }
        } else {
            Self::source_with_cause("Network request failed", err)
        }
    }
}

/// Convert from csv::Error to a source-format error
impl From<csv::Error> for HerdBotError {
    fn from(err: csv::Error) -> Self {
        Self::source_format_with_cause("CSV parsing error", err)
    }
}

/// Convert from config::ConfigError to HerdBotError
impl From<config::ConfigError> for HerdBotError {
    fn from(err: config::ConfigError) -> Self {
        Self::config_with_cause("Configuration loading error", err)
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to HerdBotError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for HerdBotError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::render_with_cause("Chart rendering failed", err)
    }
}
