//! Application configuration structures

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Upstream dataset configuration
    #[validate]
    pub source: SourceSettings,

    /// Projection parameters
    #[validate]
    pub projection: ProjectionSettings,

    /// Chart rendering settings
    #[validate]
    pub chart: ChartSettings,

    /// Publisher configuration
    #[validate]
    pub twitter: TwitterSettings,

    /// Trigger server configuration
    #[validate]
    pub server: ServerSettings,

    /// Logging configuration
    #[validate]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            projection: ProjectionSettings::default(),
            chart: ChartSettings::default(),
            twitter: TwitterSettings::default(),
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Validate the entire configuration tree
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }

    /// Absolute cumulative count that counts as herd immunity, rounded up
    pub fn threshold(&self) -> u64 {
        (self.projection.threshold_fraction * self.projection.total_population as f64).ceil()
            as u64
    }
}

/// Upstream dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SourceSettings {
    /// URL of the CSV dataset with (date, cumulative) rows
    #[validate(url(message = "Source URL must be a valid URL"))]
    pub url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: "https://example.org/vaccinations.csv".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Projection parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Smoothing window length in days
    #[validate(range(min = 1, max = 60, message = "Window size must be between 1 and 60 days"))]
    pub window_size: usize,

    /// Target coverage fraction of the total population
    #[validate(range(
        min = 0.01,
        max = 1.0,
        message = "Threshold fraction must be between 0.01 and 1.0"
    ))]
    pub threshold_fraction: f64,

    /// Total population the coverage fraction applies to
    #[validate(range(min = 1, message = "Total population must be at least 1"))]
    pub total_population: u64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            window_size: 7,
            threshold_fraction: 0.7,
            total_population: 83_000_000,
        }
    }
}

/// Chart rendering settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartSettings {
    /// Chart width in pixels
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: u32,

    /// Chart height in pixels
    #[validate(range(
        min = 100,
        max = 4000,
        message = "Height must be between 100 and 4000 pixels"
    ))]
    pub height: u32,

    /// How many trailing days of bars to draw
    #[validate(range(min = 7, max = 120, message = "Display days must be between 7 and 120"))]
    pub display_days: usize,

    /// Where the rendered chart is written in run-once and dry-run modes
    #[validate(length(min = 1, message = "Output path cannot be empty"))]
    pub output_path: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            display_days: 30,
            output_path: "/tmp/daily_vacs.png".to_string(),
        }
    }
}

/// Publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TwitterSettings {
    /// Account access token; required when publishing is enabled
    pub access_token: String,

    /// Media upload endpoint
    #[validate(url(message = "Upload URL must be a valid URL"))]
    pub upload_url: String,

    /// Status update endpoint
    #[validate(url(message = "Post URL must be a valid URL"))]
    pub post_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Whether publishing is enabled at all
    pub enabled: bool,
}

impl Default for TwitterSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            upload_url: "https://upload.twitter.com/1.1/media/upload.json".to_string(),
            post_url: "https://api.twitter.com/2/tweets".to_string(),
            timeout_seconds: 30,
            enabled: true,
        }
    }
}

/// Trigger server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind the trigger server to
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// Port for the trigger server
    #[validate(range(min = 1, message = "Port must be nonzero"))]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(
        function = "crate::validation::validate_log_level",
        message = "Log level must be one of: trace, debug, info, warn, error"
    ))]
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,

    /// Whether to emit compact machine-friendly output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate_all().is_ok());
    }

    #[test]
    fn test_threshold_rounds_up() {
        let mut settings = Settings::default();
        settings.projection.total_population = 3;
        settings.projection.threshold_fraction = 0.5;
        assert_eq!(settings.threshold(), 2); // ceil(1.5)
    }

    #[test]
    fn test_default_threshold() {
        let settings = Settings::default();
        // 0.7 * 83 million
        assert_eq!(settings.threshold(), 58_100_000);
    }

    #[test]
    fn test_window_size_bounds() {
        let mut settings = Settings::default();
        settings.projection.window_size = 0;
        assert!(settings.validate_all().is_err());

        settings.projection.window_size = 61;
        assert!(settings.validate_all().is_err());

        settings.projection.window_size = 14;
        assert!(settings.validate_all().is_ok());
    }

    #[test]
    fn test_threshold_fraction_bounds() {
        let mut settings = Settings::default();
        settings.projection.threshold_fraction = 0.0;
        assert!(settings.validate_all().is_err());

        settings.projection.threshold_fraction = 1.5;
        assert!(settings.validate_all().is_err());

        settings.projection.threshold_fraction = 1.0;
        assert!(settings.validate_all().is_ok());
    }

    #[test]
    fn test_bad_source_url_rejected() {
        let mut settings = Settings::default();
        settings.source.url = "not a url".to_string();
        assert!(settings.validate_all().is_err());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(settings.validate_all().is_err());
    }
}
