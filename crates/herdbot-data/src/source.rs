//! HTTP client for the cumulative vaccination dataset
//!
//! Fetches a CSV of (date, cumulative count) rows from a fixed URL, cleans
//! the trailing not-yet-reported rows the upstream tends to publish, and
//! validates the result into an `ObservationSeries`. One fetch per run, no
//! retries: if the source is down the run fails and the next scheduled
//! trigger tries again.

use chrono::NaiveDate;
use herdbot_common::{HerdBotError, Result};
use herdbot_core::{Observation, ObservationSeries};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the dataset client
#[derive(Debug, Clone)]
pub struct DataSourceConfig {
    /// URL of the CSV dataset
    pub url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl DataSourceConfig {
    /// Create a new configuration for the given dataset URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 30,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// One row of the upstream CSV. The count column is optional because the
/// upstream publishes placeholder rows for days it has not reported yet.
#[derive(Debug, Deserialize)]
struct RawRecord {
    date: NaiveDate,
    cumulative: Option<u64>,
}

/// Client for the upstream vaccination dataset
#[derive(Debug, Clone)]
pub struct VaccinationDataSource {
    client: Client,
    config: DataSourceConfig,
}

impl VaccinationDataSource {
    /// Create a new data source with the given configuration
    pub fn new(config: DataSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HerdBotError::source_with_cause("Failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// Fetch and validate the full available history.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn fetch_series(&self) -> Result<ObservationSeries> {
        info!("Fetching vaccination dataset");

        let response = self.client.get(&self.config.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HerdBotError::source_with_status(
                format!("dataset endpoint returned {}", status),
                status.as_u16(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HerdBotError::source_with_cause("Failed to read response body", e))?;

        let series = parse_series(&body)?;
        info!(
            rows = series.len(),
            latest = %series.latest().date,
            "Dataset fetched and validated"
        );
        Ok(series)
    }
}

/// Parse a CSV body into a validated observation series.
///
/// Trailing rows without a count are dropped (the upstream is usually a few
/// days behind); a missing count in the middle of the history means the
/// payload is malformed.
pub fn parse_series(body: &str) -> Result<ObservationSeries> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());

    let mut rows: Vec<(NaiveDate, Option<u64>)> = Vec::new();
    for record in reader.deserialize::<RawRecord>() {
        let record = record?;
        rows.push((record.date, record.cumulative));
    }

    if rows.is_empty() {
        return Err(HerdBotError::source_format("dataset contains no rows"));
    }

    // Drop not-yet-reported trailing days.
    let trailing_empty = rows.iter().rev().take_while(|(_, c)| c.is_none()).count();
    if trailing_empty > 0 {
        debug!(rows = trailing_empty, "Dropping trailing rows without counts");
        rows.truncate(rows.len() - trailing_empty);
    }

    let observations = rows
        .into_iter()
        .map(|(date, cumulative)| match cumulative {
            Some(count) => Ok(Observation::new(date, count)),
            None => Err(HerdBotError::source_format(format!(
                "missing cumulative count for {}",
                date
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    ObservationSeries::new(observations)
}
