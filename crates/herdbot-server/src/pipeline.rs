//! The linear run pipeline: fetch, smooth, project, render, publish.
//!
//! Ordering is strict and any stage error aborts the run before the next
//! stage starts, so a chart is never posted without a projection and a
//! caption is never posted without its image. Nothing is retried here; the
//! external scheduler triggers the next attempt.

use chrono::NaiveDate;
use herdbot_common::Result;
use herdbot_config::Settings;
use herdbot_core::{
    compose_caption, coverage_percent, project, smooth, NegativeDeltaAnomaly, ObservationSeries,
    Projection,
};
use herdbot_data::{DataSourceConfig, VaccinationDataSource};
use herdbot_graphs::{ChartConfig, ChartRenderer, DailyVaccinationChart};
use herdbot_publish::StatusPublisher;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Latest date the upstream had data for
    pub data_as_of: NaiveDate,
    /// Current coverage as a whole percentage of the total population
    pub coverage_percent: u8,
    /// The computed projection
    pub projection: Projection,
    /// Upstream data corrections encountered while smoothing
    pub anomalies: Vec<NegativeDeltaAnomaly>,
    /// The caption that was (or would have been) posted
    pub caption: String,
    /// Whether the post actually went out
    pub published: bool,
}

/// One-shot run pipeline. Holds only configuration and clients; every run
/// rebuilds the series from the source.
pub struct Pipeline {
    settings: Settings,
    source: VaccinationDataSource,
    publisher: Arc<dyn StatusPublisher>,
    /// Set when the rendered chart should also land on disk (run-once and
    /// dry-run modes)
    chart_output: Option<PathBuf>,
    publishing_enabled: bool,
}

impl Pipeline {
    pub fn new(settings: Settings, publisher: Arc<dyn StatusPublisher>) -> Result<Self> {
        let source = VaccinationDataSource::new(
            DataSourceConfig::new(settings.source.url.clone())
                .with_timeout(settings.source.timeout_seconds),
        )?;
        let publishing_enabled = settings.twitter.enabled;

        Ok(Self {
            settings,
            source,
            publisher,
            chart_output: None,
            publishing_enabled,
        })
    }

    /// Also write the rendered chart to the given path on every run
    pub fn with_chart_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_output = Some(path.into());
        self
    }

    /// Disable the publish stage (dry run); the rest of the pipeline runs
    /// unchanged.
    pub fn without_publishing(mut self) -> Self {
        self.publishing_enabled = false;
        self
    }

    /// Execute one full run.
    #[instrument(skip(self), fields(today = %today))]
    pub async fn run(&self, today: NaiveDate) -> Result<RunSummary> {
        let series = self.source.fetch_series().await?;
        self.process(&series, today).await
    }

    /// Everything after the fetch, split out so tests can drive the pipeline
    /// with a synthetic series.
    pub async fn process(&self, series: &ObservationSeries, today: NaiveDate) -> Result<RunSummary> {
        let smoothed = smooth(series, self.settings.projection.window_size)?;
        let latest = series.latest();

        let projection = project(
            latest.cumulative,
            smoothed.latest_rate(),
            self.settings.threshold(),
            today,
        )?;
        info!(
            days_remaining = projection.days_remaining,
            projected_date = %projection.projected_date,
            "Projection computed"
        );

        let chart = DailyVaccinationChart::new(
            series,
            &smoothed,
            &projection,
            ChartConfig {
                width: self.settings.chart.width,
                height: self.settings.chart.height,
                display_days: self.settings.chart.display_days,
            },
        );
        let png = chart.render_to_bytes().await?;

        if let Some(path) = &self.chart_output {
            std::fs::write(path, &png)?;
            info!(path = %path.display(), "Chart written to disk");
        }

        let coverage = coverage_percent(
            latest.cumulative,
            self.settings.projection.total_population,
        );
        let caption = compose_caption(
            &projection,
            self.settings.threshold(),
            self.settings.projection.threshold_fraction,
            coverage,
        );

        let published = if self.publishing_enabled {
            self.publisher.publish(&caption, &png).await?;
            true
        } else {
            info!("Publishing disabled, run stops after rendering");
            false
        };

        Ok(RunSummary {
            data_as_of: latest.date,
            coverage_percent: coverage,
            projection,
            anomalies: smoothed.anomalies,
            caption,
            published,
        })
    }
}
