//! herdbot - days-to-herd-immunity bot entry point

use anyhow::Result;
use clap::Parser;
use herdbot_common::{init_logging, HerdBotError, LoggingConfig};
use herdbot_config::{ConfigLoader, Settings};
use herdbot_publish::{NullPublisher, PublisherConfig, StatusPublisher, TwitterPublisher};
use herdbot_server::{build_router, Pipeline};
use std::sync::Arc;
use tracing::{error, info};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Log level override (e.g. "debug")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Execute a single run and exit instead of serving the HTTP trigger
    #[arg(long)]
    run_once: bool,

    /// Run the pipeline but skip publishing; the chart is written to the
    /// configured output path
    #[arg(long)]
    dry_run: bool,
}

/// Build the publisher according to configuration and CLI flags.
fn build_publisher(settings: &Settings, dry_run: bool) -> Result<Arc<dyn StatusPublisher>> {
    if dry_run || !settings.twitter.enabled {
        return Ok(Arc::new(NullPublisher::new()));
    }

    let config = PublisherConfig::new(settings.twitter.access_token.clone())
        .with_upload_url(settings.twitter.upload_url.clone())
        .with_post_url(settings.twitter.post_url.clone())
        .with_timeout(settings.twitter.timeout_seconds);
    let publisher = TwitterPublisher::new(config)?;
    Ok(Arc::new(publisher))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let settings = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    // Initialize logging; CLI level wins over the config file
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.logging.level.clone());
    init_logging(LoggingConfig {
        level,
        json_format: settings.logging.json,
        file_path: settings.logging.file.clone(),
        include_spans: false,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting herdbot");

    if settings.twitter.enabled && !args.dry_run && settings.twitter.access_token.is_empty() {
        return Err(HerdBotError::config(
            "publishing is enabled but twitter.access_token is not set",
        )
        .into());
    }

    let publisher = build_publisher(&settings, args.dry_run)?;
    let mut pipeline = Pipeline::new(settings.clone(), publisher)?;
    if args.dry_run {
        pipeline = pipeline.without_publishing();
    }
    if args.run_once || args.dry_run {
        pipeline = pipeline.with_chart_output(&settings.chart.output_path);
    }

    if args.run_once || args.dry_run {
        let today = chrono::Utc::now().date_naive();
        match pipeline.run(today).await {
            Ok(summary) => {
                info!(
                    days_remaining = summary.projection.days_remaining,
                    projected_date = %summary.projection.projected_date,
                    published = summary.published,
                    "Run completed"
                );
                println!("{}", summary.caption);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Run failed");
                Err(err.into())
            }
        }
    } else {
        let addr = format!("{}:{}", settings.server.bind_address, settings.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %addr, "Trigger server listening");

        let router = build_router(Arc::new(pipeline));
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("herdbot has shut down");
        Ok(())
    }
}

/// Resolve when the process receives ctrl-c
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {:?}", e);
        return;
    }
    info!("Received shutdown signal, starting graceful shutdown");
}
