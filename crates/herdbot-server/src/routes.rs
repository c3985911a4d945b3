//! HTTP trigger for the run pipeline
//!
//! The trigger carries no parameters: `POST /run` executes one pipeline run
//! and reports success or failure. Errors surface as a human-readable
//! message only; internals stay in the logs.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::pipeline::{Pipeline, RunSummary};

/// Shared state for the trigger server
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Response body for a failed run
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

/// Build the trigger router
pub fn build_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/run", post(trigger_run))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}

/// Liveness probe
async fn health() -> &'static str {
    "ok"
}

/// Execute one pipeline run
async fn trigger_run(
    State(state): State<AppState>,
) -> Result<Json<RunSummary>, (StatusCode, Json<ErrorResponse>)> {
    let today = Utc::now().date_naive();
    match state.pipeline.run(today).await {
        Ok(summary) => {
            info!(
                days_remaining = summary.projection.days_remaining,
                published = summary.published,
                "Run completed"
            );
            Ok(Json(summary))
        }
        Err(err) => {
            error!(error = %err, "Run failed");
            let status = if err.is_upstream() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err((
                status,
                Json(ErrorResponse {
                    status: "error",
                    message: err.to_string(),
                }),
            ))
        }
    }
}
