//! Pipeline orchestration and the HTTP run trigger for herdbot.

pub mod pipeline;
pub mod routes;

pub use pipeline::{Pipeline, RunSummary};
pub use routes::build_router;
