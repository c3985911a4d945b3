//! Estimation core for herdbot: observation series, rolling-average
//! smoothing, and the days-to-threshold projection.
//!
//! Everything in this crate is a pure transformation of its inputs; all I/O
//! lives in the surrounding crates.

pub mod caption;
pub mod projector;
pub mod smoother;
pub mod types;

pub use caption::{compose_caption, coverage_percent, month_segment};
pub use projector::project;
pub use smoother::smooth;
pub use types::{
    DailyDelta, NegativeDeltaAnomaly, Observation, ObservationSeries, Projection, SmoothedPoint,
    SmoothedSeries,
};
