//! Chart rendering for herdbot: daily vaccination bars, rolling-average
//! line, and the days-remaining annotation.

pub mod chart;

pub use chart::{ChartConfig, ChartRenderer, DailyVaccinationChart};
