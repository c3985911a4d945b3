//! Status text composition for the published post

use chrono::{Datelike, NaiveDate};

use crate::types::Projection;

/// Human-friendly "part of the month" label for a date, e.g.
/// "mid-August 2026". Days 1-10 are "early", 11-20 "mid-", the rest "late".
pub fn month_segment(date: NaiveDate) -> String {
    let segment = match date.day() {
        1..=10 => "early ",
        11..=20 => "mid-",
        _ => "late ",
    };
    format!("{}{}", segment, date.format("%B %Y"))
}

/// Current coverage as a whole percentage of the total population, floored
/// and clamped to 100.
pub fn coverage_percent(latest_cumulative: u64, total_population: u64) -> u8 {
    if total_population == 0 {
        return 0;
    }
    let pct = latest_cumulative.saturating_mul(100) / total_population;
    pct.min(100) as u8
}

/// Compose the status caption for a projection.
///
/// `threshold_fraction` is the configured coverage target (0.7 = 70%) and is
/// only used for display; the projection itself already encodes the absolute
/// threshold.
pub fn compose_caption(
    projection: &Projection,
    threshold: u64,
    threshold_fraction: f64,
    coverage: u8,
) -> String {
    let threshold_millions = threshold as f64 / 1_000_000.0;
    let target_percent = (threshold_fraction * 100.0).round() as u32;

    if projection.days_remaining == 0 {
        return format!(
            "Vaccination projection:\n\
             Herd immunity threshold of {:.1} Mio. ({}% of total) reached.\n\
             Current coverage: {}%",
            threshold_millions, target_percent, coverage
        );
    }

    format!(
        "Vaccination projection:\n\
         Required population for herd immunity (HI): {:.1} Mio. ({}% of total)\n\
         Current daily immunizing vaccinations: {}\n\
         Current coverage: {}%\n\
         Remaining time at current speed: {} days ({})",
        threshold_millions,
        target_percent,
        projection.smoothed_rate.round() as u64,
        coverage,
        projection.days_remaining,
        month_segment(projection.projected_date)
    )
}
