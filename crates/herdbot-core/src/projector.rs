//! Days-to-threshold projection from the current smoothed rate

use chrono::{Days, NaiveDate};
use herdbot_common::{HerdBotError, Result};

use crate::types::Projection;

/// Project the date at which the cumulative count crosses `threshold`.
///
/// `days_remaining = ceil(remaining / smoothed_rate)` as a whole number of
/// days; fractional days never reach the caller. When the threshold is
/// already reached the projection is zero days with `projected_date = today`.
/// A zero or negative (or non-finite) rate with work remaining fails with
/// `NoProgress` rather than producing an unbounded date.
pub fn project(
    latest_cumulative: u64,
    smoothed_rate: f64,
    threshold: u64,
    today: NaiveDate,
) -> Result<Projection> {
    let remaining = threshold.saturating_sub(latest_cumulative);

    if remaining == 0 {
        return Ok(Projection {
            remaining: 0,
            smoothed_rate,
            days_remaining: 0,
            projected_date: today,
        });
    }

    // NaN fails this comparison too, which is the point.
    if !(smoothed_rate > 0.0) || !smoothed_rate.is_finite() {
        return Err(HerdBotError::no_progress(smoothed_rate));
    }

    let days = (remaining as f64 / smoothed_rate).ceil();
    if days > u32::MAX as f64 {
        return Err(HerdBotError::validation_field(
            "projected days remaining exceeds representable range",
            "days_remaining",
        ));
    }
    let days_remaining = days as u32;

    let projected_date = today
        .checked_add_days(Days::new(days_remaining as u64))
        .ok_or_else(|| {
            HerdBotError::validation_field(
                "projected date exceeds calendar range",
                "projected_date",
            )
        })?;

    Ok(Projection {
        remaining,
        smoothed_rate,
        days_remaining,
        projected_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 4, 1).unwrap()
    }

    #[test]
    fn test_basic_projection() {
        // remaining 100_000 at 10_000/day -> 10 days
        let p = project(900_000, 10_000.0, 1_000_000, today()).unwrap();
        assert_eq!(p.remaining, 100_000);
        assert_eq!(p.days_remaining, 10);
        assert_eq!(p.smoothed_rate, 10_000.0);
        assert_eq!(p.projected_date, NaiveDate::from_ymd_opt(2021, 4, 11).unwrap());
    }

    #[test]
    fn test_fractional_days_round_up() {
        // 100 remaining at 40/day -> ceil(2.5) = 3 days
        let p = project(900, 40.0, 1_000, today()).unwrap();
        assert_eq!(p.days_remaining, 3);
        assert_eq!(p.projected_date, NaiveDate::from_ymd_opt(2021, 4, 4).unwrap());
    }

    #[test]
    fn test_threshold_already_reached() {
        let p = project(1_000_000, 10_000.0, 1_000_000, today()).unwrap();
        assert_eq!(p.remaining, 0);
        assert_eq!(p.days_remaining, 0);
        assert_eq!(p.projected_date, today());
    }

    #[test]
    fn test_threshold_exceeded() {
        let p = project(1_200_000, 10_000.0, 1_000_000, today()).unwrap();
        assert_eq!(p.remaining, 0);
        assert_eq!(p.days_remaining, 0);
        assert_eq!(p.projected_date, today());
    }

    #[test]
    fn test_zero_rate_fails() {
        let err = project(900_000, 0.0, 1_000_000, today()).unwrap_err();
        assert!(matches!(err, HerdBotError::NoProgress { .. }));
    }

    #[test]
    fn test_negative_rate_fails() {
        let err = project(900_000, -50.0, 1_000_000, today()).unwrap_err();
        assert!(matches!(err, HerdBotError::NoProgress { rate } if rate < 0.0));
    }

    #[test]
    fn test_nan_rate_fails() {
        let err = project(900_000, f64::NAN, 1_000_000, today()).unwrap_err();
        assert!(matches!(err, HerdBotError::NoProgress { .. }));
    }

    #[test]
    fn test_zero_rate_at_threshold_still_succeeds() {
        // Nothing remaining, so the rate does not matter.
        let p = project(1_000_000, 0.0, 1_000_000, today()).unwrap();
        assert_eq!(p.days_remaining, 0);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let a = project(900_000, 12_345.6, 1_000_000, today()).unwrap();
        let b = project(900_000, 12_345.6, 1_000_000, today()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fractional_rate_is_preserved() {
        // A rate below one vaccination/day still projects and keeps its
        // exact value rather than collapsing to zero.
        let p = project(999_990, 0.4, 1_000_000, today()).unwrap();
        assert_eq!(p.smoothed_rate, 0.4);
        assert_eq!(p.days_remaining, 25); // ceil(10 / 0.4)
    }

    #[test]
    fn test_one_vaccination_remaining() {
        let p = project(999_999, 10_000.0, 1_000_000, today()).unwrap();
        assert_eq!(p.remaining, 1);
        assert_eq!(p.days_remaining, 1);
    }
}
