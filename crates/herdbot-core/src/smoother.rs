//! Trailing rolling-average smoothing of daily vaccination deltas

use herdbot_common::{HerdBotError, Result};
use tracing::warn;

use crate::types::{NegativeDeltaAnomaly, ObservationSeries, SmoothedPoint, SmoothedSeries};

/// Compute the trailing `window`-day rolling average of daily deltas.
///
/// Produces one smoothed value per day once at least `window` deltas exist,
/// i.e. exactly `series.len() - window` values. Fails with
/// `InsufficientHistory` when the series has fewer than `window + 1`
/// observations.
///
/// Negative deltas (upstream data corrections) count as zero in the mean and
/// are reported in the result's anomaly list; the computation itself never
/// aborts on them.
pub fn smooth(series: &ObservationSeries, window: usize) -> Result<SmoothedSeries> {
    if window == 0 {
        return Err(HerdBotError::validation_field(
            "smoothing window must be at least 1",
            "window_size",
        ));
    }
    if series.len() < window + 1 {
        return Err(HerdBotError::insufficient_history(series.len(), window + 1));
    }

    let deltas = series.daily_deltas();

    let anomalies: Vec<NegativeDeltaAnomaly> = deltas
        .iter()
        .filter(|d| d.value < 0)
        .map(|d| NegativeDeltaAnomaly {
            date: d.date,
            delta: d.value,
        })
        .collect();
    for anomaly in &anomalies {
        warn!(
            date = %anomaly.date,
            delta = anomaly.delta,
            "negative daily delta, treating as 0 for averaging"
        );
    }

    let points = deltas
        .windows(window)
        .map(|chunk| {
            let sum: i64 = chunk.iter().map(|d| d.value.max(0)).sum();
            SmoothedPoint {
                date: chunk[window - 1].date,
                rate: sum as f64 / window as f64,
            }
        })
        .collect();

    Ok(SmoothedSeries {
        window,
        points,
        anomalies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Observation;
    use chrono::{Days, NaiveDate};

    fn make_series(counts: &[u64]) -> ObservationSeries {
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let obs = counts
            .iter()
            .enumerate()
            .map(|(i, &c)| Observation::new(start + Days::new(i as u64), c))
            .collect();
        ObservationSeries::new(obs).unwrap()
    }

    #[test]
    fn test_single_window_scenario() {
        // Deltas: 10, 15, 5, 10, 10, 15, 15 -> mean = 80/7
        let series = make_series(&[100, 110, 125, 130, 140, 150, 165, 180]);
        let smoothed = smooth(&series, 7).unwrap();

        assert_eq!(smoothed.points.len(), 1);
        assert!((smoothed.latest_rate() - 80.0 / 7.0).abs() < 1e-9);
        assert_eq!(
            smoothed.points[0].date,
            NaiveDate::from_ymd_opt(2021, 3, 8).unwrap()
        );
        assert!(smoothed.anomalies.is_empty());
    }

    #[test]
    fn test_value_count_matches_series_length() {
        // len - window values for any valid series
        let series = make_series(&[0, 5, 12, 20, 21, 30, 44, 50, 61, 75]);
        for window in 1..=9 {
            let smoothed = smooth(&series, window).unwrap();
            assert_eq!(smoothed.points.len(), series.len() - window);
        }
    }

    #[test]
    fn test_each_value_is_window_mean() {
        let series = make_series(&[0, 10, 30, 60, 100]);
        let smoothed = smooth(&series, 2).unwrap();
        // Deltas: 10, 20, 30, 40; pairwise means: 15, 25, 35
        let rates: Vec<f64> = smoothed.points.iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![15.0, 25.0, 35.0]);
    }

    #[test]
    fn test_insufficient_history() {
        let series = make_series(&[100, 110, 125]);
        let err = smooth(&series, 7).unwrap_err();
        match err {
            HerdBotError::InsufficientHistory { have, need } => {
                assert_eq!(have, 3);
                assert_eq!(need, 8);
            }
            other => panic!("expected InsufficientHistory, got {other}"),
        }
    }

    #[test]
    fn test_exactly_window_days_is_still_insufficient() {
        let series = make_series(&[10, 20, 30, 40, 50, 60, 70]);
        assert!(smooth(&series, 7).is_err());
        assert!(smooth(&series, 6).is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let series = make_series(&[100, 110]);
        let err = smooth(&series, 0).unwrap_err();
        assert!(matches!(err, HerdBotError::Validation { .. }));
    }

    #[test]
    fn test_negative_delta_counts_as_zero_and_is_flagged() {
        // Deltas: 10, -5, 20; window 3 -> mean over (10, 0, 20) = 10
        let series = make_series(&[100, 110, 105, 125]);
        let smoothed = smooth(&series, 3).unwrap();

        assert_eq!(smoothed.points.len(), 1);
        assert!((smoothed.latest_rate() - 10.0).abs() < 1e-9);
        assert_eq!(smoothed.anomalies.len(), 1);
        assert_eq!(
            smoothed.anomalies[0],
            NegativeDeltaAnomaly {
                date: NaiveDate::from_ymd_opt(2021, 3, 3).unwrap(),
                delta: -5,
            }
        );
    }

    #[test]
    fn test_flat_series_smooths_to_zero() {
        let series = make_series(&[500, 500, 500, 500]);
        let smoothed = smooth(&series, 3).unwrap();
        assert_eq!(smoothed.latest_rate(), 0.0);
    }

    #[test]
    fn test_smoothing_is_pure() {
        let series = make_series(&[100, 110, 125, 130, 140, 150, 165, 180]);
        let a = smooth(&series, 7).unwrap();
        let b = smooth(&series, 7).unwrap();
        assert_eq!(a, b);
    }
}
