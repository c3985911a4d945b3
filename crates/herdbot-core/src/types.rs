//! Domain types for the vaccination series and its derived values

use chrono::NaiveDate;
use herdbot_common::{HerdBotError, Result};
use serde::{Deserialize, Serialize};

/// A single (date, cumulative count) observation from the upstream dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar day the count was reported for
    pub date: NaiveDate,
    /// Running total of vaccinations administered up to and including `date`
    pub cumulative: u64,
}

impl Observation {
    pub fn new(date: NaiveDate, cumulative: u64) -> Self {
        Self { date, cumulative }
    }
}

/// Ordered, gap-free sequence of daily observations.
///
/// The constructor enforces strictly increasing, consecutive dates. Missing
/// days are rejected rather than interpolated: the upstream dataset is daily,
/// so a gap means a malformed payload. Cumulative counts are allowed to
/// decrease here; upstream data corrections surface as negative deltas and
/// are flagged by the smoother instead of being rejected at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationSeries {
    observations: Vec<Observation>,
}

impl ObservationSeries {
    /// Validate and wrap a sequence of observations.
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(HerdBotError::source_format(
                "observation series contains no rows",
            ));
        }

        for pair in observations.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.date <= prev.date {
                return Err(HerdBotError::source_format(format!(
                    "dates not strictly increasing: {} followed by {}",
                    prev.date, next.date
                )));
            }
            if next.date != prev.date.succ_opt().unwrap_or(next.date) {
                return Err(HerdBotError::source_format(format!(
                    "gap in date sequence between {} and {}",
                    prev.date, next.date
                )));
            }
        }

        Ok(Self { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The most recent observation. The constructor rejects empty input, so
    /// this always exists.
    pub fn latest(&self) -> Observation {
        *self
            .observations
            .last()
            .expect("series is never constructed empty")
    }

    pub fn first(&self) -> Observation {
        *self
            .observations
            .first()
            .expect("series is never constructed empty")
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    /// Day-over-day deltas, one per adjacent pair. Negative values are kept
    /// as-is; the smoother decides how to treat them.
    pub fn daily_deltas(&self) -> Vec<DailyDelta> {
        self.observations
            .windows(2)
            .map(|pair| DailyDelta {
                date: pair[1].date,
                value: pair[1].cumulative as i64 - pair[0].cumulative as i64,
            })
            .collect()
    }
}

/// Day-over-day increase in the cumulative count, dated by the later day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyDelta {
    pub date: NaiveDate,
    pub value: i64,
}

/// A negative daily delta, indicating an upstream data correction.
///
/// Non-fatal: the smoother treats the delta as zero for averaging but reports
/// every occurrence so the run log shows what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NegativeDeltaAnomaly {
    pub date: NaiveDate,
    pub delta: i64,
}

/// One trailing-mean value of the smoothed daily rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPoint {
    /// Last day of the averaging window
    pub date: NaiveDate,
    /// Trailing arithmetic mean of the window's daily deltas
    pub rate: f64,
}

/// Result of smoothing a series: one rate per day once the window is full,
/// plus any data-correction anomalies encountered.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedSeries {
    pub window: usize,
    pub points: Vec<SmoothedPoint>,
    pub anomalies: Vec<NegativeDeltaAnomaly>,
}

impl SmoothedSeries {
    /// The most recent smoothed rate. The smoother never returns an empty
    /// point list, so this always exists.
    pub fn latest_rate(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.rate)
            .expect("smoother never returns an empty series")
    }
}

/// Projected completion of the threshold crossing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    /// Vaccinations still needed to reach the threshold
    pub remaining: u64,
    /// Smoothed daily rate the projection was computed with, in
    /// vaccinations per day
    pub smoothed_rate: f64,
    /// Whole days until the threshold is crossed at the current rate
    pub days_remaining: u32,
    /// Calendar day the threshold is projected to be crossed
    pub projected_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(start: NaiveDate, counts: &[u64]) -> Vec<Observation> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| Observation::new(start + chrono::Days::new(i as u64), c))
            .collect()
    }

    #[test]
    fn test_valid_series() {
        let obs = series(date(2021, 3, 1), &[100, 110, 125]);
        let s = ObservationSeries::new(obs).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.latest().cumulative, 125);
        assert_eq!(s.first().cumulative, 100);
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = ObservationSeries::new(vec![]).unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn test_gap_rejected() {
        let obs = vec![
            Observation::new(date(2021, 3, 1), 100),
            Observation::new(date(2021, 3, 3), 120),
        ];
        let err = ObservationSeries::new(obs).unwrap_err();
        assert!(err.to_string().contains("gap in date sequence"));
    }

    #[test]
    fn test_unordered_dates_rejected() {
        let obs = vec![
            Observation::new(date(2021, 3, 2), 100),
            Observation::new(date(2021, 3, 1), 120),
        ];
        let err = ObservationSeries::new(obs).unwrap_err();
        assert!(err.to_string().contains("not strictly increasing"));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let obs = vec![
            Observation::new(date(2021, 3, 1), 100),
            Observation::new(date(2021, 3, 1), 120),
        ];
        assert!(ObservationSeries::new(obs).is_err());
    }

    #[test]
    fn test_daily_deltas() {
        let obs = series(date(2021, 3, 1), &[100, 110, 105, 125]);
        let s = ObservationSeries::new(obs).unwrap();
        let deltas = s.daily_deltas();
        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[0].value, 10);
        assert_eq!(deltas[1].value, -5); // upstream correction, kept as-is
        assert_eq!(deltas[2].value, 20);
        assert_eq!(deltas[0].date, date(2021, 3, 2));
    }

    #[test]
    fn test_decreasing_counts_accepted_at_ingestion() {
        let obs = series(date(2021, 3, 1), &[100, 90]);
        assert!(ObservationSeries::new(obs).is_ok());
    }
}
