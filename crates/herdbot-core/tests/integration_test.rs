//! End-to-end tests of the estimation core: series in, projection out.

use chrono::{Days, NaiveDate};
use herdbot_core::{compose_caption, coverage_percent, project, smooth, Observation, ObservationSeries};

fn series_from(start: NaiveDate, counts: &[u64]) -> ObservationSeries {
    let observations = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| Observation::new(start + Days::new(i as u64), c))
        .collect();
    ObservationSeries::new(observations).unwrap()
}

#[test]
fn smooth_then_project_end_to_end() {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    // 30 days of steady 10_000/day starting from 600_000
    let counts: Vec<u64> = (0..30).map(|i| 600_000 + i * 10_000).collect();
    let series = series_from(start, &counts);

    let smoothed = smooth(&series, 7).unwrap();
    assert_eq!(smoothed.points.len(), series.len() - 7);
    assert!((smoothed.latest_rate() - 10_000.0).abs() < 1e-9);

    let today = series.latest().date;
    let threshold = 1_000_000;
    let projection = project(series.latest().cumulative, smoothed.latest_rate(), threshold, today)
        .unwrap();

    // 890_000 reached, 110_000 to go at 10_000/day
    assert_eq!(projection.remaining, 110_000);
    assert_eq!(projection.days_remaining, 11);
    assert_eq!(projection.projected_date, today + Days::new(11));
}

#[test]
fn projection_feeds_a_complete_caption() {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    let counts: Vec<u64> = (0..10).map(|i| 500_000 + i * 10_000).collect();
    let series = series_from(start, &counts);

    let smoothed = smooth(&series, 7).unwrap();
    let today = series.latest().date;
    let total_population = 1_000_000;
    let threshold = 700_000;

    let projection = project(series.latest().cumulative, smoothed.latest_rate(), threshold, today)
        .unwrap();
    let coverage = coverage_percent(series.latest().cumulative, total_population);
    let caption = compose_caption(&projection, threshold, 0.7, coverage);

    assert!(caption.contains("0.7 Mio."));
    assert!(caption.contains("11 days"));
    assert!(caption.contains("59%"));
}

#[test]
fn data_correction_mid_series_still_projects() {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    // One upstream correction (dip) in otherwise steady growth
    let counts = vec![
        100_000, 110_000, 108_000, 120_000, 130_000, 140_000, 150_000, 160_000, 170_000,
    ];
    let series = series_from(start, &counts);

    let smoothed = smooth(&series, 7).unwrap();
    assert_eq!(smoothed.anomalies.len(), 1);
    assert_eq!(smoothed.anomalies[0].delta, -2_000);

    let projection = project(
        series.latest().cumulative,
        smoothed.latest_rate(),
        200_000,
        series.latest().date,
    )
    .unwrap();
    assert!(projection.days_remaining > 0);
}
