//! Daily vaccination chart: bars for recent daily deltas, the rolling
//! average as a line, and a "days left" annotation box.

use async_trait::async_trait;
use chrono::NaiveDate;
use herdbot_common::{HerdBotError, Result};
use herdbot_core::{ObservationSeries, Projection, SmoothedSeries};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

const BAR_COLOR: RGBColor = RGBColor(34, 56, 67);
const AVERAGE_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Rendering options for the daily vaccination chart
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
    /// How many trailing days of bars to draw
    pub display_days: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            display_days: 30,
        }
    }
}

/// Trait for rendering a prepared chart to a file or to PNG bytes
#[async_trait]
pub trait ChartRenderer {
    /// Render the chart to a file path
    async fn render_to_file(&self, path: &Path) -> Result<()>;

    /// Render the chart to PNG bytes
    async fn render_to_bytes(&self) -> Result<Vec<u8>>;
}

/// Chart of recent daily vaccinations with the projection annotation
#[derive(Debug, Clone)]
pub struct DailyVaccinationChart {
    config: ChartConfig,
    /// (date, delta) bars for the displayed window; corrections draw as 0
    bars: Vec<(NaiveDate, u64)>,
    /// Rolling-average rate per displayed date, where defined
    average: HashMap<NaiveDate, f64>,
    days_remaining: u32,
    data_as_of: NaiveDate,
}

impl DailyVaccinationChart {
    /// Prepare a chart from the run's series, smoothed rates, and projection.
    pub fn new(
        series: &ObservationSeries,
        smoothed: &SmoothedSeries,
        projection: &Projection,
        config: ChartConfig,
    ) -> Self {
        let deltas = series.daily_deltas();
        let start = deltas.len().saturating_sub(config.display_days);
        let bars = deltas[start..]
            .iter()
            .map(|d| (d.date, d.value.max(0) as u64))
            .collect();

        let average = smoothed
            .points
            .iter()
            .map(|p| (p.date, p.rate))
            .collect();

        Self {
            config,
            bars,
            average,
            days_remaining: projection.days_remaining,
            data_as_of: series.latest().date,
        }
    }

    fn y_max(&self) -> f64 {
        let bar_max = self.bars.iter().map(|&(_, v)| v as f64).fold(0.0, f64::max);
        let line_max = self
            .bars
            .iter()
            .filter_map(|(date, _)| self.average.get(date))
            .fold(0.0, |acc: f64, &v| acc.max(v));
        let max = bar_max.max(line_max);
        if max <= 0.0 {
            10.0
        } else {
            max * 1.1
        }
    }

    fn title(&self) -> String {
        format!("DAILY VACCINATIONS (data as of: {})", self.data_as_of)
    }

    /// Draw onto any plotters backend. Shared by the file and bytes paths.
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        if self.bars.is_empty() {
            return Err(HerdBotError::render("no data to render"));
        }

        root.fill(&WHITE)?;

        let n = self.bars.len();
        let y_max = self.y_max();

        let mut chart = ChartBuilder::on(root)
            .caption(self.title(), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

        let dates: Vec<NaiveDate> = self.bars.iter().map(|&(d, _)| d).collect();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n.min(10))
            .x_label_formatter(&|x| {
                let idx = x.round() as i64;
                if idx >= 0 && (idx as usize) < dates.len() {
                    dates[idx as usize].format("%d.%m.").to_string()
                } else {
                    String::new()
                }
            })
            .y_label_formatter(&|y| group_thousands(*y as u64))
            .x_desc("DATE")
            .y_desc("DAILY VACCINATIONS")
            .draw()?;

        chart
            .draw_series(self.bars.iter().enumerate().map(|(i, &(_, v))| {
                Rectangle::new(
                    [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, v as f64)],
                    BAR_COLOR.filled(),
                )
            }))?
            .label("vaccinations/day")
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 10, y + 4)], BAR_COLOR.filled()));

        let line: Vec<(f64, f64)> = self
            .bars
            .iter()
            .enumerate()
            .filter_map(|(i, (date, _))| self.average.get(date).map(|&rate| (i as f64, rate)))
            .collect();
        if !line.is_empty() {
            chart
                .draw_series(LineSeries::new(line, AVERAGE_COLOR.stroke_width(2)))?
                .label("rolling average")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 10, y)], AVERAGE_COLOR.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        let annotation = format!("{} days left", self.days_remaining);
        let style = TextStyle::from(("sans-serif", 22).into_font()).color(&BLACK);
        chart
            .plotting_area()
            .draw(&Text::new(annotation, (n as f64 * 0.1, y_max * 0.85), style))?;

        root.present()?;
        Ok(())
    }
}

#[async_trait]
impl ChartRenderer for DailyVaccinationChart {
    async fn render_to_file(&self, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.config.width, self.config.height))
            .into_drawing_area();
        self.draw(&root)?;
        info!("Rendered chart to {}", path.display());
        Ok(())
    }

    async fn render_to_bytes(&self) -> Result<Vec<u8>> {
        let (width, height) = (self.config.width, self.config.height);
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.draw(&root)?;
        }

        let img = image::RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| HerdBotError::render("rendered buffer has unexpected size"))?;

        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageOutputFormat::Png)
            .map_err(|e| HerdBotError::render_with_cause("PNG encoding failed", e))?;

        info!(bytes = png.get_ref().len(), "Rendered chart to PNG bytes");
        Ok(png.into_inner())
    }
}

/// Format an integer with ',' thousands separators for axis labels
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
