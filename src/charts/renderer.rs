//! Static Chart Renderer
//! Draws chart data as PNG bar charts with plotters.
//!
//! Layout:
//! 1. Title centered on top
//! 2. One bar group per category, one bar per series inside each group
//! 3. Legend in the upper right when there is more than one series

use super::plotter::{ChartData, ChartError, ChartSurface};
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const PALETTE: [RGBColor; 6] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
];

/// Share of each category slot taken by its bar group.
const GROUP_WIDTH: f64 = 0.8;

/// Writes each chart to `<out_dir>/<id>.png`.
pub struct StaticChartRenderer {
    out_dir: PathBuf,
    width: u32,
    height: u32,
    written: Vec<PathBuf>,
}

impl StaticChartRenderer {
    /// Creates `out_dir` (and parents) if needed.
    pub fn new(out_dir: impl AsRef<Path>) -> Result<Self, ChartError> {
        let out_dir = out_dir.as_ref().to_path_buf();
        fs::create_dir_all(&out_dir).map_err(|source| ChartError::DestinationUnwritable {
            path: out_dir.clone(),
            source,
        })?;
        Ok(Self {
            out_dir,
            width: 900,
            height: 600,
            written: Vec::new(),
        })
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Files produced so far, in render order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn draw(&self, chart: &ChartData, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let n = chart.categories.len().max(1);
        let y_max = chart.max_value().unwrap_or(0.0).max(1.0) * 1.15;

        let labels = &chart.categories;
        let x_formatter = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        };

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24).into_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&x_formatter)
            .x_desc(chart.x_title.as_str())
            .y_desc(chart.y_title.as_str())
            .draw()?;

        let bar_width = GROUP_WIDTH / chart.series.len().max(1) as f64;
        for (s_idx, series) in chart.series.iter().enumerate() {
            let color = PALETTE[s_idx % PALETTE.len()];
            let bars = series
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i, v)))
                .map(move |(i, v)| {
                    let x0 = i as f64 - GROUP_WIDTH / 2.0 + s_idx as f64 * bar_width;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, v)], color.filled())
                });

            ctx.draw_series(bars)?
                .label(series.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if chart.series.len() > 1 {
            ctx.configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

impl ChartSurface for StaticChartRenderer {
    fn render(&mut self, chart: &ChartData) -> Result<(), ChartError> {
        let path = self.out_dir.join(format!("{}.png", chart.id));
        self.draw(chart, &path).map_err(|e| ChartError::Render {
            chart: chart.id.clone(),
            message: e.to_string(),
        })?;
        info!(chart = %chart.id, path = %path.display(), "rendered chart");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_output_directory() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("charts").join("summary");
        let renderer = StaticChartRenderer::new(&out).unwrap().with_size(640, 480);
        assert!(out.is_dir());
        assert!(renderer.written().is_empty());
    }

    #[test]
    fn output_directory_under_a_file_is_unwritable() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        assert!(matches!(
            StaticChartRenderer::new(blocker.join("charts")),
            Err(ChartError::DestinationUnwritable { .. })
        ));
    }
}
