//! Charts module - Summary chart data and rendering

mod plotter;
mod renderer;

pub use plotter::{ChartData, ChartError, ChartPlotter, ChartSeries, ChartSurface};
pub use renderer::StaticChartRenderer;
