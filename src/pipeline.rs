//! Pipeline Module
//! One run of load, decode, export, report and charts over explicit paths.

use crate::charts::{ChartError, ChartPlotter, ChartSurface, StaticChartRenderer};
use crate::data::{DataExporter, DataLoader, DecodeError, Decoder, ExportError, LoaderError};
use crate::stats::{ReportError, StatsError, SummaryReport};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, info_span};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// File paths for one run. These are the only configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub charts_dir: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

impl PipelineConfig {
    /// Export next to the input as `<stem>_decoded.csv`, no report or charts.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = default_output_path(&input);
        Self {
            input,
            output,
            charts_dir: None,
            report: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_charts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.charts_dir = Some(dir.into());
        self
    }

    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = Some(path.into());
        self
    }
}

pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "students".to_string());
    input.with_file_name(format!("{stem}_decoded.csv"))
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub rows: usize,
    pub columns: Vec<String>,
    pub output: PathBuf,
    pub report: Option<SummaryReport>,
    pub charts_rendered: usize,
    /// PNG files written by [`run`]; empty for caller-supplied surfaces.
    pub chart_files: Vec<PathBuf>,
}

/// Run the pipeline, drawing charts as PNGs when `charts_dir` is set.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutcome, PipelineError> {
    match &config.charts_dir {
        Some(dir) => {
            let mut renderer = StaticChartRenderer::new(dir)?;
            let mut outcome = run_with_surface(config, Some(&mut renderer))?;
            outcome.chart_files = renderer.written().to_vec();
            Ok(outcome)
        }
        None => run_with_surface(config, None),
    }
}

/// Run the pipeline against a caller-supplied chart surface. Charts are only
/// built when a surface is given. The first failure ends the run.
pub fn run_with_surface(
    config: &PipelineConfig,
    surface: Option<&mut dyn ChartSurface>,
) -> Result<PipelineOutcome, PipelineError> {
    let _span = info_span!("pipeline", input = %config.input.display()).entered();

    let table = DataLoader::new().load_csv(&config.input)?;
    let decoded = Decoder::standard().decode(table)?;
    DataExporter::write_csv(&decoded, &config.output)?;

    let report = match &config.report {
        Some(path) => {
            let report = SummaryReport::build(&decoded)?;
            report.write_json(path)?;
            Some(report)
        }
        None => None,
    };

    let mut charts_rendered = 0;
    if let Some(surface) = surface {
        let charts = ChartPlotter::summary_charts(&decoded)?;
        ChartPlotter::render_all(surface, &charts)?;
        charts_rendered = charts.len();
    }

    info!(
        rows = decoded.row_count(),
        output = %config.output.display(),
        charts = charts_rendered,
        "pipeline finished"
    );

    Ok(PipelineOutcome {
        rows: decoded.row_count(),
        columns: decoded.column_names(),
        output: config.output.clone(),
        report,
        charts_rendered,
        chart_files: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        let config = PipelineConfig::new("/data/Student_performance_data.csv");
        assert_eq!(
            config.output,
            PathBuf::from("/data/Student_performance_data_decoded.csv")
        );
        assert_eq!(config.charts_dir, None);
        assert_eq!(config.report, None);
    }

    #[test]
    fn builder_overrides_paths() {
        let config = PipelineConfig::new("in.csv")
            .with_output("out.csv")
            .with_report("summary.json")
            .with_charts_dir("charts");
        assert_eq!(config.output, PathBuf::from("out.csv"));
        assert_eq!(config.report, Some(PathBuf::from("summary.json")));
        assert_eq!(config.charts_dir, Some(PathBuf::from("charts")));
    }
}
