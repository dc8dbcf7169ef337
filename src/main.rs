//! Student Insights - decode student records, export them, and summarise.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use student_insights::PipelineConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "student-insights",
    version,
    about = "Decode student performance records and summarise them"
)]
struct Args {
    /// Input CSV with integer-coded categorical columns
    input: PathBuf,

    /// Decoded CSV destination [default: <input stem>_decoded.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for summary chart PNGs
    #[arg(short, long)]
    charts: Option<PathBuf>,

    /// Path for a JSON summary report
    #[arg(short, long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let mut config = PipelineConfig::new(&args.input);
    if let Some(output) = args.output {
        config = config.with_output(output);
    }
    if let Some(dir) = args.charts {
        config = config.with_charts_dir(dir);
    }
    if let Some(path) = args.report {
        config = config.with_report(path);
    }

    let outcome = student_insights::run(&config)
        .with_context(|| format!("processing {}", config.input.display()))?;

    info!(
        rows = outcome.rows,
        columns = outcome.columns.len(),
        charts = outcome.charts_rendered,
        "decoded file saved to {}",
        outcome.output.display()
    );
    for file in &outcome.chart_files {
        info!(path = %file.display(), "chart written");
    }
    if let Some(report) = &outcome.report {
        info!(
            gpa_min = report.gpa.min,
            gpa_max = report.gpa.max,
            gpa_mean = report.gpa.mean,
            "GPA summary"
        );
    }
    Ok(())
}
