//! Student Insights - decoding, statistics and summary charts for
//! categorically-encoded student performance records.
//!
//! A run loads a CSV into a [`data::StudentTable`], decodes the integer-coded
//! fields into label columns ([`data::DecodedTable`]), exports the result, and
//! optionally writes a JSON [`stats::SummaryReport`] and renders the summary
//! charts through a [`charts::ChartSurface`].

pub mod charts;
pub mod data;
pub mod pipeline;
pub mod stats;

pub use pipeline::{run, run_with_surface, PipelineConfig, PipelineError, PipelineOutcome};
