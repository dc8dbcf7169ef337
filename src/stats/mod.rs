//! Stats module - Aggregations and the summary report

mod calculator;
mod report;

pub use calculator::{
    CategoryCount, CategoryFilter, GroupMean, ScalarSummary, StatsCalculator, StatsError,
};
pub use report::{PairMean, ReportError, SummaryReport};
