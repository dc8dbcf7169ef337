//! Summary Report Module
//! Bundles the standard aggregates of a decoded table for JSON output.

use super::calculator::{
    CategoryCount, CategoryFilter, GroupMean, ScalarSummary, StatsCalculator, StatsError,
};
use crate::data::{CategoricalField, DecodedTable};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Destination unwritable: {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Mean for one (ethnicity, gender) pair. JSON object keys must be strings,
/// so pairs are listed rather than keyed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairMean {
    pub ethnicity: String,
    pub gender: String,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub rows: usize,
    pub gpa: ScalarSummary,
    pub study_time_weekly: ScalarSummary,
    /// Keyed by gender label; genders with no rows are left out.
    pub gpa_by_gender: Vec<(String, ScalarSummary)>,
    pub grade_distribution: Vec<CategoryCount>,
    pub gender_distribution: Vec<CategoryCount>,
    pub ethnicity_distribution: Vec<CategoryCount>,
    pub gpa_by_parental_education: Vec<GroupMean>,
    pub gpa_by_tutoring: Vec<GroupMean>,
    pub gpa_by_ethnicity_and_gender: Vec<PairMean>,
}

impl SummaryReport {
    pub fn build(table: &DecodedTable) -> Result<Self, StatsError> {
        let gender = CategoricalField::Gender;

        let mut gpa_by_gender = Vec::new();
        for label in gender.lookup().labels() {
            let filter = CategoryFilter::equals(gender.decoded_column(), label);
            match StatsCalculator::filtered_summary(table, "GPA", &filter) {
                Ok(summary) => gpa_by_gender.push((label.to_string(), summary)),
                Err(StatsError::EmptyInput { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let gpa_by_ethnicity_and_gender = StatsCalculator::two_key_grouped_mean(
            table,
            "GPA",
            CategoricalField::Ethnicity.decoded_column(),
            gender.decoded_column(),
        )?
        .into_iter()
        .map(|((ethnicity, gender), mean)| PairMean {
            ethnicity,
            gender,
            mean,
        })
        .collect();

        Ok(Self {
            rows: table.row_count(),
            gpa: StatsCalculator::scalar_summary(table, "GPA")?,
            study_time_weekly: StatsCalculator::scalar_summary(table, "StudyTimeWeekly")?,
            gpa_by_gender,
            grade_distribution: distribution(table, CategoricalField::GradeClass)?,
            gender_distribution: distribution(table, gender)?,
            ethnicity_distribution: distribution(table, CategoricalField::Ethnicity)?,
            gpa_by_parental_education: gpa_by(table, CategoricalField::ParentalEducation)?,
            gpa_by_tutoring: gpa_by(table, CategoricalField::Tutoring)?,
            gpa_by_ethnicity_and_gender,
        })
    }

    /// Write pretty-printed JSON, replacing any existing file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let unwritable = |source| ReportError::DestinationUnwritable {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(unwritable)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(unwritable)?;
        info!(path = %path.display(), "wrote summary report");
        Ok(())
    }
}

fn distribution(
    table: &DecodedTable,
    field: CategoricalField,
) -> Result<Vec<CategoryCount>, StatsError> {
    StatsCalculator::category_counts(table, field.decoded_column(), &field.lookup().labels())
}

fn gpa_by(table: &DecodedTable, field: CategoricalField) -> Result<Vec<GroupMean>, StatsError> {
    StatsCalculator::grouped_mean(table, "GPA", field.decoded_column(), &field.lookup().labels())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::decoded;
    use tempfile::tempdir;

    fn sample() -> DecodedTable {
        decoded(&[
            (2, 3, 1, 1, 0, 3.8, 12.5),
            (2, 3, 1, 1, 1, 3.2, 10.0),
            (0, 1, 0, 0, 3, 1.9, 4.0),
        ])
    }

    #[test]
    fn report_collects_standard_aggregates() {
        let report = SummaryReport::build(&sample()).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.gpa.max, 3.8);
        assert_eq!(report.gpa_by_gender.len(), 2);
        assert_eq!(report.gpa_by_gender[0].0, "Male");
        assert_eq!(report.grade_distribution.len(), 5);
        assert_eq!(report.gpa_by_ethnicity_and_gender.len(), 2);
        assert_eq!(report.gpa_by_ethnicity_and_gender[0].ethnicity, "Asian");
        assert!((report.gpa_by_ethnicity_and_gender[0].mean - 3.5).abs() < 1e-9);
    }

    #[test]
    fn genders_without_rows_are_skipped() {
        let report = SummaryReport::build(&decoded(&[(0, 0, 0, 1, 0, 2.0, 1.0)])).unwrap();
        assert_eq!(report.gpa_by_gender.len(), 1);
        assert_eq!(report.gpa_by_gender[0].0, "Female");
    }

    #[test]
    fn empty_table_has_no_report() {
        assert!(matches!(
            SummaryReport::build(&decoded(&[])),
            Err(StatsError::EmptyInput { .. })
        ));
    }

    #[test]
    fn writes_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        SummaryReport::build(&sample())
            .unwrap()
            .write_json(&path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["rows"], 3);
        assert_eq!(value["grade_distribution"][0]["label"], "A");
        assert_eq!(value["gpa_by_gender"][1][0], "Female");
    }
}
