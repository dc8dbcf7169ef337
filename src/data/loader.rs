//! CSV Data Loader Module
//! Loads student records from CSV into a polars-backed table.

use polars::prelude::*;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Columns every student table must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Ethnicity",
    "ParentalEducation",
    "Tutoring",
    "Gender",
    "GradeClass",
    "GPA",
    "StudyTimeWeekly",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Schema mismatch: missing required column(s) {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
}

/// An ordered set of student rows sharing the schema of the file they came
/// from. Always contains [`REQUIRED_COLUMNS`].
#[derive(Debug, Clone)]
pub struct StudentTable {
    df: DataFrame,
}

impl StudentTable {
    /// Wrap an in-memory frame, checking the required columns are present.
    pub fn from_dataframe(df: DataFrame) -> Result<Self, LoaderError> {
        let missing = missing_columns(&df, &REQUIRED_COLUMNS);
        if !missing.is_empty() {
            return Err(LoaderError::SchemaMismatch { missing });
        }
        Ok(Self { df })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }
}

/// Names from `required` that `df` lacks, in the order given.
pub(crate) fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| df.get_column_index(name).is_none())
        .map(|name| name.to_string())
        .collect()
}

/// Handles CSV file loading with Polars.
#[derive(Debug, Clone)]
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 10000,
        }
    }

    /// Load a CSV file with a header row. Either the whole file loads or
    /// nothing does.
    pub fn load_csv(&self, file_path: impl AsRef<Path>) -> Result<StudentTable, LoaderError> {
        let path = file_path.as_ref();

        // polars reports a missing file as a generic IO error; probe first so
        // callers get a typed failure.
        let unavailable = |source| LoaderError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        };
        if !fs::metadata(path).map_err(unavailable)?.is_file() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        File::open(path).map_err(unavailable)?;

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .finish()?
            .collect()?;
        debug!(columns = ?df.get_column_names(), "csv parsed");

        let table = StudentTable::from_dataframe(df)?;
        info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.df.width(),
            "loaded student table"
        );
        Ok(table)
    }
}
