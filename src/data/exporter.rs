//! CSV Exporter Module
//! Writes a decoded table, derived columns included, back to CSV.

use super::decoder::DecodedTable;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Destination unwritable: {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    Polars(#[from] PolarsError),
}

pub struct DataExporter;

impl DataExporter {
    /// Write `table` with a header row and no index column. Column order is
    /// the loaded order followed by the derived columns.
    ///
    /// An existing file at `path` is overwritten without confirmation.
    pub fn write_csv(table: &DecodedTable, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();

        // Every IO failure at the destination maps to DestinationUnwritable,
        // so serialize into memory and write in one call.
        // CsvWriter needs a mutable frame; the decoded table itself stays frozen.
        let mut df = table.dataframe().clone();
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)?;

        fs::write(path, &buf).map_err(|source| ExportError::DestinationUnwritable {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "exported decoded table"
        );
        Ok(())
    }
}
