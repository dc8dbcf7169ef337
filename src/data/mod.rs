//! Data module - CSV loading, decoding and export

mod decoder;
mod exporter;
mod loader;
pub mod lookup;

pub use decoder::{DecodeError, DecodedTable, Decoder, FieldMapping};
pub use exporter::{DataExporter, ExportError};
pub use loader::{DataLoader, LoaderError, StudentTable, REQUIRED_COLUMNS};
pub use lookup::{CategoricalField, LookupTable, UNKNOWN_LABEL};
