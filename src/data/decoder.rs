//! Decoder Module
//! Derives human-readable label columns from the integer-coded fields.

use super::loader::{missing_columns, StudentTable};
use super::lookup::{CategoricalField, LookupTable, UNKNOWN_LABEL};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Schema mismatch: missing source column(s) {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// One source column, the column derived from it, and the table used.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub source: String,
    pub target: String,
    pub lookup: LookupTable,
}

impl From<CategoricalField> for FieldMapping {
    fn from(field: CategoricalField) -> Self {
        Self {
            source: field.source_column().to_string(),
            target: field.decoded_column().to_string(),
            lookup: field.lookup(),
        }
    }
}

/// A student table with its derived label columns appended.
///
/// Derived columns are computed once by [`Decoder::decode`]; there is no way
/// to mutate the frame afterwards.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    df: DataFrame,
    decoded_columns: Vec<String>,
}

impl DecodedTable {
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Derived column names, in decode order.
    pub fn decoded_columns(&self) -> &[String] {
        &self.decoded_columns
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

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }
}

/// Applies lookup tables to integer columns.
#[derive(Debug, Clone)]
pub struct Decoder {
    mappings: Vec<FieldMapping>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::standard()
    }
}

impl Decoder {
    pub fn new(mappings: Vec<FieldMapping>) -> Self {
        Self { mappings }
    }

    /// The five student fields, in canonical decode order.
    pub fn standard() -> Self {
        Self::new(CategoricalField::ALL.into_iter().map(FieldMapping::from).collect())
    }

    /// Append one label column per mapping. Codes the lookup does not know,
    /// and missing codes, become [`UNKNOWN_LABEL`].
    pub fn decode(&self, table: StudentTable) -> Result<DecodedTable, DecodeError> {
        let mut df = table.into_dataframe();

        let sources: Vec<&str> = self.mappings.iter().map(|m| m.source.as_str()).collect();
        let missing = missing_columns(&df, &sources);
        if !missing.is_empty() {
            return Err(DecodeError::SchemaMismatch { missing });
        }

        let mut decoded_columns = Vec::with_capacity(self.mappings.len());
        for mapping in &self.mappings {
            let labels = Self::decode_column(&df, mapping)?;

            let unknown = labels.iter().filter(|l| **l == UNKNOWN_LABEL).count();
            if unknown > 0 {
                warn!(
                    column = %mapping.source,
                    table = mapping.lookup.name(),
                    rows = unknown,
                    "codes outside lookup domain decoded as {UNKNOWN_LABEL}"
                );
            }

            df.with_column(Column::new(mapping.target.as_str().into(), labels))?;
            decoded_columns.push(mapping.target.clone());
        }
        debug!(columns = ?decoded_columns, rows = df.height(), "decoded table");

        Ok(DecodedTable {
            df,
            decoded_columns,
        })
    }

    fn decode_column(
        df: &DataFrame,
        mapping: &FieldMapping,
    ) -> Result<Vec<&'static str>, DecodeError> {
        // Read through f64 so fractional codes miss instead of truncating.
        let codes = df.column(&mapping.source)?.cast(&DataType::Float64)?;
        let codes = codes.f64()?;
        Ok(codes
            .into_iter()
            .map(|code| {
                let code = code.filter(|c| c.is_finite() && c.fract() == 0.0);
                mapping.lookup.label(code.map(|c| c as i64))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::lookup::{ETHNICITY, GENDER};
    use crate::data::test_support::{student_frame, StudentRow};

    fn labels_at(table: &DecodedTable, column: &str) -> Vec<String> {
        table
            .dataframe()
            .column(column)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn decodes_reference_row() {
        let table = student_frame(&[(2, 3, 1, 1, 0, 3.8, 12.5)]);
        let decoded = Decoder::standard().decode(table).unwrap();

        assert_eq!(labels_at(&decoded, "Ethnicity_Decoded"), vec!["Asian"]);
        assert_eq!(labels_at(&decoded, "Education_Decoded"), vec!["Bachelor's"]);
        assert_eq!(labels_at(&decoded, "Tutoring_Decoded"), vec!["Yes"]);
        assert_eq!(labels_at(&decoded, "Gender_Decoded"), vec!["Female"]);
        assert_eq!(labels_at(&decoded, "GradeClass_Decoded"), vec!["A"]);
    }

    #[test]
    fn out_of_domain_code_is_unknown() {
        let table = student_frame(&[(9, 0, 0, 0, 7, 2.0, 1.0)]);
        let decoded = Decoder::standard().decode(table).unwrap();

        assert_eq!(labels_at(&decoded, "Ethnicity_Decoded"), vec![UNKNOWN_LABEL]);
        assert_eq!(labels_at(&decoded, "GradeClass_Decoded"), vec![UNKNOWN_LABEL]);
        assert_eq!(labels_at(&decoded, "Gender_Decoded"), vec!["Male"]);
    }

    #[test]
    fn fractional_code_is_unknown() {
        let df = df!(
            "Ethnicity" => [2.7f64, 2.0, f64::NAN],
            "ParentalEducation" => [1i64, 1, 1],
            "Tutoring" => [0i64, 0, 0],
            "Gender" => [0i64, 0, 0],
            "GradeClass" => [0i64, 0, 0],
            "GPA" => [3.0f64, 3.0, 3.0],
            "StudyTimeWeekly" => [5.0f64, 5.0, 5.0]
        )
        .unwrap();
        let table = StudentTable::from_dataframe(df).unwrap();
        let decoded = Decoder::standard().decode(table).unwrap();

        assert_eq!(
            labels_at(&decoded, "Ethnicity_Decoded"),
            vec![UNKNOWN_LABEL, "Asian", UNKNOWN_LABEL]
        );
    }

    #[test]
    fn derived_columns_follow_originals_in_decode_order() {
        let table = student_frame(&[(0, 0, 0, 0, 0, 2.0, 1.0)]);
        let original = table.column_names();
        let decoded = Decoder::standard().decode(table).unwrap();

        let names = decoded.column_names();
        assert_eq!(&names[..original.len()], &original[..]);
        assert_eq!(
            &names[original.len()..],
            &[
                "Ethnicity_Decoded",
                "Education_Decoded",
                "Tutoring_Decoded",
                "Gender_Decoded",
                "GradeClass_Decoded"
            ]
        );
        assert_eq!(decoded.decoded_columns(), &names[original.len()..]);
    }

    #[test]
    fn labels_map_back_to_their_codes() {
        let rows: Vec<StudentRow> = (0..4)
            .map(|e| (e, 0, 0, e % 2, 0, 2.0, 1.0))
            .collect();
        let decoded = Decoder::standard().decode(student_frame(&rows)).unwrap();

        let ethnicity = labels_at(&decoded, "Ethnicity_Decoded");
        let gender = labels_at(&decoded, "Gender_Decoded");
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(ETHNICITY.code(&ethnicity[i]), Some(row.0));
            assert_eq!(GENDER.code(&gender[i]), Some(row.3));
        }
    }

    #[test]
    fn custom_mapping_requires_its_source_column() {
        let decoder = Decoder::new(vec![FieldMapping {
            source: "Sport".to_string(),
            target: "Sport_Decoded".to_string(),
            lookup: GENDER,
        }]);
        let table = student_frame(&[(0, 0, 0, 0, 0, 2.0, 1.0)]);
        match decoder.decode(table).unwrap_err() {
            DecodeError::SchemaMismatch { missing } => assert_eq!(missing, vec!["Sport"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
