//! Statistics Calculator Module
//! Scalar summaries, category distributions and grouped means over a decoded
//! student table.

use crate::data::DecodedTable;
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("No rows to aggregate for column {column}")]
    EmptyInput { column: String },
    #[error("Schema mismatch: column {0} not found")]
    SchemaMismatch(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Min, max and arithmetic mean of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Equality predicate over a decoded categorical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    pub column: String,
    pub label: String,
}

impl CategoryFilter {
    pub fn equals(column: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
        }
    }
}

/// Row count of one label and its share of all rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub label: String,
    pub count: usize,
    pub mean: f64,
}

/// Pure aggregations over a [`DecodedTable`]. Nothing here mutates or caches.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Summarise a slice of values. `None` when there are no values.
    pub fn compute_summary(values: &[f64]) -> Option<ScalarSummary> {
        if values.is_empty() {
            return None;
        }
        Some(ScalarSummary {
            count: values.len(),
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            mean: values.iter().mean(),
        })
    }

    /// Min/max/mean of `column` over every row.
    pub fn scalar_summary(table: &DecodedTable, column: &str) -> Result<ScalarSummary, StatsError> {
        let values = Self::numeric_values(table.dataframe(), column)?;
        Self::compute_summary(&values).ok_or_else(|| StatsError::EmptyInput {
            column: column.to_string(),
        })
    }

    /// Min/max/mean of `column` over rows matching `filter`.
    pub fn filtered_summary(
        table: &DecodedTable,
        column: &str,
        filter: &CategoryFilter,
    ) -> Result<ScalarSummary, StatsError> {
        Self::require(table, &[column, filter.column.as_str()])?;

        let filtered = table
            .dataframe()
            .clone()
            .lazy()
            .filter(col(filter.column.as_str()).eq(lit(filter.label.as_str())))
            .select([col(column)])
            .collect()?;

        let values = Self::numeric_values(&filtered, column)?;
        Self::compute_summary(&values).ok_or_else(|| StatsError::EmptyInput {
            column: format!("{column} where {} == {}", filter.column, filter.label),
        })
    }

    /// Count and percentage of each label in `column`.
    ///
    /// Every label of `canonical_order` is reported, with zero when absent.
    /// Labels found in the data but not in `canonical_order` follow, sorted.
    pub fn category_counts(
        table: &DecodedTable,
        column: &str,
        canonical_order: &[&str],
    ) -> Result<Vec<CategoryCount>, StatsError> {
        let labels = Self::string_values(table.dataframe(), column)?;
        let total = labels.len();
        if total == 0 {
            return Err(StatsError::EmptyInput {
                column: column.to_string(),
            });
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for label in labels {
            *counts.entry(label).or_default() += 1;
        }

        Ok(Self::ordered_labels(&counts, canonical_order)
            .into_iter()
            .map(|label| {
                let count = counts.get(&label).copied().unwrap_or(0);
                CategoryCount {
                    label,
                    count,
                    percentage: count as f64 / total as f64 * 100.0,
                }
            })
            .collect())
    }

    /// Mean of `value_column` per label of `key_column`, in canonical order
    /// with unlisted labels sorted after. Labels with no rows are omitted.
    pub fn grouped_mean(
        table: &DecodedTable,
        value_column: &str,
        key_column: &str,
        canonical_order: &[&str],
    ) -> Result<Vec<GroupMean>, StatsError> {
        Self::require(table, &[value_column, key_column])?;
        Self::require_rows(table, value_column)?;

        let keys = Self::string_values(table.dataframe(), key_column)?;
        let by_label = Self::group_values(table, value_column, keys)?;

        Ok(Self::ordered_labels(&by_label, canonical_order)
            .into_iter()
            .filter_map(|label| {
                let values = by_label.get(&label)?;
                Some(GroupMean {
                    count: values.len(),
                    mean: values.iter().mean(),
                    label,
                })
            })
            .collect())
    }

    /// Mean of `value_column` per (`key1`, `key2`) pair. Pairs with no rows
    /// are omitted rather than reported as undefined.
    pub fn two_key_grouped_mean(
        table: &DecodedTable,
        value_column: &str,
        key1: &str,
        key2: &str,
    ) -> Result<BTreeMap<(String, String), f64>, StatsError> {
        Self::require(table, &[value_column, key1, key2])?;
        Self::require_rows(table, value_column)?;

        let df = table.dataframe();
        let firsts = Self::string_values(df, key1)?;
        let seconds = Self::string_values(df, key2)?;
        let keys = firsts.into_iter().zip(seconds).collect();

        Ok(Self::group_values(table, value_column, keys)?
            .into_iter()
            .map(|(key, values)| (key, values.iter().mean()))
            .collect())
    }

    /// Bucket the values of `value_column` by row key. Null and NaN values
    /// are dropped individually, so a key only disappears when all of its
    /// values are missing.
    fn group_values<K: Eq + Hash>(
        table: &DecodedTable,
        value_column: &str,
        keys: Vec<K>,
    ) -> Result<HashMap<K, Vec<f64>>, StatsError> {
        let values = table
            .dataframe()
            .column(value_column)?
            .cast(&DataType::Float64)?;

        let mut groups: HashMap<K, Vec<f64>> = HashMap::new();
        for (key, v) in keys.into_iter().zip(values.f64()?.into_iter()) {
            if let Some(v) = v.filter(|v| !v.is_nan()) {
                groups.entry(key).or_default().push(v);
            }
        }
        Ok(groups)
    }

    /// Non-null, non-NaN values of a numeric column as f64.
    fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, StatsError> {
        let series = df
            .column(column)
            .map_err(|_| StatsError::SchemaMismatch(column.to_string()))?
            .cast(&DataType::Float64)?;
        Ok(series
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect())
    }

    /// Labels of a string column; nulls read as empty strings.
    fn string_values(df: &DataFrame, column: &str) -> Result<Vec<String>, StatsError> {
        let series = df
            .column(column)
            .map_err(|_| StatsError::SchemaMismatch(column.to_string()))?
            .cast(&DataType::String)?;
        Ok(series
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    fn require_rows(table: &DecodedTable, column: &str) -> Result<(), StatsError> {
        if table.row_count() == 0 {
            return Err(StatsError::EmptyInput {
                column: column.to_string(),
            });
        }
        Ok(())
    }

    fn require(table: &DecodedTable, columns: &[&str]) -> Result<(), StatsError> {
        match columns.iter().find(|c| !table.has_column(c)) {
            Some(missing) => Err(StatsError::SchemaMismatch(missing.to_string())),
            None => Ok(()),
        }
    }

    /// `canonical_order` first, then any other keys of `present`, sorted.
    fn ordered_labels<V>(present: &HashMap<String, V>, canonical_order: &[&str]) -> Vec<String> {
        let mut extra: Vec<&String> = present
            .keys()
            .filter(|k| !canonical_order.contains(&k.as_str()))
            .collect();
        extra.sort();

        canonical_order
            .iter()
            .map(|s| s.to_string())
            .chain(extra.into_iter().cloned())
            .collect()
    }
}
