//! Chart Plotter Module
//! Turns aggregates into labelled series for a chart surface.

use crate::data::{CategoricalField, DecodedTable};
use crate::stats::{GroupMean, StatsCalculator, StatsError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Destination unwritable: {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to render chart {chart}: {message}")]
    Render { chart: String, message: String },
}

/// One named series, aligned index-for-index with [`ChartData::categories`].
/// `None` marks a category the series has no value for.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Everything a surface needs to draw one bar chart. Styling is the
/// surface's business.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Stable identifier, also used as the output file stem.
    pub id: String,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    fn single(
        id: &str,
        title: &str,
        x_title: &str,
        y_title: &str,
        points: Vec<(String, f64)>,
    ) -> Self {
        let (categories, values): (Vec<_>, Vec<_>) =
            points.into_iter().map(|(label, v)| (label, Some(v))).unzip();
        Self {
            id: id.to_string(),
            title: title.to_string(),
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
            categories,
            series: vec![ChartSeries {
                name: y_title.to_string(),
                values,
            }],
        }
    }

    /// Largest value across all series, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

/// Anything that can draw a chart: labelled series in, nothing out.
pub trait ChartSurface {
    fn render(&mut self, chart: &ChartData) -> Result<(), ChartError>;
}

/// Builds the fixed set of summary charts.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn summary_charts(table: &DecodedTable) -> Result<Vec<ChartData>, StatsError> {
        let grade = CategoricalField::GradeClass;
        let gender = CategoricalField::Gender;
        let ethnicity = CategoricalField::Ethnicity;

        let grade_pct = StatsCalculator::category_counts(
            table,
            grade.decoded_column(),
            &grade.lookup().labels(),
        )?
        .into_iter()
        .map(|c| (c.label, c.percentage))
        .collect();

        let gender_counts = Self::counts(table, gender)?;
        let ethnicity_counts = Self::counts(table, ethnicity)?;

        let by_education = Self::means(StatsCalculator::grouped_mean(
            table,
            "GPA",
            CategoricalField::ParentalEducation.decoded_column(),
            &CategoricalField::ParentalEducation.lookup().labels(),
        )?);
        let by_tutoring = Self::means(StatsCalculator::grouped_mean(
            table,
            "GPA",
            CategoricalField::Tutoring.decoded_column(),
            &CategoricalField::Tutoring.lookup().labels(),
        )?);

        Ok(vec![
            ChartData::single(
                "grade_distribution",
                "Grade Class Distribution",
                "Grade Class",
                "Students (%)",
                grade_pct,
            ),
            ChartData::single(
                "gender_distribution",
                "Students by Gender",
                "Gender",
                "Students",
                gender_counts,
            ),
            ChartData::single(
                "ethnicity_distribution",
                "Students by Ethnicity",
                "Ethnicity",
                "Students",
                ethnicity_counts,
            ),
            ChartData::single(
                "gpa_by_parental_education",
                "Average GPA by Parental Education",
                "Parental Education",
                "Average GPA",
                by_education,
            ),
            ChartData::single(
                "gpa_by_tutoring",
                "Average GPA by Tutoring",
                "Tutoring",
                "Average GPA",
                by_tutoring,
            ),
            Self::ethnicity_gender_chart(table)?,
        ])
    }

    /// Average GPA with ethnicity on the x axis and one series per gender.
    fn ethnicity_gender_chart(table: &DecodedTable) -> Result<ChartData, StatsError> {
        let ethnicity = CategoricalField::Ethnicity;
        let gender = CategoricalField::Gender;
        let means = StatsCalculator::two_key_grouped_mean(
            table,
            "GPA",
            ethnicity.decoded_column(),
            gender.decoded_column(),
        )?;

        let categories: Vec<String> = ethnicity
            .lookup()
            .labels()
            .into_iter()
            .map(String::from)
            .collect();
        let series = gender
            .lookup()
            .labels()
            .into_iter()
            .map(|g| ChartSeries {
                name: g.to_string(),
                values: categories
                    .iter()
                    .map(|e| means.get(&(e.clone(), g.to_string())).copied())
                    .collect(),
            })
            .collect();

        Ok(ChartData {
            id: "gpa_by_ethnicity_gender".to_string(),
            title: "Average GPA by Ethnicity and Gender".to_string(),
            x_title: "Ethnicity".to_string(),
            y_title: "Average GPA".to_string(),
            categories,
            series,
        })
    }

    fn counts(
        table: &DecodedTable,
        field: CategoricalField,
    ) -> Result<Vec<(String, f64)>, StatsError> {
        Ok(StatsCalculator::category_counts(
            table,
            field.decoded_column(),
            &field.lookup().labels(),
        )?
        .into_iter()
        .map(|c| (c.label, c.count as f64))
        .collect())
    }

    fn means(groups: Vec<GroupMean>) -> Vec<(String, f64)> {
        groups.into_iter().map(|g| (g.label, g.mean)).collect()
    }

    /// Render every chart, stopping at the first failure.
    pub fn render_all(
        surface: &mut dyn ChartSurface,
        charts: &[ChartData],
    ) -> Result<(), ChartError> {
        charts.iter().try_for_each(|chart| surface.render(chart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::decoded;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<ChartData>,
    }

    impl ChartSurface for Recorder {
        fn render(&mut self, chart: &ChartData) -> Result<(), ChartError> {
            self.seen.push(chart.clone());
            Ok(())
        }
    }

    fn sample() -> DecodedTable {
        decoded(&[
            (2, 3, 1, 1, 0, 3.8, 12.5),
            (2, 3, 1, 1, 0, 3.2, 10.0),
            (0, 1, 0, 0, 3, 1.9, 4.0),
            (1, 4, 0, 0, 4, 0.9, 2.0),
        ])
    }

    #[test]
    fn builds_fixed_chart_set() {
        let charts = ChartPlotter::summary_charts(&sample()).unwrap();
        let ids: Vec<_> = charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "grade_distribution",
                "gender_distribution",
                "ethnicity_distribution",
                "gpa_by_parental_education",
                "gpa_by_tutoring",
                "gpa_by_ethnicity_gender",
            ]
        );
    }

    #[test]
    fn grade_chart_uses_canonical_order_with_zeros() {
        let charts = ChartPlotter::summary_charts(&sample()).unwrap();
        let grade = &charts[0];
        assert_eq!(grade.categories, vec!["A", "B", "C", "D", "F"]);
        assert_eq!(
            grade.series[0].values,
            vec![Some(50.0), Some(0.0), Some(0.0), Some(25.0), Some(25.0)]
        );
    }

    #[test]
    fn grouped_chart_leaves_gaps_for_missing_pairs() {
        let charts = ChartPlotter::summary_charts(&sample()).unwrap();
        let chart = &charts[5];
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "Male");
        // Asian students in the sample are all female.
        assert_eq!(chart.series[0].values[2], None);
        let asian_female = chart.series[1].values[2].unwrap();
        assert!((asian_female - 3.5).abs() < 1e-9);
        assert_eq!(chart.max_value(), Some(3.5));
    }

    #[test]
    fn render_all_hands_each_chart_to_surface() {
        let charts = ChartPlotter::summary_charts(&sample()).unwrap();
        let mut recorder = Recorder::default();
        ChartPlotter::render_all(&mut recorder, &charts).unwrap();
        assert_eq!(recorder.seen, charts);
    }
}
