//! Lookup Tables Module
//! Static code-to-label mappings for the categorical student fields.

/// Label emitted for codes outside a table's domain and for missing codes.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Maps small integer codes to human-readable labels.
///
/// Entries are kept in code order, which doubles as the canonical display
/// order of the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTable {
    name: &'static str,
    entries: &'static [(i64, &'static str)],
}

pub const ETHNICITY: LookupTable = LookupTable::new(
    "ethnicity",
    &[
        (0, "Caucasian"),
        (1, "African American"),
        (2, "Asian"),
        (3, "Other"),
    ],
);

pub const PARENTAL_EDUCATION: LookupTable = LookupTable::new(
    "parental_education",
    &[
        (0, "None"),
        (1, "High School"),
        (2, "Some College"),
        (3, "Bachelor's"),
        (4, "Higher"),
    ],
);

pub const TUTORING: LookupTable = LookupTable::new("tutoring", &[(0, "No"), (1, "Yes")]);

pub const GENDER: LookupTable = LookupTable::new("gender", &[(0, "Male"), (1, "Female")]);

pub const GRADE_CLASS: LookupTable = LookupTable::new(
    "grade_class",
    &[(0, "A"), (1, "B"), (2, "C"), (3, "D"), (4, "F")],
);

impl LookupTable {
    pub const fn new(name: &'static str, entries: &'static [(i64, &'static str)]) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Decode a code, falling back to [`UNKNOWN_LABEL`] for misses and nulls.
    pub fn label(&self, code: Option<i64>) -> &'static str {
        code.and_then(|c| {
            self.entries
                .iter()
                .find(|(k, _)| *k == c)
                .map(|(_, label)| *label)
        })
        .unwrap_or(UNKNOWN_LABEL)
    }

    /// Reverse lookup. The sentinel never maps back to a code.
    pub fn code(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(_, l)| *l == label)
            .map(|(code, _)| *code)
    }

    /// Labels in canonical (code) order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, label)| *label).collect()
    }

    pub fn codes(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|(code, _)| *code)
    }
}

/// The five categorical fields of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Ethnicity,
    ParentalEducation,
    Tutoring,
    Gender,
    GradeClass,
}

impl CategoricalField {
    /// Decode order.
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Ethnicity,
        CategoricalField::ParentalEducation,
        CategoricalField::Tutoring,
        CategoricalField::Gender,
        CategoricalField::GradeClass,
    ];

    pub fn source_column(&self) -> &'static str {
        match self {
            CategoricalField::Ethnicity => "Ethnicity",
            CategoricalField::ParentalEducation => "ParentalEducation",
            CategoricalField::Tutoring => "Tutoring",
            CategoricalField::Gender => "Gender",
            CategoricalField::GradeClass => "GradeClass",
        }
    }

    pub fn decoded_column(&self) -> &'static str {
        match self {
            CategoricalField::Ethnicity => "Ethnicity_Decoded",
            CategoricalField::ParentalEducation => "Education_Decoded",
            CategoricalField::Tutoring => "Tutoring_Decoded",
            CategoricalField::Gender => "Gender_Decoded",
            CategoricalField::GradeClass => "GradeClass_Decoded",
        }
    }

    pub fn lookup(&self) -> LookupTable {
        match self {
            CategoricalField::Ethnicity => ETHNICITY,
            CategoricalField::ParentalEducation => PARENTAL_EDUCATION,
            CategoricalField::Tutoring => TUTORING,
            CategoricalField::Gender => GENDER,
            CategoricalField::GradeClass => GRADE_CLASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn in_domain_codes_round_trip() {
        for field in CategoricalField::ALL {
            let table = field.lookup();
            let mut seen = HashSet::new();
            for code in table.codes() {
                let label = table.label(Some(code));
                assert_ne!(label, UNKNOWN_LABEL);
                assert!(seen.insert(label), "duplicate label {label} in {}", table.name());
                assert_eq!(table.code(label), Some(code));
            }
        }
    }

    #[test]
    fn out_of_domain_and_missing_codes_are_unknown() {
        assert_eq!(ETHNICITY.label(Some(9)), UNKNOWN_LABEL);
        assert_eq!(GENDER.label(Some(-1)), UNKNOWN_LABEL);
        assert_eq!(GRADE_CLASS.label(None), UNKNOWN_LABEL);
        assert_eq!(ETHNICITY.code(UNKNOWN_LABEL), None);
    }

    #[test]
    fn labels_follow_code_order() {
        assert_eq!(GRADE_CLASS.labels(), vec!["A", "B", "C", "D", "F"]);
        assert_eq!(GENDER.labels(), vec!["Male", "Female"]);
        assert_eq!(PARENTAL_EDUCATION.label(Some(3)), "Bachelor's");
    }
}
