//! Criterion registry, deduction table, and grade thresholds.
//!
//! Weights sum to 1, so a perfect run across all seven criteria yields an
//! overall score of exactly 100.

use super::Severity;
use serde::{Serialize, Serializer};
use std::fmt;

/// Points deducted per issue, by severity.
pub const SEVERITY_DEDUCTIONS: [(Severity, u32); 4] = [
    (Severity::Critical, 4),
    (Severity::High, 3),
    (Severity::Medium, 2),
    (Severity::Low, 1),
];

/// Minimum overall score for each passing grade, best first. Anything below
/// the last threshold is an F.
pub const GRADE_THRESHOLDS: [(u32, Grade); 4] = [
    (90, Grade::A),
    (80, Grade::B),
    (70, Grade::C),
    (60, Grade::D),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// The seven scoring dimensions, in registry order.
pub enum Criterion {
    SchemaTypes,
    Descriptions,
    PathsOperations,
    ResponseCodes,
    Examples,
    Security,
    BestPractices,
}

impl Criterion {
    pub const ALL: [Criterion; 7] = [
        Criterion::SchemaTypes,
        Criterion::Descriptions,
        Criterion::PathsOperations,
        Criterion::ResponseCodes,
        Criterion::Examples,
        Criterion::Security,
        Criterion::BestPractices,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Criterion::SchemaTypes => "Schema & Types",
            Criterion::Descriptions => "Descriptions & Documentation",
            Criterion::PathsOperations => "Paths & Operations",
            Criterion::ResponseCodes => "Response Codes",
            Criterion::Examples => "Examples & Samples",
            Criterion::Security => "Security",
            Criterion::BestPractices => "Miscellaneous Best Practices",
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            Criterion::SchemaTypes | Criterion::Descriptions => 0.2,
            Criterion::PathsOperations | Criterion::ResponseCodes => 0.15,
            Criterion::Examples | Criterion::Security | Criterion::BestPractices => 0.1,
        }
    }

    pub fn max_score(self) -> u32 {
        match self {
            Criterion::SchemaTypes | Criterion::Descriptions => 20,
            Criterion::PathsOperations | Criterion::ResponseCodes => 15,
            Criterion::Examples | Criterion::Security | Criterion::BestPractices => 10,
        }
    }

    pub fn from_name(name: &str) -> Option<Criterion> {
        Criterion::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
/// Letter grade derived from the overall score.
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn for_score(score: u32) -> Grade {
        GRADE_THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Grade::A => "Excellent",
            Grade::B => "Good",
            Grade::C => "Average",
            Grade::D => "Below Average",
            Grade::F => "Poor",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let sum: f64 = Criterion::ALL.iter().map(|c| c.weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::for_score(100), Grade::A);
        assert_eq!(Grade::for_score(90), Grade::A);
        assert_eq!(Grade::for_score(89), Grade::B);
        assert_eq!(Grade::for_score(80), Grade::B);
        assert_eq!(Grade::for_score(70), Grade::C);
        assert_eq!(Grade::for_score(60), Grade::D);
        assert_eq!(Grade::for_score(59), Grade::F);
        assert_eq!(Grade::for_score(0), Grade::F);
    }

    #[test]
    fn test_deduction_table() {
        assert_eq!(Severity::Critical.deduction(), 4);
        assert_eq!(Severity::High.deduction(), 3);
        assert_eq!(Severity::Medium.deduction(), 2);
        assert_eq!(Severity::Low.deduction(), 1);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Criterion::from_name("Security"), Some(Criterion::Security));
        assert_eq!(Criterion::from_name("Non-existent Analyzer"), None);
        for c in Criterion::ALL {
            assert_eq!(Criterion::from_name(c.name()), Some(c));
        }
    }
}
