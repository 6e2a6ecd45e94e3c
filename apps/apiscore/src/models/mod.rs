//! Shared data models for scoring outputs, the criterion registry, and the
//! document views analyzers walk.

pub mod criteria;
pub mod document;

pub use criteria::{Criterion, Grade};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Issue severity, ordered from least to most severe.
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Most severe first; the order reports group issues in.
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Points deducted from a criterion's max score per issue.
    pub fn deduction(self) -> u32 {
        criteria::SEVERITY_DEDUCTIONS
            .iter()
            .find(|(sev, _)| *sev == self)
            .map(|(_, points)| *points)
            .unwrap_or(0)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!(
                "unknown severity '{}' (expected low|medium|high|critical)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A single diagnostic finding tied to a document location.
pub struct Issue {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    pub location: String,
    pub description: String,
    pub severity: Severity,
    pub suggestion: String,
    pub criterion: Criterion,
}

impl Issue {
    /// Pure constructor shared by every analyzer.
    pub fn new(
        path: impl Into<String>,
        operation: Option<&str>,
        location: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        suggestion: impl Into<String>,
        criterion: Criterion,
    ) -> Self {
        Issue {
            path: path.into(),
            operation: operation.map(str::to_string),
            location: location.into(),
            description: description.into(),
            severity,
            suggestion: suggestion.into(),
            criterion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of one analyzer run.
pub struct CriterionResult {
    pub criterion: Criterion,
    pub score: u32,
    pub max_score: u32,
    pub weight: f64,
    pub weighted_score: f64,
    pub issues: Vec<Issue>,
}

impl CriterionResult {
    /// Rounded percentage of the max score reached.
    pub fn percentage(&self) -> u32 {
        if self.max_score == 0 {
            return 0;
        }
        ((self.score as f64 / self.max_score as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Issue counts per severity.
pub struct IssueSummary {
    pub critical_issues: usize,
    pub high_issues: usize,
    pub medium_issues: usize,
    pub low_issues: usize,
}

impl IssueSummary {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut summary = IssueSummary::default();
        for issue in issues {
            match issue.severity {
                Severity::Critical => summary.critical_issues += 1,
                Severity::High => summary.high_issues += 1,
                Severity::Medium => summary.medium_issues += 1,
                Severity::Low => summary.low_issues += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.critical_issues + self.high_issues + self.medium_issues + self.low_issues
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Final result of one scoring call.
pub struct ScoringResult {
    pub overall_score: u32,
    pub grade: Grade,
    pub criterion_results: Vec<CriterionResult>,
    pub total_issues: usize,
    pub summary: IssueSummary,
}

impl ScoringResult {
    /// Iterate every issue across criteria in registry order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.criterion_results.iter().flat_map(|c| c.issues.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_and_order() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert!("urgent".parse::<Severity>().is_err());
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_issue_serializes_without_missing_operation() {
        let issue = Issue::new(
            "info",
            None,
            "contact",
            "API contact information is missing",
            Severity::Medium,
            "Add contact information",
            Criterion::Descriptions,
        );
        let v = serde_json::to_value(&issue).unwrap();
        assert!(v.get("operation").is_none());
        assert_eq!(v["severity"], "medium");
        assert_eq!(v["criterion"], "Descriptions & Documentation");
    }

    #[test]
    fn test_summary_counts() {
        let mk = |sev| Issue::new("p", None, "l", "d", sev, "s", Criterion::Security);
        let issues = vec![
            mk(Severity::Low),
            mk(Severity::Low),
            mk(Severity::Critical),
            mk(Severity::Medium),
        ];
        let summary = IssueSummary::from_issues(&issues);
        assert_eq!(summary.low_issues, 2);
        assert_eq!(summary.critical_issues, 1);
        assert_eq!(summary.high_issues, 0);
        assert_eq!(summary.total(), issues.len());
    }
}
