//! Rule analyzers, one per criterion.
//!
//! Every analyzer is a stateless value implementing [`Analyzer`]. They share
//! the [`Findings`] collector and the deduction arithmetic in
//! [`calculate_score`].

pub mod conventions;
pub mod descriptions;
pub mod examples;
pub mod paths;
pub mod responses;
pub mod schema;
pub mod security;

use crate::error::AnalyzerError;
use crate::models::document::Document;
use crate::models::{Criterion, CriterionResult, Issue, Severity};

pub use conventions::ConventionsAnalyzer;
pub use descriptions::DescriptionsAnalyzer;
pub use examples::ExamplesAnalyzer;
pub use paths::PathsAnalyzer;
pub use responses::ResponsesAnalyzer;
pub use schema::SchemaAnalyzer;
pub use security::SecurityAnalyzer;

/// Default bound for recursive schema walks.
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Knobs shared by every analyzer run.
pub struct AnalysisOptions {
    pub max_schema_depth: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            max_schema_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }
}

/// A single criterion's rule set.
pub trait Analyzer: Send + Sync {
    /// The criterion every produced issue is attributed to.
    fn criterion(&self) -> Criterion;

    /// Walk the document read-only and score it.
    fn analyze(
        &self,
        doc: &Document,
        opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError>;
}

/// The seven built-in analyzers in registry order.
pub fn default_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(SchemaAnalyzer),
        Box::new(DescriptionsAnalyzer),
        Box::new(PathsAnalyzer),
        Box::new(ResponsesAnalyzer),
        Box::new(ExamplesAnalyzer),
        Box::new(SecurityAnalyzer),
        Box::new(ConventionsAnalyzer),
    ]
}

/// Deduct per-issue points from `max_score`, clamped to `[0, max_score]`.
///
/// A criterion with nothing to check scores full marks. Beyond that guard the
/// checkable count plays no part: the score depends only on the issues.
pub fn calculate_score(issues: &[Issue], checkable: usize, max_score: u32) -> u32 {
    if checkable == 0 {
        return max_score;
    }
    let deductions: u32 = issues.iter().map(|i| i.severity.deduction()).sum();
    max_score.saturating_sub(deductions).min(max_score)
}

/// Turn a raw score into its 0..=weight*100 contribution.
pub fn weighted_score(score: u32, max_score: u32, weight: f64) -> f64 {
    if max_score == 0 {
        return 0.0;
    }
    (score as f64 / max_score as f64) * weight * 100.0
}

/// Issue accumulator for one analyzer run.
pub struct Findings {
    criterion: Criterion,
    issues: Vec<Issue>,
    checkable: usize,
}

impl Findings {
    pub fn new(criterion: Criterion) -> Self {
        Findings {
            criterion,
            issues: Vec::new(),
            checkable: 0,
        }
    }

    /// Record one issue attributed to this run's criterion.
    pub fn push(
        &mut self,
        path: impl Into<String>,
        operation: Option<&str>,
        location: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        suggestion: impl Into<String>,
    ) {
        self.issues.push(Issue::new(
            path,
            operation,
            location,
            description,
            severity,
            suggestion,
            self.criterion,
        ));
    }

    /// Add to the checkable-item count.
    pub fn count(&mut self, n: usize) {
        self.checkable += n;
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn finish(self) -> CriterionResult {
        let c = self.criterion;
        let max_score = c.max_score();
        let score = calculate_score(&self.issues, self.checkable, max_score);
        CriterionResult {
            criterion: c,
            score,
            max_score,
            weight: c.weight(),
            weighted_score: weighted_score(score, max_score, c.weight()),
            issues: self.issues,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn issue(sev: Severity) -> Issue {
        Issue::new("p", None, "l", "d", sev, "s", Criterion::SchemaTypes)
    }

    #[test]
    fn test_calculate_score_deductions() {
        let issues = vec![
            issue(Severity::Critical),
            issue(Severity::High),
            issue(Severity::Medium),
            issue(Severity::Low),
        ];
        assert_eq!(calculate_score(&issues, 5, 20), 10);
        assert_eq!(calculate_score(&issues, 5, 5), 0);
        assert_eq!(calculate_score(&[], 5, 15), 15);
    }

    #[test]
    fn test_calculate_score_ignores_count_except_zero() {
        let issues = vec![issue(Severity::High)];
        assert_eq!(calculate_score(&issues, 1, 10), 7);
        assert_eq!(calculate_score(&issues, 1000, 10), 7);
        assert_eq!(calculate_score(&issues, 0, 10), 10);
    }

    #[test]
    fn test_findings_attributes_criterion() {
        let mut f = Findings::new(Criterion::Security);
        f.count(1);
        f.push("x", Some("get"), "loc", "desc", Severity::Medium, "fix");
        let r = f.finish();
        assert_eq!(r.score, 8);
        assert_eq!(r.max_score, 10);
        assert!((r.weighted_score - 8.0).abs() < 1e-9);
        assert!(r.issues.iter().all(|i| i.criterion == Criterion::Security));
    }

    #[test]
    fn test_default_analyzers_follow_registry_order() {
        let got: Vec<_> = default_analyzers().iter().map(|a| a.criterion()).collect();
        assert_eq!(got, Criterion::ALL.to_vec());
    }
}
