//! Scoring aggregator.
//!
//! Runs every registered analyzer over the same document (in parallel with
//! rayon), normalizes each raw score by its weight, and folds the results
//! into a [`ScoringResult`]. A failing or panicking analyzer never aborts the
//! run: its criterion scores zero and carries one synthetic critical issue.

use crate::analyzers::{default_analyzers, AnalysisOptions, Analyzer};
use crate::error::AnalyzerError;
use crate::models::document::Document;
use crate::models::{Criterion, CriterionResult, Grade, Issue, IssueSummary, ScoringResult, Severity};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Outcome of one analyzer invocation.
#[derive(Debug)]
pub enum AnalyzerOutcome {
    Success(CriterionResult),
    Failure(Criterion, AnalyzerError),
}

impl AnalyzerOutcome {
    /// Collapse into a result, substituting a zero score on failure.
    pub fn into_result(self) -> CriterionResult {
        match self {
            AnalyzerOutcome::Success(r) => r,
            AnalyzerOutcome::Failure(c, err) => failure_result(c, &err),
        }
    }
}

fn failure_result(c: Criterion, err: &AnalyzerError) -> CriterionResult {
    CriterionResult {
        criterion: c,
        score: 0,
        max_score: c.max_score(),
        weight: c.weight(),
        weighted_score: 0.0,
        issues: vec![Issue::new(
            "N/A",
            None,
            "Analyzer",
            format!("Failed to analyze: {}", err),
            Severity::Critical,
            "Fix the analyzer implementation or the OpenAPI specification",
            c,
        )],
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub struct ScoringEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
    opts: AnalysisOptions,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        ScoringEngine::new(AnalysisOptions::default())
    }
}

impl ScoringEngine {
    /// Engine with the seven built-in analyzers.
    pub fn new(opts: AnalysisOptions) -> Self {
        ScoringEngine {
            analyzers: default_analyzers(),
            opts,
        }
    }

    /// Engine with a custom analyzer set. Criteria without an analyzer
    /// fail soft like a failing analyzer would.
    pub fn with_analyzers(analyzers: Vec<Box<dyn Analyzer>>, opts: AnalysisOptions) -> Self {
        ScoringEngine { analyzers, opts }
    }

    /// Criterion names in registry order.
    pub fn available_criteria() -> Vec<&'static str> {
        Criterion::ALL.iter().map(|c| c.name()).collect()
    }

    pub fn has_analyzer(&self, name: &str) -> bool {
        Criterion::from_name(name)
            .is_some_and(|c| self.analyzers.iter().any(|a| a.criterion() == c))
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.opts
    }

    /// Run one criterion, catching errors and panics.
    pub fn run_criterion(&self, c: Criterion, doc: &Document) -> AnalyzerOutcome {
        let Some(analyzer) = self.analyzers.iter().find(|a| a.criterion() == c) else {
            return AnalyzerOutcome::Failure(
                c,
                AnalyzerError::Failed(format!("no analyzer registered for \"{}\"", c)),
            );
        };
        let opts = self.opts;
        match panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(doc, &opts))) {
            Ok(Ok(result)) => AnalyzerOutcome::Success(result),
            Ok(Err(err)) => AnalyzerOutcome::Failure(c, err),
            Err(payload) => AnalyzerOutcome::Failure(c, AnalyzerError::Panicked(panic_message(payload))),
        }
    }

    pub fn score(&self, doc: &Document) -> ScoringResult {
        info!(title = doc.title(), "scoring document");

        let criterion_results: Vec<CriterionResult> = Criterion::ALL
            .par_iter()
            .map(|c| match self.run_criterion(*c, doc) {
                AnalyzerOutcome::Success(r) => {
                    debug!(criterion = %c, score = r.score, max = r.max_score, issues = r.issues.len(), "criterion scored");
                    r
                }
                failure => {
                    if let AnalyzerOutcome::Failure(_, err) = &failure {
                        warn!(criterion = %c, error = %err, "analyzer failed");
                    }
                    failure.into_result()
                }
            })
            .collect();

        let total: f64 = criterion_results.iter().map(|r| r.weighted_score).sum();
        let overall_score = (total.round().clamp(0.0, 100.0)) as u32;
        let summary = IssueSummary::from_issues(criterion_results.iter().flat_map(|r| r.issues.iter()));
        let total_issues = summary.total();

        info!(score = overall_score, issues = total_issues, "scoring complete");

        ScoringResult {
            overall_score,
            grade: Grade::for_score(overall_score),
            criterion_results,
            total_issues,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::Findings;
    use serde_json::json;

    struct Failing;
    impl Analyzer for Failing {
        fn criterion(&self) -> Criterion {
            Criterion::Security
        }
        fn analyze(&self, _: &Document, _: &AnalysisOptions) -> Result<CriterionResult, AnalyzerError> {
            Err(AnalyzerError::Failed("boom".into()))
        }
    }

    struct Panicking;
    impl Analyzer for Panicking {
        fn criterion(&self) -> Criterion {
            Criterion::Examples
        }
        fn analyze(&self, _: &Document, _: &AnalysisOptions) -> Result<CriterionResult, AnalyzerError> {
            panic!("kaboom")
        }
    }

    struct Perfect(Criterion);
    impl Analyzer for Perfect {
        fn criterion(&self) -> Criterion {
            self.0
        }
        fn analyze(&self, _: &Document, _: &AnalysisOptions) -> Result<CriterionResult, AnalyzerError> {
            Ok(Findings::new(self.0).finish())
        }
    }

    fn empty_doc() -> Document {
        Document::new(json!({"openapi": "3.0.0", "info": {"title": "t", "version": "1.0.0"}, "paths": {}}))
    }

    #[test]
    fn test_perfect_analyzers_give_full_score() {
        let analyzers: Vec<Box<dyn Analyzer>> = Criterion::ALL
            .iter()
            .map(|c| Box::new(Perfect(*c)) as Box<dyn Analyzer>)
            .collect();
        let engine = ScoringEngine::with_analyzers(analyzers, AnalysisOptions::default());
        let r = engine.score(&empty_doc());
        assert_eq!(r.overall_score, 100);
        assert_eq!(r.grade, Grade::A);
        assert_eq!(r.total_issues, 0);
    }

    #[test]
    fn test_failures_are_soft() {
        let mut analyzers: Vec<Box<dyn Analyzer>> = Criterion::ALL
            .iter()
            .filter(|c| !matches!(c, Criterion::Security | Criterion::Examples | Criterion::BestPractices))
            .map(|c| Box::new(Perfect(*c)) as Box<dyn Analyzer>)
            .collect();
        analyzers.push(Box::new(Failing));
        analyzers.push(Box::new(Panicking));
        let engine = ScoringEngine::with_analyzers(analyzers, AnalysisOptions::default());
        assert!(!engine.has_analyzer("Miscellaneous Best Practices"));
        assert!(engine.has_analyzer("Security"));

        let r = engine.score(&empty_doc());
        assert_eq!(r.criterion_results.len(), 7);
        assert_eq!(r.overall_score, 70);
        assert_eq!(r.summary.critical_issues, 3);

        let security = &r.criterion_results[5];
        assert_eq!(security.criterion, Criterion::Security);
        assert_eq!(security.score, 0);
        assert_eq!(security.issues[0].description, "Failed to analyze: boom");
        assert_eq!(security.issues[0].path, "N/A");
        assert_eq!(security.issues[0].location, "Analyzer");

        let examples = &r.criterion_results[4];
        assert!(examples.issues[0].description.contains("kaboom"));
    }

    #[test]
    fn test_available_criteria() {
        let names = ScoringEngine::available_criteria();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "Schema & Types");
        assert!(ScoringEngine::default().has_analyzer("Response Codes"));
        assert!(!ScoringEngine::default().has_analyzer("Non-existent Analyzer"));
    }
}
