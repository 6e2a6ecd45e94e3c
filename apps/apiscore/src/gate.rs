//! Pass/fail policy applied to a scoring result.

use crate::models::ScoringResult;

/// Score below which a document always fails, regardless of `fail_below`.
pub const MINIMUM_PASSING_SCORE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Evaluate in order: explicit threshold, minimum passing score, then any
/// critical issue. The first failing rule decides.
pub fn evaluate(result: &ScoringResult, fail_below: Option<u32>) -> Verdict {
    if let Some(threshold) = fail_below {
        if result.overall_score < threshold {
            return Verdict::Fail(format!(
                "Score {} is below the required threshold of {}",
                result.overall_score, threshold
            ));
        }
    }
    if result.overall_score < MINIMUM_PASSING_SCORE {
        return Verdict::Fail(format!(
            "Score {} is below the minimum passing score of {}",
            result.overall_score, MINIMUM_PASSING_SCORE
        ));
    }
    if result.summary.critical_issues > 0 {
        return Verdict::Fail(format!(
            "Found {} critical issue(s)",
            result.summary.critical_issues
        ));
    }
    Verdict::Pass
}
