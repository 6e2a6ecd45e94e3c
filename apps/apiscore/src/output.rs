//! Output rendering for the `score`, `validate` and `criteria` commands.
//!
//! Supports `human` (default, colored unless `NO_COLOR`), `json` and
//! `markdown`. The JSON form serializes the scoring result unchanged plus
//! the gate verdict; markdown reuses the report renderer.

use crate::gate::Verdict;
use crate::models::document::Document;
use crate::models::{Criterion, Issue, ScoringResult, Severity};
use crate::report::{self, ReportFormat};
use crate::utils::use_colors;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

/// One scored input, ready for printing.
pub struct Scored<'a> {
    pub source: &'a str,
    pub title: &'a str,
    pub result: &'a ScoringResult,
    pub verdict: &'a Verdict,
}

/// Print a batch of scored documents in the requested format.
pub fn print_scores(items: &[Scored<'_>], output: &str, verbose: bool, threshold: Severity) {
    match output {
        "json" => {
            let out = compose_scores_json(items);
            match serde_json::to_string_pretty(&out) {
                Ok(s) => println!("{}", s),
                Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
            }
        }
        "markdown" => {
            for item in items {
                match report::render(item.result, ReportFormat::Markdown, item.title) {
                    Ok(md) => println!("{}", md),
                    Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
                }
            }
        }
        _ => {
            let color = use_colors(output);
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    println!();
                }
                for line in compose_human(item, verbose, threshold, color) {
                    println!("{}", line);
                }
            }
        }
    }
}

fn paint_grade(text: String, score: u32, color: bool) -> String {
    if !color {
        return text;
    }
    match score {
        90.. => text.green().bold().to_string(),
        70..=89 => text.yellow().bold().to_string(),
        _ => text.red().bold().to_string(),
    }
}

fn severity_tag(sev: Severity, color: bool) -> String {
    let tag = format!("⟦{}⟧", sev);
    if !color {
        return tag;
    }
    match sev {
        Severity::Critical => tag.red().bold().to_string(),
        Severity::High => tag.magenta().bold().to_string(),
        Severity::Medium => tag.yellow().bold().to_string(),
        Severity::Low => tag.blue().to_string(),
    }
}

fn issue_line(issue: &Issue, color: bool) -> String {
    let at = match &issue.operation {
        Some(op) => format!("{} {} @ {}", op.to_uppercase(), issue.path, issue.location),
        None => format!("{} @ {}", issue.path, issue.location),
    };
    let at = if color { at.bold().to_string() } else { at };
    format!(
        "    {} {} — {}\n      ↳ {}",
        severity_tag(issue.severity, color),
        at,
        issue.description,
        issue.suggestion
    )
}

/// Compose the human-readable lines for one document (pure).
pub fn compose_human(item: &Scored<'_>, verbose: bool, threshold: Severity, color: bool) -> Vec<String> {
    let r = item.result;
    let mut lines = Vec::new();
    let header = format!("{} ({})", item.title, item.source);
    lines.push(if color { header.bold().to_string() } else { header });
    lines.push(paint_grade(
        format!(
            "Score: {}/100  Grade: {} ({})",
            r.overall_score,
            r.grade,
            r.grade.description()
        ),
        r.overall_score,
        color,
    ));

    for c in &r.criterion_results {
        lines.push(format!(
            "  {:<30} {:>2}/{:<2} {:>3}%  weighted {:>4.1}  issues {}",
            c.criterion.name(),
            c.score,
            c.max_score,
            c.percentage(),
            c.weighted_score,
            c.issues.len()
        ));
        if verbose {
            let mut shown: Vec<&Issue> = c.issues.iter().filter(|i| i.severity >= threshold).collect();
            shown.sort_by(|a, b| b.severity.cmp(&a.severity));
            lines.extend(shown.into_iter().map(|i| issue_line(i, color)));
        }
    }

    let s = &r.summary;
    let summary = format!(
        "— Summary — total={} critical={} high={} medium={} low={}",
        r.total_issues, s.critical_issues, s.high_issues, s.medium_issues, s.low_issues
    );
    lines.push(if color { summary.bold().to_string() } else { summary });

    lines.push(match item.verdict {
        Verdict::Pass if color => "✔ passed".green().bold().to_string(),
        Verdict::Pass => "✔ passed".to_string(),
        Verdict::Fail(msg) if color => format!("{} {}", "✖ failed:".red().bold(), msg),
        Verdict::Fail(msg) => format!("✖ failed: {}", msg),
    });
    lines
}

/// Compose the JSON payload for a batch of documents (pure).
pub fn compose_scores_json(items: &[Scored<'_>]) -> JsonVal {
    let results: Vec<JsonVal> = items
        .iter()
        .map(|item| {
            let (passed, reason) = match item.verdict {
                Verdict::Pass => (true, None),
                Verdict::Fail(msg) => (false, Some(msg.as_str())),
            };
            json!({
                "source": item.source,
                "title": item.title,
                "result": item.result,
                "passed": passed,
                "reason": reason,
            })
        })
        .collect();
    let failed = items.iter().filter(|i| !i.verdict.passed()).count();
    json!({
        "results": results,
        "summary": {"documents": items.len(), "passed": items.len() - failed, "failed": failed},
    })
}

/// Print the document overview emitted by `validate`.
pub fn print_validation(source: &str, doc: &Document, output: &str) {
    let title = doc.title();
    let version = doc.info().and_then(|i| i.version_text()).unwrap_or_default();
    let paths = doc.paths().count();
    let operations = doc.operations().count();
    match output {
        "json" => println!(
            "{}",
            json!({
                "source": source,
                "valid": true,
                "openapi": doc.openapi_version(),
                "title": title,
                "version": version,
                "paths": paths,
                "operations": operations,
            })
        ),
        _ => {
            let ok = if use_colors(output) {
                "✔ valid".green().bold().to_string()
            } else {
                "✔ valid".to_string()
            };
            println!("{} {}", ok, source);
            println!("  title: {}", title);
            println!("  version: {}", version);
            println!("  paths: {}  operations: {}", paths, operations);
        }
    }
}

/// Print the criterion registry.
pub fn print_criteria(output: &str) {
    match output {
        "json" => println!("{}", compose_criteria_json()),
        _ => {
            for c in Criterion::ALL {
                println!(
                    "{:<30} weight {:>3}%  max {:>2}",
                    c.name(),
                    (c.weight() * 100.0).round(),
                    c.max_score()
                );
            }
        }
    }
}

pub fn compose_criteria_json() -> JsonVal {
    JsonVal::Array(
        Criterion::ALL
            .iter()
            .map(|c| json!({"criterion": c, "weight": c.weight(), "maxScore": c.max_score()}))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CriterionResult, Grade, IssueSummary};

    fn result() -> ScoringResult {
        let issues = vec![
            Issue::new("/a", Some("get"), "responses", "low one", Severity::Low, "fix", Criterion::ResponseCodes),
            Issue::new("/a", Some("get"), "responses", "high one", Severity::High, "fix", Criterion::ResponseCodes),
        ];
        ScoringResult {
            overall_score: 92,
            grade: Grade::A,
            criterion_results: vec![CriterionResult {
                criterion: Criterion::ResponseCodes,
                score: 11,
                max_score: 15,
                weight: 0.15,
                weighted_score: 11.0,
                issues,
            }],
            total_issues: 2,
            summary: IssueSummary {
                high_issues: 1,
                low_issues: 1,
                ..IssueSummary::default()
            },
        }
    }

    #[test]
    fn test_compose_human_threshold_filters_issues() {
        let r = result();
        let verdict = Verdict::Pass;
        let item = Scored { source: "a.yaml", title: "A", result: &r, verdict: &verdict };

        let quiet = compose_human(&item, false, Severity::Low, false);
        assert!(!quiet.iter().any(|l| l.contains("high one")));
        assert_eq!(quiet[1], "Score: 92/100  Grade: A (Excellent)");
        assert_eq!(quiet.last().unwrap(), "✔ passed");

        let loud = compose_human(&item, true, Severity::Medium, false);
        assert!(loud.iter().any(|l| l.contains("⟦high⟧ GET /a @ responses — high one")));
        assert!(!loud.iter().any(|l| l.contains("low one")));
    }

    #[test]
    fn test_compose_scores_json_shape() {
        let r = result();
        let fail = Verdict::Fail("Found 1 critical issue(s)".into());
        let out = compose_scores_json(&[Scored { source: "a.yaml", title: "A", result: &r, verdict: &fail }]);
        assert_eq!(out["summary"]["failed"], 1);
        assert_eq!(out["results"][0]["passed"], false);
        assert_eq!(out["results"][0]["result"]["overallScore"], 92);
        assert_eq!(out["results"][0]["result"]["criterionResults"][0]["criterion"], "Response Codes");
    }

    #[test]
    fn test_compose_criteria_json() {
        let out = compose_criteria_json();
        assert_eq!(out[0]["criterion"], "Schema & Types");
        assert_eq!(out[6]["maxScore"], 10);
    }
}
