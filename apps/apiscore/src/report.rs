//! Report rendering and export.
//!
//! A scoring result renders into three self-contained formats:
//! - `json`: metadata, summary, per-criterion analysis, statistics and
//!   recommendations as one pretty-printed object.
//! - `markdown`: headline score, summary and breakdown tables, then one
//!   section per criterion with issues grouped from critical to low.
//! - `html`: a standalone page with the same sections and inline styles.
//!
//! `export` writes `<sanitized-title>-report.<ext>` files into a directory.

use crate::error::ReportError;
use crate::models::{CriterionResult, Issue, ScoringResult, Severity};
use crate::utils::sanitize_file_stem;
use serde_json::{json, Value as JsonVal};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

const GENERATOR: &str = "apiscore";
/// Criteria at or above this percentage count as passed in statistics.
const PASSING_PERCENTAGE: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Html,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Json, ReportFormat::Markdown, ReportFormat::Html];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }

    /// Parse a comma-separated list; `all` expands to every format.
    /// Duplicates are dropped, first occurrence wins.
    pub fn parse_list(s: &str) -> Result<Vec<ReportFormat>, ReportError> {
        let mut out = Vec::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let formats: Vec<ReportFormat> = if token.eq_ignore_ascii_case("all") {
                Self::ALL.to_vec()
            } else {
                vec![token.parse()?]
            };
            for f in formats {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        if out.is_empty() {
            return Err(ReportError::UnknownFormat(s.to_string()));
        }
        Ok(out)
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Render a report body in memory.
pub fn render(result: &ScoringResult, format: ReportFormat, title: &str) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&compose_json(result, title))?),
        ReportFormat::Markdown => Ok(render_markdown(result, title)),
        ReportFormat::Html => Ok(render_html(result, title)),
    }
}

pub fn file_name(title: &str, format: ReportFormat) -> String {
    format!("{}-report.{}", sanitize_file_stem(title), format.extension())
}

/// Write one file per format into `dir`, creating it when missing.
pub fn export(
    result: &ScoringResult,
    formats: &[ReportFormat],
    dir: &Path,
    title: &str,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let body = render(result, *format, title)?;
        let path = dir.join(file_name(title, *format));
        fs::write(&path, body).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(format = format.as_str(), path = %path.display(), "report written");
        written.push(path);
    }
    Ok(written)
}

fn worst(result: &ScoringResult) -> Option<&CriterionResult> {
    result
        .criterion_results
        .iter()
        .fold(None, |acc: Option<&CriterionResult>, c| match acc {
            Some(w) if w.percentage() <= c.percentage() => Some(w),
            _ => Some(c),
        })
}

fn best(result: &ScoringResult) -> Option<&CriterionResult> {
    result
        .criterion_results
        .iter()
        .fold(None, |acc: Option<&CriterionResult>, c| match acc {
            Some(b) if b.percentage() >= c.percentage() => Some(b),
            _ => Some(c),
        })
}

fn average_percentage(result: &ScoringResult) -> u32 {
    let n = result.criterion_results.len();
    if n == 0 {
        return 0;
    }
    let sum: u32 = result.criterion_results.iter().map(|c| c.percentage()).sum();
    (sum as f64 / n as f64).round() as u32
}

/// Prioritized advice derived from the score, severity counts and weak
/// criteria.
pub fn recommendations(result: &ScoringResult) -> Vec<String> {
    let mut out = Vec::new();
    if result.overall_score < 60 {
        out.push("Critical: Overall score is below 60. Immediate action required to improve API quality.".to_string());
    } else if result.overall_score < 80 {
        out.push("Warning: Overall score could be improved. Focus on addressing high and critical issues.".to_string());
    }
    if result.summary.critical_issues > 0 {
        out.push(format!(
            "Address {} critical issue(s) immediately.",
            result.summary.critical_issues
        ));
    }
    if result.summary.high_issues > 0 {
        out.push(format!(
            "Resolve {} high-priority issue(s) soon.",
            result.summary.high_issues
        ));
    }
    for c in &result.criterion_results {
        let pct = c.percentage();
        if pct < 50 {
            out.push(format!(
                "Focus on improving \"{}\": currently at {}%.",
                c.criterion, pct
            ));
        }
    }
    if result.summary.medium_issues + result.summary.low_issues > 10 {
        out.push("Consider establishing API documentation standards to prevent future issues.".to_string());
    }
    out
}

fn criterion_brief(c: &CriterionResult) -> JsonVal {
    json!({
        "criterion": c.criterion,
        "score": c.score,
        "maxScore": c.max_score,
        "percentage": c.percentage(),
        "issueCount": c.issues.len(),
    })
}

/// Compose the JSON report object (pure) for testing and export.
pub fn compose_json(result: &ScoringResult, title: &str) -> JsonVal {
    let criteria: Vec<JsonVal> = result
        .criterion_results
        .iter()
        .map(|c| {
            json!({
                "criterion": c.criterion,
                "score": c.score,
                "maxScore": c.max_score,
                "percentage": c.percentage(),
                "weight": c.weight,
                "weightedScore": c.weighted_score,
                "issueCount": c.issues.len(),
                "issues": c.issues,
            })
        })
        .collect();
    let passed = result
        .criterion_results
        .iter()
        .filter(|c| c.percentage() >= PASSING_PERCENTAGE)
        .count();

    json!({
        "metadata": {
            "apiTitle": title,
            "generator": GENERATOR,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "summary": {
            "overallScore": result.overall_score,
            "grade": result.grade,
            "gradeDescription": result.grade.description(),
            "totalIssues": result.total_issues,
            "issueBreakdown": result.summary,
        },
        "analysis": { "criterionResults": criteria },
        "statistics": {
            "criteriaCount": result.criterion_results.len(),
            "passedCriteria": passed,
            "averageScore": average_percentage(result),
            "worstPerformingCriterion": worst(result).map(criterion_brief),
            "bestPerformingCriterion": best(result).map(criterion_brief),
        },
        "recommendations": recommendations(result),
    })
}

fn group_by_severity(issues: &[Issue]) -> Vec<(Severity, Vec<&Issue>)> {
    Severity::DESCENDING
        .iter()
        .map(|sev| (*sev, issues.iter().filter(|i| i.severity == *sev).collect::<Vec<_>>()))
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

fn status_text(pct: u32) -> &'static str {
    match pct {
        90.. => "Excellent",
        80..=89 => "Good",
        60..=79 => "Fair",
        _ => "Needs Improvement",
    }
}

fn capitalized(sev: Severity) -> &'static str {
    match sev {
        Severity::Critical => "Critical",
        Severity::High => "High",
        Severity::Medium => "Medium",
        Severity::Low => "Low",
    }
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '|') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn issue_location(issue: &Issue) -> String {
    match &issue.operation {
        Some(op) => format!("`{}` > `{}` > `{}`", issue.path, op, issue.location),
        None => format!("`{}` > `{}`", issue.path, issue.location),
    }
}

fn render_markdown(result: &ScoringResult, title: &str) -> String {
    let mut md = String::new();
    md.push_str(&format!("# OpenAPI Score Report: {}\n\n", escape_markdown(title)));
    md.push_str(&format!(
        "**Scorer:** {} v{}\n\n---\n\n",
        GENERATOR,
        env!("CARGO_PKG_VERSION")
    ));

    md.push_str("## Overall Score\n\n");
    md.push_str(&format!(
        "### {}/100 | Grade: {}\n**{}**\n\n",
        result.overall_score,
        result.grade,
        result.grade.description()
    ));

    let s = &result.summary;
    md.push_str("## Executive Summary\n\n| Metric | Count |\n|--------|-------|\n");
    md.push_str(&format!("| **Total Issues** | {} |\n", result.total_issues));
    md.push_str(&format!("| **Critical Issues** | {} |\n", s.critical_issues));
    md.push_str(&format!("| **High Issues** | {} |\n", s.high_issues));
    md.push_str(&format!("| **Medium Issues** | {} |\n", s.medium_issues));
    md.push_str(&format!("| **Low Issues** | {} |\n\n", s.low_issues));

    md.push_str("## Detailed Analysis\n\n### Scoring Breakdown\n\n");
    md.push_str("| Criterion | Score | Percentage | Weight | Weighted Score | Issues |\n");
    md.push_str("|-----------|-------|------------|--------|----------------|--------|\n");
    for c in &result.criterion_results {
        md.push_str(&format!(
            "| **{}** | {}/{} | {}% | {}% | {:.1} | {} |\n",
            c.criterion,
            c.score,
            c.max_score,
            c.percentage(),
            (c.weight * 100.0).round(),
            c.weighted_score,
            c.issues.len()
        ));
    }
    md.push('\n');

    for c in &result.criterion_results {
        let pct = c.percentage();
        md.push_str(&format!("### {}\n\n", c.criterion));
        md.push_str(&format!(
            "**Score:** {}/{} ({}%) | **Status:** {}  \n**Weight:** {}% | **Weighted Score:** {:.1}\n\n",
            c.score,
            c.max_score,
            pct,
            status_text(pct),
            (c.weight * 100.0).round(),
            c.weighted_score
        ));
        if c.issues.is_empty() {
            md.push_str("No issues found in this category.\n\n");
        } else {
            md.push_str(&format!("#### Issues Found ({})\n\n", c.issues.len()));
            for (sev, group) in group_by_severity(&c.issues) {
                md.push_str(&format!("##### {} Issues ({})\n\n", capitalized(sev), group.len()));
                for (idx, issue) in group.iter().enumerate() {
                    md.push_str(&format!(
                        "**{}.** {}\n\n- **Location:** {}\n- **Suggestion:** {}\n\n",
                        idx + 1,
                        escape_markdown(&issue.description),
                        issue_location(issue),
                        escape_markdown(&issue.suggestion)
                    ));
                }
            }
        }
        md.push_str("---\n\n");
    }

    md.push_str("## Recommendations\n\n");
    let recs = recommendations(result);
    if recs.is_empty() {
        md.push_str("No action required. Keep the document at this level.\n\n");
    }
    for rec in recs {
        md.push_str(&format!("- {}\n", escape_markdown(&rec)));
    }
    if let Some(w) = worst(result).filter(|w| w.percentage() < 70) {
        md.push_str(&format!(
            "\n### Focus Area: {}\n\nThis category scored **{}/{}** ({}%) and needs attention.\n",
            w.criterion,
            w.score,
            w.max_score,
            w.percentage()
        ));
    }
    md
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

fn score_color(pct: u32) -> &'static str {
    match pct {
        90.. => "#38a169",
        70..=89 => "#d69e2e",
        50..=69 => "#dd6b20",
        _ => "#e53e3e",
    }
}

const HTML_STYLE: &str = "body{font-family:-apple-system,'Segoe UI',Roboto,sans-serif;line-height:1.5;margin:0;background:#f7fafc;color:#2d3748}\
main{max-width:960px;margin:0 auto;padding:2rem}\
header{text-align:center}\
.score{display:inline-block;color:#fff;border-radius:12px;padding:1rem 2rem;font-size:2rem;font-weight:700}\
table{border-collapse:collapse;width:100%;margin:1rem 0}\
th,td{border:1px solid #e2e8f0;padding:.4rem .6rem;text-align:left}\
article{background:#fff;border-radius:12px;padding:1rem 1.5rem;margin:1rem 0;box-shadow:0 2px 8px rgba(0,0,0,.06)}\
.bar{background:#edf2f7;border-radius:6px;height:8px}\
.fill{height:8px;border-radius:6px}\
.issue{border-left:4px solid #cbd5e0;padding:.25rem .75rem;margin:.5rem 0}\
.critical{border-color:#e53e3e}.high{border-color:#dd6b20}.medium{border-color:#d69e2e}.low{border-color:#38a169}\
code{background:#edf2f7;padding:0 .25rem;border-radius:4px}";

fn render_html(result: &ScoringResult, title: &str) -> String {
    let title = escape_html(title);
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<meta name=\"generator\" content=\"{}\">\n", GENERATOR));
    html.push_str(&format!("<title>OpenAPI Score Report - {}</title>\n", title));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n<main>\n", HTML_STYLE));

    html.push_str(&format!(
        "<header>\n<h1>OpenAPI Score Report</h1>\n<h2>{}</h2>\n<div class=\"score\" style=\"background:{};\">{}/100 &middot; Grade {}</div>\n<p>{}</p>\n</header>\n",
        title,
        score_color(result.overall_score),
        result.overall_score,
        result.grade,
        result.grade.description()
    ));

    let s = &result.summary;
    html.push_str("<section>\n<h2>Executive Summary</h2>\n<table>\n<tr><th>Metric</th><th>Count</th></tr>\n");
    for (label, count) in [
        ("Total Issues", result.total_issues),
        ("Critical Issues", s.critical_issues),
        ("High Priority", s.high_issues),
        ("Medium Priority", s.medium_issues),
        ("Low Priority", s.low_issues),
    ] {
        html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>\n", label, count));
    }
    html.push_str("</table>\n</section>\n");

    html.push_str("<section>\n<h2>Detailed Scoring Analysis</h2>\n");
    for c in &result.criterion_results {
        let pct = c.percentage();
        html.push_str(&format!(
            "<article>\n<h3>{}</h3>\n<p>Score {}/{} ({}%) &middot; Weight {}% &middot; Weighted {:.1} &middot; {}</p>\n",
            escape_html(c.criterion.name()),
            c.score,
            c.max_score,
            pct,
            (c.weight * 100.0).round(),
            c.weighted_score,
            status_text(pct)
        ));
        html.push_str(&format!(
            "<div class=\"bar\"><div class=\"fill\" style=\"width:{}%;background:{};\"></div></div>\n",
            pct.min(100),
            score_color(pct)
        ));
        if c.issues.is_empty() {
            html.push_str("<p>No issues found in this category.</p>\n");
        }
        for (sev, group) in group_by_severity(&c.issues) {
            html.push_str(&format!("<h4>{} Issues ({})</h4>\n", capitalized(sev), group.len()));
            for issue in group {
                let op = issue
                    .operation
                    .as_deref()
                    .map(|o| format!(" <code>{}</code>", escape_html(o)))
                    .unwrap_or_default();
                html.push_str(&format!(
                    "<div class=\"issue {}\"><p>{}</p><p><code>{}</code>{} <code>{}</code></p><p><em>{}</em></p></div>\n",
                    sev,
                    escape_html(&issue.description),
                    escape_html(&issue.path),
                    op,
                    escape_html(&issue.location),
                    escape_html(&issue.suggestion)
                ));
            }
        }
        html.push_str("</article>\n");
    }
    html.push_str("</section>\n");

    let recs = recommendations(result);
    if !recs.is_empty() {
        html.push_str("<section>\n<h2>Recommendations</h2>\n<ul>\n");
        for rec in recs {
            html.push_str(&format!("<li>{}</li>\n", escape_html(&rec)));
        }
        html.push_str("</ul>\n</section>\n");
    }

    html.push_str(&format!(
        "<footer><p>Generated by {} v{}</p></footer>\n</main>\n</body>\n</html>\n",
        GENERATOR,
        env!("CARGO_PKG_VERSION")
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Criterion, Grade, IssueSummary};

    fn sample() -> ScoringResult {
        let issue = Issue::new(
            "/pets",
            Some("get"),
            "responses",
            "Operation has no defined <responses>",
            Severity::Critical,
            "Define responses",
            Criterion::ResponseCodes,
        );
        let criterion_results: Vec<CriterionResult> = Criterion::ALL
            .iter()
            .map(|c| {
                let (score, issues) = if *c == Criterion::ResponseCodes {
                    (4, vec![issue.clone()])
                } else {
                    (c.max_score(), Vec::new())
                };
                CriterionResult {
                    criterion: *c,
                    score,
                    max_score: c.max_score(),
                    weight: c.weight(),
                    weighted_score: score as f64 / c.max_score() as f64 * c.weight() * 100.0,
                    issues,
                }
            })
            .collect();
        ScoringResult {
            overall_score: 89,
            grade: Grade::B,
            criterion_results,
            total_issues: 1,
            summary: IssueSummary {
                critical_issues: 1,
                ..IssueSummary::default()
            },
        }
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(ReportFormat::parse_list("all").unwrap(), ReportFormat::ALL.to_vec());
        assert_eq!(
            ReportFormat::parse_list("html, json,html").unwrap(),
            vec![ReportFormat::Html, ReportFormat::Json]
        );
        assert!(matches!(
            ReportFormat::parse_list("pdf"),
            Err(ReportError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_json_statistics_and_recommendations() {
        let out = compose_json(&sample(), "Pets");
        assert_eq!(out["metadata"]["apiTitle"], "Pets");
        assert_eq!(out["summary"]["gradeDescription"], "Good");
        assert_eq!(out["summary"]["issueBreakdown"]["criticalIssues"], 1);
        assert_eq!(out["statistics"]["criteriaCount"], 7);
        assert_eq!(out["statistics"]["passedCriteria"], 6);
        assert_eq!(
            out["statistics"]["worstPerformingCriterion"]["criterion"],
            "Response Codes"
        );
        assert_eq!(out["statistics"]["worstPerformingCriterion"]["percentage"], 27);
        assert_eq!(
            out["statistics"]["bestPerformingCriterion"]["criterion"],
            "Schema & Types"
        );
        let recs = out["recommendations"].as_array().unwrap();
        assert_eq!(recs[0], "Address 1 critical issue(s) immediately.");
        assert!(recs[1].as_str().unwrap().contains("\"Response Codes\""));
        assert_eq!(out["analysis"]["criterionResults"][3]["issues"][0]["operation"], "get");
    }

    #[test]
    fn test_markdown_and_html_sections() {
        let md = render(&sample(), ReportFormat::Markdown, "Pets").unwrap();
        assert!(md.starts_with("# OpenAPI Score Report: Pets"));
        assert!(md.contains("### 89/100 | Grade: B"));
        assert!(md.contains("##### Critical Issues (1)"));
        assert!(md.contains("Operation has no defined \\<responses\\>"));
        assert!(md.contains("### Focus Area: Response Codes"));

        let html = render(&sample(), ReportFormat::Html, "Pets & <Co>").unwrap();
        assert!(html.contains("<h2>Pets &amp; &lt;Co&gt;</h2>"));
        assert!(html.contains("Operation has no defined &lt;responses&gt;"));
        assert!(!html.contains("<responses>"));
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/reports");
        let paths = export(&sample(), &ReportFormat::ALL, &target, "Pet Store API").unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "pet-store-api-report.json",
                "pet-store-api-report.md",
                "pet-store-api-report.html"
            ]
        );
        let json: JsonVal = serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
        assert_eq!(json["summary"]["overallScore"], 89);
    }
}
