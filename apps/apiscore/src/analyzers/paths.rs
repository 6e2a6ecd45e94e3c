//! Paths & Operations: naming hygiene, structural consistency, and
//! operationId discipline.

use super::{AnalysisOptions, Analyzer, Findings};
use crate::error::AnalyzerError;
use crate::models::document::{is_item_path, normalize_path, path_params, Document, PathItem, RefOr};
use crate::models::{Criterion, CriterionResult, Severity};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

const FILTER_PARAMS: [&str; 3] = ["filter", "ids", "query"];

fn kebab_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("kebab-case regex must compile"))
}

fn camel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("camelCase regex must compile"))
}

/// Accepted operationId prefixes per method; other methods are not checked.
fn method_prefixes(method: &str) -> Option<&'static [&'static str]> {
    match method {
        "get" => Some(&["get", "read", "fetch", "list", "retrieve"]),
        "post" => Some(&["create", "add", "post", "insert"]),
        "put" => Some(&["update", "put", "replace"]),
        "patch" => Some(&["patch", "modify", "partial"]),
        "delete" => Some(&["delete", "remove"]),
        _ => None,
    }
}

pub struct PathsAnalyzer;

impl Analyzer for PathsAnalyzer {
    fn criterion(&self) -> Criterion {
        Criterion::PathsOperations
    }

    fn analyze(
        &self,
        doc: &Document,
        _opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError> {
        let mut out = Findings::new(Criterion::PathsOperations);
        let paths: Vec<(&str, PathItem<'_>)> = doc.paths().collect();
        out.count(paths.len() * 2);

        check_naming(&mut out, &paths);
        check_parameter_consistency(&mut out, &paths);
        check_crud(&mut out, &paths);
        check_redundant(&mut out, &paths);
        check_operation_ids(&mut out, &paths);

        Ok(out.finish())
    }
}

fn check_naming(out: &mut Findings, paths: &[(&str, PathItem<'_>)]) {
    let mut casing: BTreeMap<String, Vec<&str>> = BTreeMap::new();

    for (path, _) in paths {
        if *path != "/" && path.ends_with('/') {
            out.push(
                *path,
                None,
                "",
                "Path has a trailing slash",
                Severity::Low,
                "Remove trailing slash for consistency",
            );
        }

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if !camel_re().is_match(name) {
                    out.push(
                        *path,
                        None,
                        segment,
                        format!(
                            "Path parameter \"{}\" does not follow camelCase naming convention",
                            name
                        ),
                        Severity::Low,
                        "Use camelCase for path parameters",
                    );
                }
                continue;
            }
            if !kebab_re().is_match(segment) {
                out.push(
                    *path,
                    None,
                    segment,
                    format!(
                        "Path segment \"{}\" does not follow kebab-case naming convention",
                        segment
                    ),
                    Severity::Low,
                    "Use kebab-case (lowercase with hyphens) for path segments",
                );
            }
            let variants = casing.entry(segment.to_lowercase()).or_default();
            if !variants.contains(&segment) {
                variants.push(segment);
            }
        }
    }

    for (lower, variants) in casing {
        if variants.len() > 1 {
            out.push(
                "paths",
                None,
                lower.clone(),
                format!(
                    "Inconsistent casing for path segment \"{}\" (found: {})",
                    lower,
                    variants.join(", ")
                ),
                Severity::Medium,
                "Use consistent casing for the same path segments across all endpoints",
            );
        }
    }
}

/// Paths grouped by their placeholder-generic pattern, in first-seen order.
fn group_by_pattern<'p, 'a>(
    paths: &'p [(&'a str, PathItem<'a>)],
) -> Vec<Vec<&'p (&'a str, PathItem<'a>)>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<&'p (&'a str, PathItem<'a>)>> = Vec::new();
    for entry in paths {
        let pattern = normalize_path(entry.0);
        match order.iter().position(|p| *p == pattern) {
            Some(i) => groups[i].push(entry),
            None => {
                order.push(pattern);
                groups.push(vec![entry]);
            }
        }
    }
    groups
}

fn check_parameter_consistency(out: &mut Findings, paths: &[(&str, PathItem<'_>)]) {
    for group in group_by_pattern(paths) {
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                let pa = path_params(a.0);
                let pb = path_params(b.0);
                for (x, y) in pa.iter().zip(pb.iter()) {
                    if x != y {
                        out.push(
                            "paths",
                            None,
                            format!("{} vs {}", a.0, b.0),
                            format!("Similar paths use different parameter names ({} vs {})", x, y),
                            Severity::Medium,
                            "Use consistent parameter naming across similar paths",
                        );
                    }
                }
            }
        }
    }
}

fn check_crud(out: &mut Findings, paths: &[(&str, PathItem<'_>)]) {
    for (path, item) in paths {
        if path.split('/').all(|s| s.is_empty()) {
            continue;
        }

        if is_item_path(path) {
            if item.operation("post").is_some() {
                out.push(
                    *path,
                    Some("post"),
                    "",
                    "Using POST on an individual resource path",
                    Severity::Medium,
                    "POST is typically used for collection resources, not individual items",
                );
            }
            continue;
        }

        for method in ["put", "patch"] {
            if item.operation(method).is_some() {
                out.push(
                    *path,
                    Some(method),
                    "",
                    format!("Using {} on a collection resource", method.to_uppercase()),
                    Severity::Medium,
                    "PUT/PATCH should typically be used on individual resources, not collections",
                );
            }
        }

        if let Some(delete) = item.operation("delete") {
            let filtered = delete.parameters().into_iter().any(|p| match p {
                RefOr::Item(p) => p.name().is_some_and(|n| FILTER_PARAMS.contains(&n)),
                RefOr::Ref(_) => false,
            });
            if !filtered {
                out.push(
                    *path,
                    Some("delete"),
                    "",
                    "DELETE operation on a collection resource without filtering parameters",
                    Severity::Medium,
                    "Add filter parameters or use DELETE only on individual resources",
                );
            }
        }
    }
}

fn check_redundant(out: &mut Findings, paths: &[(&str, PathItem<'_>)]) {
    for group in group_by_pattern(paths) {
        for (i, a) in group.iter().enumerate() {
            let ma = a.1.methods();
            for b in &group[i + 1..] {
                let mb = b.1.methods();
                let overlap: Vec<&str> = ma.iter().copied().filter(|m| mb.contains(m)).collect();
                if !overlap.is_empty() {
                    out.push(
                        "paths",
                        None,
                        format!("{} vs {}", a.0, b.0),
                        format!(
                            "Potentially redundant paths with overlapping operations ({})",
                            overlap.join(", ")
                        ),
                        Severity::High,
                        "Consider consolidating these paths or ensuring they serve different purposes",
                    );
                }
            }
        }
    }
}

fn check_operation_ids(out: &mut Findings, paths: &[(&str, PathItem<'_>)]) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut seen_lower: HashSet<String> = HashSet::new();

    for (path, item) in paths {
        for (method, op) in item.operations() {
            let Some(id) = op.operation_id() else {
                out.push(
                    *path,
                    Some(method),
                    "operationId",
                    "Operation is missing an operationId",
                    Severity::Medium,
                    "Add a unique operationId to help with SDK generation and client usage",
                );
                continue;
            };

            let lower = id.to_lowercase();
            if seen.contains(id) {
                out.push(
                    *path,
                    Some(method),
                    "operationId",
                    format!("Duplicate operationId: \"{}\"", id),
                    Severity::High,
                    "Use unique operationIds across all operations",
                );
            } else if seen_lower.contains(&lower) {
                out.push(
                    *path,
                    Some(method),
                    "operationId",
                    format!("Case-insensitive duplicate operationId: \"{}\"", id),
                    Severity::Medium,
                    "Use operationIds that are unique even when case is ignored",
                );
            }

            if !camel_re().is_match(id) {
                out.push(
                    *path,
                    Some(method),
                    "operationId",
                    format!(
                        "OperationId \"{}\" does not follow camelCase naming convention",
                        id
                    ),
                    Severity::Low,
                    "Use camelCase for operationIds",
                );
            }

            seen.insert(id);
            seen_lower.insert(lower);
        }
    }

    for (path, item) in paths {
        for (method, op) in item.operations() {
            let (Some(id), Some(prefixes)) = (op.operation_id(), method_prefixes(method)) else {
                continue;
            };
            let lower = id.to_lowercase();
            if !prefixes.iter().any(|p| lower.starts_with(p)) {
                out.push(
                    *path,
                    Some(method),
                    "operationId",
                    format!(
                        "OperationId \"{}\" does not indicate the HTTP method ({})",
                        id,
                        method.to_uppercase()
                    ),
                    Severity::Low,
                    format!(
                        "Consider prefixing operationId with one of: {}",
                        prefixes.join(", ")
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{matching, run};
    use serde_json::json;

    #[test]
    fn test_naming_rules() {
        let r = run(
            &PathsAnalyzer,
            json!({"paths": {
                "/userProfiles/": {"get": {"operationId": "listProfiles"}},
                "/users/{user_id}": {"get": {"operationId": "getUser"}},
                "/Users": {"get": {"operationId": "listUsers"}}
            }}),
        );
        assert_eq!(matching(&r, "trailing slash").len(), 1);
        assert_eq!(matching(&r, "\"userProfiles\" does not follow kebab-case").len(), 1);
        assert_eq!(matching(&r, "\"user_id\" does not follow camelCase").len(), 1);
        let casing = matching(&r, "Inconsistent casing");
        assert_eq!(casing.len(), 1);
        assert_eq!(casing[0].description, "Inconsistent casing for path segment \"users\" (found: users, Users)");
        assert_eq!(casing[0].severity, Severity::Medium);
    }

    #[test]
    fn test_parameter_name_consistency() {
        let r = run(
            &PathsAnalyzer,
            json!({"paths": {
                "/widgets/{id}": {"get": {"operationId": "getWidget"}},
                "/widgets/{widgetId}": {"get": {"operationId": "getWidgetById"}}
            }}),
        );
        let diff = matching(&r, "different parameter names (id vs widgetId)");
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].severity, Severity::Medium);
        assert_eq!(diff[0].location, "/widgets/{id} vs /widgets/{widgetId}");
        let redundant = matching(&r, "overlapping operations (get)");
        assert_eq!(redundant.len(), 1);
        assert_eq!(redundant[0].severity, Severity::High);
    }

    #[test]
    fn test_delete_on_collection_needs_filter() {
        let bare = run(
            &PathsAnalyzer,
            json!({"paths": {"/items": {"delete": {"operationId": "deleteItems"}}}}),
        );
        let hits = matching(&bare, "DELETE operation on a collection");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, Severity::Medium);

        let filtered = run(
            &PathsAnalyzer,
            json!({"paths": {"/items": {"delete": {
                "operationId": "deleteItems",
                "parameters": [{"name": "filter", "in": "query"}]
            }}}}),
        );
        assert!(matching(&filtered, "DELETE operation on a collection").is_empty());
    }

    #[test]
    fn test_crud_methods() {
        let r = run(
            &PathsAnalyzer,
            json!({"paths": {
                "/items": {"put": {"operationId": "updateItems"}, "patch": {"operationId": "patchItems"}},
                "/items/{itemId}": {"post": {"operationId": "createItem"}}
            }}),
        );
        assert_eq!(matching(&r, "Using PUT on a collection").len(), 1);
        assert_eq!(matching(&r, "Using PATCH on a collection").len(), 1);
        assert_eq!(matching(&r, "POST on an individual resource").len(), 1);
    }

    #[test]
    fn test_duplicate_operation_id_reported_once_on_second() {
        let r = run(
            &PathsAnalyzer,
            json!({"paths": {
                "/users/{userId}": {"get": {"operationId": "getUser"}},
                "/accounts/{userId}": {"get": {"operationId": "getUser"}}
            }}),
        );
        let dups = matching(&r, "Duplicate operationId");
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].path, "/accounts/{userId}");
        assert_eq!(dups[0].severity, Severity::High);
        assert!(matching(&r, "Case-insensitive").is_empty());
    }

    #[test]
    fn test_operation_id_casing_and_prefix() {
        let r = run(
            &PathsAnalyzer,
            json!({"paths": {
                "/a": {"get": {"operationId": "GetA"}, "post": {}},
                "/b": {"get": {"operationId": "geta"}, "delete": {"operationId": "purgeB", "parameters": [{"name": "ids", "in": "query"}]}}
            }}),
        );
        assert_eq!(matching(&r, "missing an operationId").len(), 1);
        assert_eq!(matching(&r, "\"GetA\" does not follow camelCase").len(), 1);
        let ci = matching(&r, "Case-insensitive duplicate operationId: \"geta\"");
        assert_eq!(ci.len(), 1);
        assert_eq!(ci[0].severity, Severity::Medium);
        let prefix = matching(&r, "does not indicate the HTTP method");
        assert_eq!(prefix.len(), 1);
        assert_eq!(prefix[0].description, "OperationId \"purgeB\" does not indicate the HTTP method (DELETE)");
    }

    #[test]
    fn test_no_paths_scores_full() {
        let r = run(&PathsAnalyzer, json!({"paths": {}}));
        assert_eq!(r.score, 15);
    }
}
