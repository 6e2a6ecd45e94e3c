//! Response Codes: status-code coverage per operation.

use super::{AnalysisOptions, Analyzer, Findings};
use crate::error::AnalyzerError;
use crate::models::document::{is_item_path, Document, RefOr, Response, SchemaNode};
use crate::models::{Criterion, CriterionResult, Severity};

pub struct ResponsesAnalyzer;

impl Analyzer for ResponsesAnalyzer {
    fn criterion(&self) -> Criterion {
        Criterion::ResponseCodes
    }

    fn analyze(
        &self,
        doc: &Document,
        _opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError> {
        let mut out = Findings::new(Criterion::ResponseCodes);

        for (path, method, op) in doc.operations() {
            out.count(1);
            let responses = op.responses().unwrap_or_default();
            // Malformed entries still count as declared codes.
            let codes = op.response_codes();
            if codes.is_empty() {
                out.push(
                    path,
                    Some(method),
                    "responses",
                    "Operation has no defined responses",
                    Severity::Critical,
                    "Define at least success (2xx) and error (4xx/5xx) responses",
                );
                continue;
            }

            let has = |code: &str| codes.iter().any(|c| *c == code);
            let any_class = |class: char| codes.iter().any(|c| c.starts_with(class));

            if !any_class('2') && !has("default") {
                out.push(
                    path,
                    Some(method),
                    "responses",
                    "Operation is missing success response codes (2xx)",
                    Severity::High,
                    "Add appropriate success response codes (e.g., 200, 201, 204)",
                );
            }
            if !any_class('4') {
                out.push(
                    path,
                    Some(method),
                    "responses",
                    "Operation is missing client error response codes (4xx)",
                    Severity::Medium,
                    "Add appropriate client error response codes (e.g., 400, 401, 404)",
                );
            }
            if !any_class('5') && !has("default") {
                out.push(
                    path,
                    Some(method),
                    "responses",
                    "Operation is missing server error handling (5xx or default)",
                    Severity::Low,
                    "Add server error responses (5xx) or a default response",
                );
            }

            match method {
                "post" if !is_item_path(path) && !has("201") => out.push(
                    path,
                    Some(method),
                    "responses",
                    "POST operation for resource creation should return 201 Created",
                    Severity::Medium,
                    "Add a 201 Created response for resource creation operations",
                ),
                "put" | "patch" if !has("200") && !has("204") => out.push(
                    path,
                    Some(method),
                    "responses",
                    format!(
                        "{} operation should return 200 OK or 204 No Content",
                        method.to_uppercase()
                    ),
                    Severity::Medium,
                    "Add appropriate success response code (200 or 204) based on whether content is returned",
                ),
                "delete" if !has("204") => out.push(
                    path,
                    Some(method),
                    "responses",
                    "DELETE operation should typically return 204 No Content",
                    Severity::Low,
                    "Consider using 204 No Content for DELETE operations",
                ),
                "get" if is_item_path(path) && !has("404") => out.push(
                    path,
                    Some(method),
                    "responses",
                    "GET operation for a specific resource should handle 404 Not Found",
                    Severity::Medium,
                    "Add a 404 Not Found response for when the requested resource does not exist",
                ),
                _ => {}
            }

            check_success_consistency(&mut out, path, method, &responses);
        }

        Ok(out.finish())
    }
}

/// The schema a success response declares; the last media type with a
/// schema wins.
fn success_schema<'a>(resp: &RefOr<'a, Response<'a>>) -> Option<SchemaNode<'a>> {
    let RefOr::Item(resp) = resp else { return None };
    resp.content()
        .into_iter()
        .filter_map(|(_, mt)| mt.schema())
        .last()
}

fn check_success_consistency(
    out: &mut Findings,
    path: &str,
    method: &str,
    responses: &[(&str, RefOr<'_, Response<'_>>)],
) {
    let schemas: Vec<(&str, SchemaNode<'_>)> = responses
        .iter()
        .filter(|(code, _)| code.starts_with('2'))
        .filter_map(|(code, resp)| success_schema(resp).map(|s| (*code, s)))
        .collect();

    for (i, (code_a, a)) in schemas.iter().enumerate() {
        for (code_b, b) in &schemas[i + 1..] {
            let consistent = match (a, b) {
                (RefOr::Ref(x), RefOr::Ref(y)) => x == y,
                (RefOr::Item(_), RefOr::Item(_)) => true,
                _ => false,
            };
            if !consistent {
                out.push(
                    path,
                    Some(method),
                    format!("responses.{} vs responses.{}", code_a, code_b),
                    "Different success responses use inconsistent schema structures",
                    Severity::Medium,
                    "Use consistent schema structures across similar response codes",
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
    fn test_missing_responses_is_critical() {
        let r = run(
            &ResponsesAnalyzer,
            json!({"paths": {"/a": {"get": {}, "put": {"responses": {}}}}}),
        );
        assert_eq!(r.issues.len(), 2);
        assert!(r.issues.iter().all(|i| i.severity == Severity::Critical));
        assert_eq!(r.score, 7);
    }

    #[test]
    fn test_null_response_entry_still_declares_a_code() {
        let r = run(
            &ResponsesAnalyzer,
            json!({"paths": {"/a": {"get": {"responses": {"200": null}}}}}),
        );
        assert!(matching(&r, "no defined responses").is_empty());
        assert_eq!(matching(&r, "(4xx)").len(), 1);
        assert!(matching(&r, "(2xx)").is_empty());
    }

    #[test]
    fn test_status_classes() {
        let r = run(
            &ResponsesAnalyzer,
            json!({"paths": {"/a": {"get": {"responses": {"400": {"description": "x"}}}}}}),
        );
        assert_eq!(matching(&r, "(2xx)")[0].severity, Severity::High);
        assert_eq!(matching(&r, "(5xx or default)")[0].severity, Severity::Low);
        assert!(matching(&r, "(4xx)").is_empty());

        let with_default = run(
            &ResponsesAnalyzer,
            json!({"paths": {"/a": {"get": {"responses": {"default": {"description": "x"}, "404": {}}}}}}),
        );
        assert!(with_default.issues.is_empty());
    }

    #[test]
    fn test_method_expectations() {
        let r = run(
            &ResponsesAnalyzer,
            json!({"paths": {
                "/pets": {"post": {"responses": {"200": {}, "400": {}, "500": {}}}},
                "/pets/{petId}": {
                    "get": {"responses": {"200": {}, "400": {}, "500": {}}},
                    "patch": {"responses": {"202": {}, "400": {}, "500": {}}},
                    "delete": {"responses": {"200": {}, "400": {}, "500": {}}}
                }
            }}),
        );
        assert_eq!(matching(&r, "should return 201 Created").len(), 1);
        assert_eq!(matching(&r, "should handle 404").len(), 1);
        assert_eq!(matching(&r, "PATCH operation should return 200 OK").len(), 1);
        let del = matching(&r, "DELETE operation should typically return 204");
        assert_eq!(del[0].severity, Severity::Low);
        assert_eq!(r.issues.len(), 4);
    }

    #[test]
    fn test_success_schema_consistency() {
        let r = run(
            &ResponsesAnalyzer,
            json!({"paths": {"/pets": {"get": {"responses": {
                "200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}},
                "203": {"content": {"application/json": {"schema": {"type": "object"}}}},
                "206": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Other"}}}},
                "400": {}, "500": {}
            }}}}}),
        );
        let hits = matching(&r, "inconsistent schema structures");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].location, "responses.200 vs responses.203");
    }
}
