//! Examples & Samples: example coverage on bodies, responses, and parameters.

use super::{AnalysisOptions, Analyzer, Findings};
use crate::error::AnalyzerError;
use crate::models::document::{Document, MediaType, Parameter, RefOr};
use crate::models::{Criterion, CriterionResult, Severity};

pub struct ExamplesAnalyzer;

fn any_example(content: &[(&str, MediaType<'_>)]) -> bool {
    content.iter().any(|(_, mt)| mt.has_any_example())
}

/// A required parameter with a schema but no example on either itself or
/// its inline schema.
fn required_param_lacks_example(p: &Parameter<'_>) -> bool {
    if !p.required() || p.has_example() {
        return false;
    }
    match p.schema() {
        None => false,
        Some(RefOr::Ref(_)) => true,
        Some(RefOr::Item(s)) => !s.has_example(),
    }
}

impl Analyzer for ExamplesAnalyzer {
    fn criterion(&self) -> Criterion {
        Criterion::Examples
    }

    fn analyze(
        &self,
        doc: &Document,
        _opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError> {
        let mut out = Findings::new(Criterion::Examples);

        for (path, method, op) in doc.operations() {
            if let Some(body) = op.request_body() {
                out.count(1);
                if let RefOr::Item(body) = body {
                    if body.has_content() && !any_example(&body.content()) {
                        let severity = if matches!(method, "post" | "put" | "patch") {
                            Severity::High
                        } else {
                            Severity::Medium
                        };
                        out.push(
                            path,
                            Some(method),
                            "requestBody",
                            format!(
                                "Request body for {} {} lacks examples",
                                method.to_uppercase(),
                                path
                            ),
                            severity,
                            "Add examples to illustrate expected request format",
                        );
                    }
                }
            }

            for (code, resp) in op.responses().unwrap_or_default() {
                if !code.starts_with('2') {
                    continue;
                }
                out.count(1);
                let RefOr::Item(resp) = resp else { continue };
                if resp.has_content() && !any_example(&resp.content()) {
                    out.push(
                        path,
                        Some(method),
                        format!("responses.{}", code),
                        format!(
                            "Response {} for {} {} lacks examples",
                            code,
                            method.to_uppercase(),
                            path
                        ),
                        Severity::Medium,
                        "Add examples to illustrate expected response format",
                    );
                }
            }

            for param in op.parameters() {
                let RefOr::Item(param) = param else { continue };
                if required_param_lacks_example(&param) {
                    let name = param.name().unwrap_or("");
                    out.push(
                        path,
                        Some(method),
                        format!("parameters.{}", name),
                        format!(
                            "Required parameter \"{}\" (in {}) lacks examples",
                            name,
                            param.location().unwrap_or("")
                        ),
                        Severity::Low,
                        "Add an example to help consumers understand expected parameter values",
                    );
                }
            }
        }

        if let Some(components) = doc.components() {
            let schemas = components.schemas();
            out.count(schemas.len());
            for (name, node) in schemas {
                let RefOr::Item(schema) = node else { continue };
                let structured = matches!(schema.schema_type(), Some("object") | Some("array"));
                if structured && !schema.has_example() {
                    out.push(
                        "components/schemas",
                        None,
                        name,
                        format!("Schema \"{}\" lacks examples", name),
                        Severity::Medium,
                        "Add examples to illustrate valid schema values",
                    );
                }
            }

            for (name, body) in components.request_bodies() {
                let RefOr::Item(body) = body else { continue };
                if body.has_content() && !any_example(&body.content()) {
                    out.push(
                        "components/requestBodies",
                        None,
                        name,
                        format!("Request body \"{}\" lacks examples", name),
                        Severity::Medium,
                        "Add examples to illustrate expected request format",
                    );
                }
            }

            for (name, resp) in components.responses() {
                let RefOr::Item(resp) = resp else { continue };
                if resp.has_content() && !any_example(&resp.content()) {
                    out.push(
                        "components/responses",
                        None,
                        name,
                        format!("Response \"{}\" lacks examples", name),
                        Severity::Medium,
                        "Add examples to illustrate expected response format",
                    );
                }
            }

            for (name, param) in components.parameters() {
                let RefOr::Item(param) = param else { continue };
                if required_param_lacks_example(&param) {
                    out.push(
                        "components/parameters",
                        None,
                        name,
                        format!("Required parameter \"{}\" lacks examples", name),
                        Severity::Low,
                        "Add an example to help consumers understand expected parameter values",
                    );
                }
            }
        }

        Ok(out.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{matching, run};
    use serde_json::json;

    #[test]
    fn test_request_body_severity_by_method() {
        let body = json!({"content": {"application/json": {"schema": {"type": "object"}}}});
        let r = run(
            &ExamplesAnalyzer,
            json!({"paths": {"/a": {"post": {"requestBody": body}, "delete": {"requestBody": body}}}}),
        );
        assert_eq!(matching(&r, "POST /a lacks")[0].severity, Severity::High);
        assert_eq!(matching(&r, "DELETE /a lacks")[0].severity, Severity::Medium);
    }

    #[test]
    fn test_example_on_media_type_or_schema_counts() {
        let r = run(
            &ExamplesAnalyzer,
            json!({"paths": {"/a": {"get": {"responses": {
                "200": {"content": {"application/json": {"example": {"a": 1}}}},
                "201": {"content": {"application/json": {"schema": {"type": "string", "example": "x"}}}},
                "202": {"content": {"application/json": {"schema": {"$ref": "#/x"}}}},
                "404": {"content": {"application/json": {}}}
            }}}}}),
        );
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].location, "responses.202");
    }

    #[test]
    fn test_required_parameters_only() {
        let r = run(
            &ExamplesAnalyzer,
            json!({"paths": {"/a/{id}": {"get": {"parameters": [
                {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                {"name": "q", "in": "query", "schema": {"type": "string"}},
                {"name": "x", "in": "header", "required": true, "schema": {"type": "string"}, "example": "1"}
            ]}}}}),
        );
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].description, "Required parameter \"id\" (in path) lacks examples");
        assert_eq!(r.issues[0].severity, Severity::Low);
    }

    #[test]
    fn test_component_schemas_only_structured_types() {
        let r = run(
            &ExamplesAnalyzer,
            json!({"components": {"schemas": {
                "Obj": {"type": "object"},
                "Arr": {"type": "array", "items": {"type": "string"}, "example": ["a"]},
                "Str": {"type": "string"},
                "Any": {"description": "untyped"}
            }}}),
        );
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].location, "Obj");
    }
}
