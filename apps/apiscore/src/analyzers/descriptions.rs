//! Descriptions & Documentation: presence and length of descriptive text.

use super::{AnalysisOptions, Analyzer, Findings};
use crate::error::AnalyzerError;
use crate::models::document::{Document, Operation, RefOr};
use crate::models::{Criterion, CriterionResult, Severity};

const INFO_MIN: usize = 20;
const PATH_MIN: usize = 10;
const OPERATION_MIN: usize = 15;
const PARAMETER_MIN: usize = 5;
const PROPERTY_MIN: usize = 5;
const BODY_MIN: usize = 10;
const RESPONSE_MIN: usize = 10;
const SCHEMA_MIN: usize = 10;

/// True when the trimmed text is absent or shorter than `min` characters.
fn too_short(text: Option<&str>, min: usize) -> bool {
    text.map_or(true, |t| t.trim().chars().count() < min)
}

fn qualifier(text: Option<&str>) -> &'static str {
    match text {
        Some(t) if !t.is_empty() => "a short",
        _ => "no",
    }
}

pub struct DescriptionsAnalyzer;

impl Analyzer for DescriptionsAnalyzer {
    fn criterion(&self) -> Criterion {
        Criterion::Descriptions
    }

    fn analyze(
        &self,
        doc: &Document,
        _opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError> {
        let mut out = Findings::new(Criterion::Descriptions);
        out.count(1);

        let info = doc.info();
        if too_short(info.and_then(|i| i.description()), INFO_MIN) {
            out.push(
                "info",
                None,
                "description",
                "API description is missing or too short",
                Severity::High,
                format!(
                    "Add a detailed description (at least {} characters) explaining the purpose of the API",
                    INFO_MIN
                ),
            );
        }
        if !info.is_some_and(|i| i.has_contact()) {
            out.push(
                "info",
                None,
                "contact",
                "API contact information is missing",
                Severity::Medium,
                "Add contact information to help API consumers reach out for support",
            );
        }

        for (path, item) in doc.paths() {
            out.count(1);
            if item.has_summary() && too_short(item.description(), PATH_MIN) {
                out.push(
                    path,
                    None,
                    "description",
                    "Path has a summary but missing or short description",
                    Severity::Low,
                    "Add a more detailed description for the path",
                );
            }
            for (method, op) in item.operations() {
                check_operation(&mut out, path, method, op);
            }
        }

        if let Some(components) = doc.components() {
            let schemas = components.schemas();
            let params = components.parameters();
            let bodies = components.request_bodies();
            let responses = components.responses();
            out.count(schemas.len() + params.len() + bodies.len() + responses.len());

            for (name, node) in schemas {
                let RefOr::Item(schema) = node else { continue };
                if too_short(schema.description(), SCHEMA_MIN) {
                    out.push(
                        "components/schemas",
                        None,
                        name,
                        format!(
                            "Schema \"{}\" has {} description",
                            name,
                            qualifier(schema.description())
                        ),
                        Severity::Medium,
                        "Add a detailed description explaining what this schema represents",
                    );
                }
                for (prop_name, prop) in schema.properties() {
                    let RefOr::Item(prop) = prop else { continue };
                    if too_short(prop.description(), PROPERTY_MIN) {
                        out.push(
                            "components/schemas",
                            None,
                            format!("{}.properties.{}", name, prop_name),
                            format!(
                                "Property \"{}\" in schema \"{}\" has {} description",
                                prop_name,
                                name,
                                qualifier(prop.description())
                            ),
                            Severity::Low,
                            "Add a description explaining what this property represents",
                        );
                    }
                }
            }

            for (name, param) in params {
                let RefOr::Item(param) = param else { continue };
                if too_short(param.description(), PARAMETER_MIN) {
                    out.push(
                        "components/parameters",
                        None,
                        name,
                        format!(
                            "Parameter \"{}\" has {} description",
                            name,
                            qualifier(param.description())
                        ),
                        Severity::Medium,
                        "Add a clear description explaining the parameter purpose",
                    );
                }
            }

            for (name, body) in bodies {
                let RefOr::Item(body) = body else { continue };
                if too_short(body.description(), BODY_MIN) {
                    out.push(
                        "components/requestBodies",
                        None,
                        name,
                        format!(
                            "Request body \"{}\" has {} description",
                            name,
                            qualifier(body.description())
                        ),
                        Severity::Medium,
                        "Add a detailed description explaining the expected payload",
                    );
                }
            }

            for (name, resp) in responses {
                let RefOr::Item(resp) = resp else { continue };
                if too_short(resp.description(), RESPONSE_MIN) {
                    out.push(
                        "components/responses",
                        None,
                        name,
                        format!(
                            "Response \"{}\" has {} description",
                            name,
                            qualifier(resp.description())
                        ),
                        Severity::Medium,
                        "Add a clear description explaining this response",
                    );
                }
            }
        }

        Ok(out.finish())
    }
}

fn check_operation(out: &mut Findings, path: &str, method: &str, op: Operation<'_>) {
    out.count(1);
    if too_short(op.description(), OPERATION_MIN) {
        let severity = if op.has_summary() {
            Severity::Medium
        } else {
            Severity::High
        };
        out.push(
            path,
            Some(method),
            "description",
            format!(
                "Operation {} {} has {} description",
                method.to_uppercase(),
                path,
                qualifier(op.description())
            ),
            severity,
            "Add a detailed description explaining what the operation does, expected behavior, and side effects",
        );
    }

    let params = op.parameters();
    out.count(params.len());
    for (idx, param) in params.into_iter().enumerate() {
        let RefOr::Item(param) = param else { continue };
        if too_short(param.description(), PARAMETER_MIN) {
            let name = param.name().unwrap_or("");
            out.push(
                path,
                Some(method),
                format!(
                    "parameters[{}] ({} in {})",
                    idx,
                    name,
                    param.location().unwrap_or("")
                ),
                format!(
                    "Parameter \"{}\" has {} description",
                    name,
                    qualifier(param.description())
                ),
                Severity::Medium,
                "Add a clear description explaining the parameter purpose, constraints, and format",
            );
        }
    }

    if let Some(body) = op.request_body() {
        out.count(1);
        if let RefOr::Item(body) = body {
            if too_short(body.description(), BODY_MIN) {
                out.push(
                    path,
                    Some(method),
                    "requestBody",
                    format!(
                        "Request body has {} description",
                        qualifier(body.description())
                    ),
                    Severity::Medium,
                    "Add a detailed description explaining the expected payload",
                );
            }
        }
    }

    let responses = op.responses().unwrap_or_default();
    out.count(responses.len());
    for (code, resp) in responses {
        let RefOr::Item(resp) = resp else { continue };
        if too_short(resp.description(), RESPONSE_MIN) {
            let severity = if code.starts_with('2') {
                Severity::High
            } else {
                Severity::Medium
            };
            out.push(
                path,
                Some(method),
                format!("responses.{}", code),
                format!(
                    "Response for status code {} has {} description",
                    code,
                    qualifier(resp.description())
                ),
                severity,
                "Add a clear description explaining the meaning of this status code in context",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{matching, run};
    use serde_json::json;

    #[test]
    fn test_minimal_info() {
        let r = run(
            &DescriptionsAnalyzer,
            json!({"info": {"title": "t", "version": "1.0.0"}, "paths": {}}),
        );
        assert_eq!(r.issues.len(), 2);
        assert_eq!(r.issues[0].severity, Severity::High);
        assert_eq!(r.issues[1].location, "contact");
        assert_eq!(r.score, 15);
    }

    #[test]
    fn test_operation_severity_depends_on_summary() {
        let r = run(
            &DescriptionsAnalyzer,
            json!({"paths": {"/a": {
                "get": {"summary": "List", "description": "Short"},
                "post": {}
            }}}),
        );
        let get = matching(&r, "Operation GET /a has a short description");
        assert_eq!(get.len(), 1);
        assert_eq!(get[0].severity, Severity::Medium);
        let post = matching(&r, "Operation POST /a has no description");
        assert_eq!(post[0].severity, Severity::High);
    }

    #[test]
    fn test_response_thresholds() {
        let r = run(
            &DescriptionsAnalyzer,
            json!({"paths": {"/a": {"get": {
                "description": "Returns all the things in a list",
                "responses": {
                    "200": {"description": "OK"},
                    "404": {"description": "Nope"},
                    "500": {"description": "Server failure"},
                    "default": {"$ref": "#/components/responses/Err"}
                }
            }}}}),
        );
        assert_eq!(matching(&r, "status code 200")[0].severity, Severity::High);
        assert_eq!(matching(&r, "status code 404")[0].severity, Severity::Medium);
        assert!(matching(&r, "status code 500").is_empty());
        assert!(matching(&r, "status code default").is_empty());
    }

    #[test]
    fn test_path_description_only_checked_with_summary() {
        let r = run(
            &DescriptionsAnalyzer,
            json!({"paths": {"/a": {"summary": "A"}, "/b": {}}}),
        );
        let hits = matching(&r, "Path has a summary");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/a");
        assert_eq!(hits[0].severity, Severity::Low);
    }

    #[test]
    fn test_component_descriptions() {
        let r = run(
            &DescriptionsAnalyzer,
            json!({"components": {
                "schemas": {"Pet": {"type": "object", "description": "A pet",
                    "properties": {"id": {"type": "integer"}, "owner": {"$ref": "#/x"}}}},
                "parameters": {"Limit": {"name": "limit", "in": "query"}},
                "requestBodies": {"PetBody": {"description": "Pet"}},
                "responses": {"NotFound": {"description": "Resource was not found"}}
            }}),
        );
        assert_eq!(matching(&r, "Schema \"Pet\" has a short").len(), 1);
        assert_eq!(matching(&r, "Property \"id\"")[0].severity, Severity::Low);
        assert!(matching(&r, "Property \"owner\"").is_empty());
        assert_eq!(matching(&r, "Parameter \"Limit\" has no").len(), 1);
        assert_eq!(matching(&r, "Request body \"PetBody\"").len(), 1);
        assert!(matching(&r, "Response \"NotFound\"").is_empty());
    }
}
