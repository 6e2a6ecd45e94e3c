//! Schema & Types: structural soundness of every inline schema.
//!
//! One recursive walk applies the same checks at every inline node and
//! descends through `properties`, `items`, and `allOf`/`oneOf`/`anyOf`.
//! `$ref` nodes end the walk; an explicit depth bound covers inline cycles.

use super::{AnalysisOptions, Analyzer, Findings};
use crate::error::AnalyzerError;
use crate::models::document::{Document, MediaType, Operation, RefOr, SchemaNode};
use crate::models::{Criterion, CriterionResult, Severity};

pub struct SchemaAnalyzer;

impl Analyzer for SchemaAnalyzer {
    fn criterion(&self) -> Criterion {
        Criterion::SchemaTypes
    }

    fn analyze(
        &self,
        doc: &Document,
        opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError> {
        let mut walk = Walk {
            out: Findings::new(Criterion::SchemaTypes),
            max_depth: opts.max_schema_depth,
        };

        if let Some(components) = doc.components() {
            let schemas = components.schemas();
            walk.out.count(schemas.len());
            for (name, node) in schemas {
                let site = Site {
                    path: "components/schemas",
                    operation: None,
                };
                walk.visit(&site, node, format!("components/schemas/{}", name), 0, true);
            }
        }

        for (path, method, op) in doc.operations() {
            if op.request_body().is_some() {
                walk.out.count(1);
            }
            walk.out.count(op.response_codes().len());
            let site = Site {
                path,
                operation: Some(method),
            };
            walk.operation(&site, op);
        }

        Ok(walk.out.finish())
    }
}

struct Site<'a> {
    path: &'a str,
    operation: Option<&'a str>,
}

struct Walk {
    out: Findings,
    max_depth: usize,
}

impl Walk {
    fn operation(&mut self, site: &Site<'_>, op: Operation<'_>) {
        if let Some(RefOr::Item(body)) = op.request_body() {
            for (media, mt) in body.content() {
                let base = format!("requestBody.content.{}", media);
                self.media_type(site, mt, base, || {
                    format!(
                        "Request body for {} {} ({}) does not have a schema",
                        site_method(site),
                        site.path,
                        media
                    )
                });
            }
        }

        for (code, resp) in op.responses().unwrap_or_default() {
            let RefOr::Item(resp) = resp else { continue };
            for (media, mt) in resp.content() {
                let base = format!("responses.{}.content.{}", code, media);
                self.media_type(site, mt, base, || {
                    format!(
                        "Response for {} {} ({}, {}) does not have a schema",
                        site_method(site),
                        site.path,
                        code,
                        media
                    )
                });
            }
        }

        for (idx, param) in op.parameters().into_iter().enumerate() {
            let RefOr::Item(param) = param else { continue };
            let name = param.name().unwrap_or("");
            let base = format!("parameters[{}]", idx);
            let schema = param.schema();
            if schema.is_none() && !param.has_content() {
                self.out.push(
                    site.path,
                    site.operation,
                    base.clone(),
                    format!("Parameter \"{}\" has neither schema nor content defined", name),
                    Severity::High,
                    "Define either a schema or content for the parameter",
                );
            }
            if let Some(node) = schema {
                self.visit(site, node, format!("{}.schema", base), 0, false);
            }
            for (media, mt) in param.content() {
                self.media_type(site, mt, format!("{}.content.{}", base, media), || {
                    format!(
                        "Parameter \"{}\" content ({}) does not have a schema",
                        name, media
                    )
                });
            }
        }
    }

    fn media_type(
        &mut self,
        site: &Site<'_>,
        mt: MediaType<'_>,
        base: String,
        missing: impl FnOnce() -> String,
    ) {
        match mt.schema() {
            Some(node) => self.visit(site, node, format!("{}.schema", base), 0, false),
            None => self.out.push(
                site.path,
                site.operation,
                base,
                missing(),
                Severity::High,
                "Define a schema for the content",
            ),
        }
    }

    fn visit(
        &mut self,
        site: &Site<'_>,
        node: SchemaNode<'_>,
        loc: String,
        depth: usize,
        top_level: bool,
    ) {
        let RefOr::Item(schema) = node else { return };

        if depth > self.max_depth {
            self.out.push(
                site.path,
                site.operation,
                loc.clone(),
                format!(
                    "Schema nesting exceeds maximum depth of {} at \"{}\"",
                    self.max_depth, loc
                ),
                Severity::Medium,
                "Break deeply nested inline schemas into named components referenced with $ref",
            );
            return;
        }

        let structural = if top_level {
            Severity::High
        } else {
            Severity::Medium
        };
        let composed = schema.has_composition();

        if !schema.has_type() && !composed {
            self.out.push(
                site.path,
                site.operation,
                loc.clone(),
                format!("Schema at \"{}\" is missing a type definition", loc),
                structural,
                "Add a type property to the schema or use composition with allOf, oneOf, or anyOf",
            );
        }

        match schema.schema_type() {
            Some("array") if !schema.has_items() => self.out.push(
                site.path,
                site.operation,
                loc.clone(),
                format!("Array schema at \"{}\" does not define item type", loc),
                structural,
                "Add an items property to define the type of array elements",
            ),
            Some("object")
                if !schema.has_properties() && !schema.has_additional_properties() && !composed =>
            {
                self.out.push(
                    site.path,
                    site.operation,
                    loc.clone(),
                    format!("Object schema at \"{}\" has no properties defined", loc),
                    Severity::Medium,
                    "Define properties for the object or use composition patterns",
                )
            }
            _ => {}
        }

        if schema.additional_properties_is_true() {
            self.out.push(
                site.path,
                site.operation,
                loc.clone(),
                format!(
                    "Schema at \"{}\" allows any additional properties without constraints",
                    loc
                ),
                Severity::Medium,
                "Consider defining a schema for additionalProperties or setting it to false",
            );
        }

        if schema.has_properties() {
            for req in schema.required() {
                if !schema.has_property(req) {
                    self.out.push(
                        site.path,
                        site.operation,
                        format!("{}/required", loc),
                        format!(
                            "Schema at \"{}\" requires property \"{}\" that is not defined in properties",
                            loc, req
                        ),
                        Severity::High,
                        "Ensure all required properties are defined in the properties object",
                    );
                }
            }
        }

        for (name, prop) in schema.properties() {
            self.visit(site, prop, format!("{}/properties/{}", loc, name), depth + 1, false);
        }
        if let Some(items) = schema.items() {
            self.visit(site, items, format!("{}/items", loc), depth + 1, false);
        }
        for (kw, members) in schema.compositions() {
            for (i, member) in members.into_iter().enumerate() {
                self.visit(site, member, format!("{}/{}/{}", loc, kw, i), depth + 1, false);
            }
        }
    }
}

fn site_method(site: &Site<'_>) -> String {
    site.operation.unwrap_or("").to_uppercase()
}
