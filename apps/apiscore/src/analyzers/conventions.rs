//! Miscellaneous Best Practices: metadata conventions plus component reuse.

use super::{AnalysisOptions, Analyzer, Findings};
use crate::error::AnalyzerError;
use crate::models::document::{Document, MediaType, Parameter, RefOr, SchemaNode};
use crate::models::{Criterion, CriterionResult, Severity};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Component sections whose entries can be referenced from paths.
const REUSABLE_SECTIONS: [&str; 4] = ["schemas", "parameters", "requestBodies", "responses"];
/// More inline definitions than this is reported as a reuse opportunity.
const INLINE_LIMIT: usize = 10;
/// Fixed number of convention checks; drives the zero-item guard only.
const CHECKS: usize = 10;

fn semver_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("semver regex must compile"))
}

pub struct ConventionsAnalyzer;

impl Analyzer for ConventionsAnalyzer {
    fn criterion(&self) -> Criterion {
        Criterion::BestPractices
    }

    fn analyze(
        &self,
        doc: &Document,
        opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError> {
        let mut out = Findings::new(Criterion::BestPractices);
        out.count(CHECKS);

        check_info(&mut out, doc);
        check_servers(&mut out, doc);
        check_tags(&mut out, doc);
        if doc.components().is_some() && doc.has_paths() {
            check_reuse(&mut out, doc, opts.max_schema_depth);
        }

        Ok(out.finish())
    }
}

fn check_info(out: &mut Findings, doc: &Document) {
    let info = doc.info();
    if !info.is_some_and(|i| i.has_version()) {
        out.push(
            "info",
            None,
            "version",
            "API version is not specified",
            Severity::High,
            "Add a version following semantic versioning (e.g., 1.0.0)",
        );
    } else if let Some(v) = info
        .and_then(|i| i.version_text())
        .filter(|v| !semver_re().is_match(v))
    {
        out.push(
            "info",
            None,
            "version",
            format!("API version \"{}\" does not follow semantic versioning", v),
            Severity::Low,
            "Use semantic versioning (MAJOR.MINOR.PATCH) for the API version",
        );
    }

    if !info.is_some_and(|i| i.has_license()) {
        out.push(
            "info",
            None,
            "license",
            "License information is missing",
            Severity::Low,
            "Add license information to help API consumers understand usage terms",
        );
    } else if !info.is_some_and(|i| i.has_license_name()) {
        out.push(
            "info",
            None,
            "license.name",
            "License name is missing",
            Severity::Low,
            "Specify the license name",
        );
    }

    if !info.is_some_and(|i| i.has_terms_of_service()) {
        out.push(
            "info",
            None,
            "termsOfService",
            "Terms of service URL is missing",
            Severity::Low,
            "Add a terms of service URL to help API consumers understand usage terms",
        );
    }
}

fn check_servers(out: &mut Findings, doc: &Document) {
    let servers = doc.servers();
    if servers.is_empty() {
        out.push(
            "root",
            None,
            "servers",
            "No servers defined in the API",
            Severity::Medium,
            "Add at least one server URL to help consumers understand where the API is deployed",
        );
        return;
    }
    for (idx, server) in servers.iter().enumerate() {
        if server.url().is_none() {
            out.push(
                "servers",
                None,
                format!("[{}]", idx),
                "Server URL is missing",
                Severity::Medium,
                "Add a valid URL for the server",
            );
        } else if !server.has_description() {
            out.push(
                "servers",
                None,
                format!("[{}]", idx),
                "Server description is missing",
                Severity::Low,
                "Add a description to help consumers understand the server purpose (e.g., production, staging)",
            );
        }
    }
}

fn check_tags(out: &mut Findings, doc: &Document) {
    let tags = doc.tags();
    if tags.is_empty() {
        out.push(
            "root",
            None,
            "tags",
            "No tags defined in the API",
            Severity::Medium,
            "Define tags to group operations by resources or functionality",
        );
    }
    for (idx, tag) in tags.iter().enumerate() {
        if !tag.has_description() {
            out.push(
                "tags",
                None,
                format!("[{}]", idx),
                format!("Tag \"{}\" has no description", tag.name().unwrap_or("")),
                Severity::Low,
                "Add a description to explain the tag purpose",
            );
        }
    }

    let untagged = doc
        .operations()
        .filter(|(_, _, op)| op.tags().is_empty())
        .count();
    if untagged > 0 {
        out.push(
            "paths",
            None,
            "operations",
            format!("{} operations are not tagged", untagged),
            Severity::Medium,
            "Add tags to all operations for better organization",
        );
    }
}

/// Reference and inline-definition counters for one analyzer run.
struct ReuseCounter {
    refs: HashMap<String, usize>,
    order: Vec<String>,
    inline: usize,
    max_depth: usize,
}

impl ReuseCounter {
    fn new(doc: &Document, max_depth: usize) -> Self {
        let mut order = Vec::new();
        if let Some(components) = doc.components() {
            for section in REUSABLE_SECTIONS {
                for name in components.keys(section) {
                    order.push(format!("#/components/{}/{}", section, name));
                }
            }
        }
        let refs = order.iter().map(|k| (k.clone(), 0)).collect();
        ReuseCounter {
            refs,
            order,
            inline: 0,
            max_depth,
        }
    }

    fn hit(&mut self, reference: &str) {
        if let Some(n) = self.refs.get_mut(reference) {
            *n += 1;
        }
    }

    fn parameters(&mut self, params: Vec<RefOr<'_, Parameter<'_>>>) {
        for p in params {
            match p {
                RefOr::Ref(r) => self.hit(r),
                RefOr::Item(p) => {
                    self.inline += 1;
                    if let Some(schema) = p.schema() {
                        self.schema(schema, 0);
                    }
                }
            }
        }
    }

    fn content(&mut self, content: Vec<(&str, MediaType<'_>)>) {
        for (_, mt) in content {
            if let Some(schema) = mt.schema() {
                self.schema(schema, 0);
            }
        }
    }

    fn schema(&mut self, node: SchemaNode<'_>, depth: usize) {
        if depth > self.max_depth {
            return;
        }
        let schema = match node {
            RefOr::Ref(r) => return self.hit(r),
            RefOr::Item(s) => s,
        };
        for (_, prop) in schema.properties() {
            self.schema(prop, depth + 1);
        }
        if let Some(items) = schema.items() {
            self.schema(items, depth + 1);
        }
        for (_, members) in schema.compositions() {
            for member in members {
                self.schema(member, depth + 1);
            }
        }
    }

    fn unused(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|k| self.refs.get(*k).copied().unwrap_or(0) == 0)
            .map(String::as_str)
            .collect()
    }
}

fn check_reuse(out: &mut Findings, doc: &Document, max_depth: usize) {
    let mut counter = ReuseCounter::new(doc, max_depth);

    for (_, item) in doc.paths() {
        counter.parameters(item.parameters());
        for (_, op) in item.operations() {
            counter.parameters(op.parameters());
            match op.request_body() {
                Some(RefOr::Ref(r)) => counter.hit(r),
                Some(RefOr::Item(body)) => {
                    counter.inline += 1;
                    counter.content(body.content());
                }
                None => {}
            }
            for (_, resp) in op.responses().unwrap_or_default() {
                match resp {
                    RefOr::Ref(r) => counter.hit(r),
                    RefOr::Item(resp) => {
                        counter.inline += 1;
                        counter.content(resp.content());
                    }
                }
            }
        }
    }

    let unused = counter.unused();
    if !unused.is_empty() {
        out.push(
            "components",
            None,
            "",
            format!("{} component definitions are unused", unused.len()),
            Severity::Low,
            "Remove unused component definitions or ensure they are referenced properly",
        );
    }
    if counter.inline > INLINE_LIMIT {
        out.push(
            "paths",
            None,
            "",
            format!(
                "Found {} inline schemas that could be reused",
                counter.inline
            ),
            Severity::Medium,
            "Move common schemas to components/schemas for better reusability",
        );
    }
}
