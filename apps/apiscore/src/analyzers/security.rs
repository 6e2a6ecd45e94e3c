//! Security: global requirements, scheme completeness, operation coverage.

use super::{AnalysisOptions, Analyzer, Findings};
use crate::error::AnalyzerError;
use crate::models::document::{is_write_method, Document, SecurityScheme};
use crate::models::{Criterion, CriterionResult, Severity};

const SCHEMES_PATH: &str = "components/securitySchemes";

/// OAuth2 flows in checking order with `(needs authorizationUrl, needs tokenUrl)`.
const OAUTH_FLOWS: [(&str, bool, bool); 4] = [
    ("implicit", true, false),
    ("password", false, true),
    ("clientCredentials", false, true),
    ("authorizationCode", true, true),
];

pub struct SecurityAnalyzer;

impl Analyzer for SecurityAnalyzer {
    fn criterion(&self) -> Criterion {
        Criterion::Security
    }

    fn analyze(
        &self,
        doc: &Document,
        _opts: &AnalysisOptions,
    ) -> Result<CriterionResult, AnalyzerError> {
        let mut out = Findings::new(Criterion::Security);
        out.count(1);

        let global = doc.has_global_security();
        if !global {
            out.push(
                "root",
                None,
                "security",
                "No global security requirements defined",
                Severity::Medium,
                "Define global security requirements to ensure all endpoints are secured by default",
            );
        }

        if let Some(components) = doc.components() {
            let schemes = components.security_schemes();
            out.count(schemes.len());
            for (name, scheme) in schemes {
                if !scheme.has("$ref") {
                    check_scheme(&mut out, name, scheme);
                }
            }
        }

        for (path, method, op) in doc.operations() {
            out.count(1);
            let write = is_write_method(method);
            let severity = if write {
                Severity::High
            } else {
                Severity::Medium
            };
            match op.security() {
                Some(reqs) if reqs.is_empty() => out.push(
                    path,
                    Some(method),
                    "security",
                    format!(
                        "{} operation explicitly disables security",
                        method.to_uppercase()
                    ),
                    severity,
                    if write {
                        "Consider adding security requirements for write operations"
                    } else {
                        "Consider if this operation really should be publicly accessible"
                    },
                ),
                None if !global => out.push(
                    path,
                    Some(method),
                    "security",
                    format!(
                        "{} operation has no security requirements",
                        method.to_uppercase()
                    ),
                    severity,
                    if write {
                        "Add security requirements for write operations"
                    } else {
                        "Consider adding security requirements"
                    },
                ),
                _ => {}
            }
        }

        Ok(out.finish())
    }
}

fn flag(out: &mut Findings, location: &str, description: impl Into<String>, suggestion: &str) {
    out.push(SCHEMES_PATH, None, location, description, Severity::High, suggestion);
}

fn check_scheme(out: &mut Findings, name: &str, scheme: SecurityScheme<'_>) {
    let Some(kind) = scheme.scheme_type() else {
        flag(
            out,
            name,
            "Security scheme is missing a type",
            "Define a valid security scheme type (apiKey, http, oauth2, openIdConnect)",
        );
        return;
    };

    match kind {
        "apiKey" => {
            if !scheme.has("name") {
                flag(
                    out,
                    name,
                    "API key security scheme is missing the \"name\" property",
                    "Add the name property to specify the key name",
                );
            }
            if !scheme.has("in") {
                flag(
                    out,
                    name,
                    "API key security scheme is missing the \"in\" property",
                    "Add the in property to specify where the key is located (header, query, cookie)",
                );
            }
        }
        "http" => {
            if !scheme.has("scheme") {
                flag(
                    out,
                    name,
                    "HTTP security scheme is missing the \"scheme\" property",
                    "Add the scheme property (e.g., basic, bearer, digest)",
                );
            }
        }
        "oauth2" => match scheme.flows().filter(|f| !f.is_empty()) {
            None => flag(
                out,
                name,
                "OAuth2 security scheme is missing flow definitions",
                "Define at least one OAuth2 flow (implicit, password, clientCredentials, authorizationCode)",
            ),
            Some(flows) => {
                for (flow_name, needs_auth_url, needs_token_url) in OAUTH_FLOWS {
                    let Some((_, flow)) = flows.iter().find(|(n, _)| *n == flow_name) else {
                        continue;
                    };
                    let loc = format!("{}.flows.{}", name, flow_name);
                    if !flow.has_scopes() {
                        flag(
                            out,
                            &loc,
                            format!("OAuth2 flow \"{}\" is missing scopes", flow_name),
                            "Define at least one scope for the OAuth2 flow",
                        );
                    }
                    if needs_auth_url && !flow.has("authorizationUrl") {
                        flag(
                            out,
                            &loc,
                            format!("OAuth2 {} flow is missing authorizationUrl", flow_name),
                            "Add the authorizationUrl property",
                        );
                    }
                    if needs_token_url && !flow.has("tokenUrl") {
                        flag(
                            out,
                            &loc,
                            format!("OAuth2 {} flow is missing tokenUrl", flow_name),
                            "Add the tokenUrl property",
                        );
                    }
                }
            }
        },
        "openIdConnect" => {
            if !scheme.has("openIdConnectUrl") {
                flag(
                    out,
                    name,
                    "OpenID Connect security scheme is missing the \"openIdConnectUrl\" property",
                    "Add the openIdConnectUrl property pointing to the OpenID Connect configuration",
                );
            }
        }
        other => flag(
            out,
            name,
            format!("Invalid security scheme type: \"{}\"", other),
            "Use a valid security scheme type (apiKey, http, oauth2, openIdConnect)",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{matching, run};
    use serde_json::json;

    #[test]
    fn test_global_security_missing() {
        let r = run(&SecurityAnalyzer, json!({"paths": {}}));
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].path, "root");
        assert_eq!(r.score, 8);
    }

    #[test]
    fn test_scheme_requirements() {
        let r = run(
            &SecurityAnalyzer,
            json!({"security": [{"k": []}], "components": {"securitySchemes": {
                "k": {"type": "apiKey"},
                "h": {"type": "http"},
                "o": {"type": "oauth2", "flows": {}},
                "oidc": {"type": "openIdConnect"},
                "weird": {"type": "mutualTLS"},
                "none": {"description": "untyped"}
            }}}),
        );
        assert_eq!(matching(&r, "\"name\" property").len(), 1);
        assert_eq!(matching(&r, "\"in\" property").len(), 1);
        assert_eq!(matching(&r, "\"scheme\" property").len(), 1);
        assert_eq!(matching(&r, "missing flow definitions").len(), 1);
        assert_eq!(matching(&r, "openIdConnectUrl").len(), 1);
        assert_eq!(matching(&r, "Invalid security scheme type: \"mutualTLS\"").len(), 1);
        assert_eq!(matching(&r, "missing a type").len(), 1);
        assert!(r.issues.iter().all(|i| i.severity == Severity::High));
    }

    #[test]
    fn test_oauth_flow_requirements() {
        let r = run(
            &SecurityAnalyzer,
            json!({"security": [{"o": []}], "components": {"securitySchemes": {"o": {
                "type": "oauth2",
                "flows": {
                    "authorizationCode": {"scopes": {}},
                    "implicit": {"authorizationUrl": "https://a", "scopes": {"read": "r"}},
                    "password": {"scopes": {"read": "r"}}
                }
            }}}}),
        );
        assert_eq!(matching(&r, "flow \"authorizationCode\" is missing scopes").len(), 1);
        assert_eq!(matching(&r, "authorizationCode flow is missing authorizationUrl").len(), 1);
        assert_eq!(matching(&r, "authorizationCode flow is missing tokenUrl").len(), 1);
        assert_eq!(matching(&r, "password flow is missing tokenUrl").len(), 1);
        assert_eq!(r.issues.len(), 4);
        assert_eq!(r.issues[0].location, "o.flows.password");
    }

    #[test]
    fn test_operation_coverage() {
        let r = run(
            &SecurityAnalyzer,
            json!({"paths": {"/a": {
                "get": {},
                "post": {},
                "put": {"security": []},
                "delete": {"security": [{"k": []}]}
            }}}),
        );
        assert_eq!(matching(&r, "GET operation has no security")[0].severity, Severity::Medium);
        assert_eq!(matching(&r, "POST operation has no security")[0].severity, Severity::High);
        assert_eq!(matching(&r, "PUT operation explicitly disables")[0].severity, Severity::High);
        assert!(matching(&r, "DELETE").is_empty());

        let covered = run(
            &SecurityAnalyzer,
            json!({"security": [{"k": []}], "paths": {"/a": {"get": {}, "head": {"security": []}}}}),
        );
        assert_eq!(covered.issues.len(), 1);
        assert_eq!(covered.issues[0].severity, Severity::Medium);
    }
}
