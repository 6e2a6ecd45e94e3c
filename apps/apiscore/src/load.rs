//! Document acquisition: read, parse, validate, and check references.
//!
//! References are only checked for resolvability; they are never expanded,
//! since analyzers treat `$ref` nodes as opaque.

use crate::error::{LoadError, LoadResult};
use crate::models::document::Document;
use serde_json::{Map, Value as Json};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Syntax of the input text.
pub enum SourceFormat {
    Json,
    Yaml,
    /// Try JSON first, fall back to YAML.
    Auto,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => SourceFormat::Json,
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            _ => SourceFormat::Auto,
        }
    }
}

/// Load and check a local document.
pub fn load_document(path: &Path) -> LoadResult<Document> {
    let shown = path.to_string_lossy();
    if shown.starts_with("http://") || shown.starts_with("https://") {
        return Err(LoadError::Connection(shown.into_owned()));
    }
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    debug!(path = %shown, bytes = text.len(), "read document");
    load_document_str(&text, SourceFormat::from_path(path))
}

/// Parse and check in-memory text.
pub fn load_document_str(text: &str, format: SourceFormat) -> LoadResult<Document> {
    let root = match format {
        SourceFormat::Json => {
            serde_json::from_str(text).map_err(|e| LoadError::Syntax(e.to_string()))?
        }
        SourceFormat::Yaml => parse_yaml(text)?,
        SourceFormat::Auto => match serde_json::from_str(text) {
            Ok(v) => v,
            Err(_) => parse_yaml(text)?,
        },
    };
    validate(&root)?;
    check_refs(&root, &root, &mut Vec::new())?;
    debug!("document passed structural and reference checks");
    Ok(Document::new(root))
}

fn parse_yaml(text: &str) -> LoadResult<Json> {
    let y: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| LoadError::Syntax(e.to_string()))?;
    Ok(yaml_to_json(y))
}

/// Convert YAML into JSON, turning non-string mapping keys (e.g. `200:`)
/// into strings.
fn yaml_to_json(v: serde_yaml::Value) -> Json {
    use serde_yaml::Value as Y;
    match v {
        Y::Null => Json::Null,
        Y::Bool(b) => Json::Bool(b),
        Y::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(u) = n.as_u64() {
                Json::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .unwrap_or(Json::Null)
            }
        }
        Y::String(s) => Json::String(s),
        Y::Sequence(seq) => Json::Array(seq.into_iter().map(yaml_to_json).collect()),
        Y::Mapping(m) => {
            let mut out = Map::new();
            for (k, v) in m {
                out.insert(yaml_key(k), yaml_to_json(v));
            }
            Json::Object(out)
        }
        Y::Tagged(t) => yaml_to_json(t.value),
    }
}

fn yaml_key(k: serde_yaml::Value) -> String {
    use serde_yaml::Value as Y;
    match k {
        Y::String(s) => s,
        Y::Number(n) => n.to_string(),
        Y::Bool(b) => b.to_string(),
        Y::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn validate(root: &Json) -> LoadResult<()> {
    let obj = root
        .as_object()
        .ok_or_else(|| LoadError::Validation("document root must be an object".into()))?;
    match obj.get("openapi") {
        Some(Json::String(v)) if v.starts_with("3.") => {}
        Some(Json::String(v)) => {
            return Err(LoadError::Validation(format!(
                "unsupported openapi version '{}' (expected 3.x)",
                v
            )))
        }
        Some(_) => return Err(LoadError::Validation("'openapi' must be a string".into())),
        None if obj.contains_key("swagger") => {
            return Err(LoadError::Validation(
                "Swagger 2.0 documents are not supported; convert to OpenAPI 3.x".into(),
            ))
        }
        None => return Err(LoadError::Validation("missing 'openapi' field".into())),
    }
    if !obj.get("info").is_some_and(Json::is_object) {
        return Err(LoadError::Validation("missing 'info' object".into()));
    }
    if let Some(paths) = obj.get("paths") {
        if !paths.is_object() {
            return Err(LoadError::Validation("'paths' must be an object".into()));
        }
    }
    Ok(())
}

fn check_refs(root: &Json, node: &Json, trail: &mut Vec<String>) -> LoadResult<()> {
    match node {
        Json::Object(m) => {
            if let Some(Json::String(r)) = m.get("$ref") {
                let at = format!("/{}", trail.join("/"));
                let pointer = r.strip_prefix('#').ok_or_else(|| {
                    LoadError::Reference(format!("{} at {} is not a local reference", r, at))
                })?;
                if root.pointer(pointer).is_none() {
                    return Err(LoadError::Reference(format!(
                        "{} at {} does not resolve",
                        r, at
                    )));
                }
            }
            for (k, v) in m {
                trail.push(k.clone());
                check_refs(root, v, trail)?;
                trail.pop();
            }
        }
        Json::Array(a) => {
            for (i, v) in a.iter().enumerate() {
                trail.push(i.to_string());
                check_refs(root, v, trail)?;
                trail.pop();
            }
        }
        _ => {}
    }
    Ok(())
}
