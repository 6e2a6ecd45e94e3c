//! Borrowed, typed views over an OpenAPI document held as JSON.
//!
//! The document is kept as one `serde_json::Value` (order-preserving maps),
//! and each view wraps a reference into it. Accessors never fail: anything
//! of an unexpected shape reads as absent and is skipped by iterators.

use regex::Regex;
use serde_json::{Map, Value as Json};
use std::sync::OnceLock;

/// HTTP methods in the fixed visiting order.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "options", "head", "patch", "trace",
];

/// Methods that change server state.
pub const WRITE_METHODS: [&str; 4] = ["post", "put", "patch", "delete"];

pub fn is_write_method(method: &str) -> bool {
    WRITE_METHODS.contains(&method)
}

/// A value counts as present when it is not null, not `false`, and not "".
/// Numbers (including `0`), empty arrays and empty objects are present.
pub fn is_present(v: Option<&Json>) -> bool {
    match v {
        None | Some(Json::Null) | Some(Json::Bool(false)) => false,
        Some(Json::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn str_field<'a>(obj: &'a Map<String, Json>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Json::as_str)
}

fn obj_field<'a>(obj: &'a Map<String, Json>, key: &str) -> Option<&'a Map<String, Json>> {
    obj.get(key).and_then(Json::as_object)
}

fn has_example(obj: &Map<String, Json>) -> bool {
    obj.get("example").is_some_and(|v| !v.is_null())
        || obj.get("examples").is_some_and(|v| !v.is_null())
}

/// Either a `$ref` pointer or an inline object.
#[derive(Debug, Clone, Copy)]
pub enum RefOr<'a, T> {
    Ref(&'a str),
    Item(T),
}

impl<'a, T> RefOr<'a, T> {
    pub fn is_ref(&self) -> bool {
        matches!(self, RefOr::Ref(_))
    }

    pub fn item(self) -> Option<T> {
        match self {
            RefOr::Item(t) => Some(t),
            RefOr::Ref(_) => None,
        }
    }
}

fn ref_or<'a, T>(v: &'a Json, wrap: fn(&'a Map<String, Json>) -> T) -> Option<RefOr<'a, T>> {
    let obj = v.as_object()?;
    match obj.get("$ref") {
        Some(Json::String(r)) => Some(RefOr::Ref(r.as_str())),
        _ => Some(RefOr::Item(wrap(obj))),
    }
}

#[derive(Debug, Clone)]
/// Owned root document.
pub struct Document {
    root: Json,
}

impl Document {
    pub fn new(root: Json) -> Self {
        Document { root }
    }

    /// Build from JSON text; used heavily by tests.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Document::new)
    }

    pub fn raw(&self) -> &Json {
        &self.root
    }

    fn obj(&self) -> Option<&Map<String, Json>> {
        self.root.as_object()
    }

    pub fn openapi_version(&self) -> Option<&str> {
        self.obj().and_then(|o| str_field(o, "openapi"))
    }

    pub fn info(&self) -> Option<Info<'_>> {
        self.obj().and_then(|o| obj_field(o, "info")).map(Info)
    }

    pub fn title(&self) -> &str {
        self.info().and_then(|i| i.title()).unwrap_or("API")
    }

    pub fn has_paths(&self) -> bool {
        self.obj().and_then(|o| obj_field(o, "paths")).is_some()
    }

    /// Path items in source order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, PathItem<'_>)> {
        self.obj()
            .and_then(|o| obj_field(o, "paths"))
            .into_iter()
            .flat_map(|m| m.iter())
            .filter_map(|(k, v)| v.as_object().map(|o| (k.as_str(), PathItem(o))))
    }

    /// Every operation as `(path, method, operation)` in path then method order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &'static str, Operation<'_>)> {
        self.paths()
            .flat_map(|(path, item)| item.operations().map(move |(m, op)| (path, m, op)))
    }

    pub fn components(&self) -> Option<Components<'_>> {
        self.obj().and_then(|o| obj_field(o, "components")).map(Components)
    }

    pub fn servers(&self) -> Vec<Server<'_>> {
        self.obj()
            .and_then(|o| o.get("servers"))
            .and_then(Json::as_array)
            .map(|a| a.iter().filter_map(Json::as_object).map(Server).collect())
            .unwrap_or_default()
    }

    pub fn tags(&self) -> Vec<Tag<'_>> {
        self.obj()
            .and_then(|o| o.get("tags"))
            .and_then(Json::as_array)
            .map(|a| a.iter().filter_map(Json::as_object).map(Tag).collect())
            .unwrap_or_default()
    }

    /// Global security requirements, `None` when the key is absent.
    pub fn security(&self) -> Option<&Vec<Json>> {
        self.obj()
            .and_then(|o| o.get("security"))
            .and_then(Json::as_array)
    }

    pub fn has_global_security(&self) -> bool {
        self.security().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Info<'a>(&'a Map<String, Json>);

impl<'a> Info<'a> {
    pub fn title(&self) -> Option<&'a str> {
        str_field(self.0, "title")
    }
    pub fn version(&self) -> Option<&'a str> {
        str_field(self.0, "version")
    }
    pub fn has_version(&self) -> bool {
        is_present(self.0.get("version"))
    }
    /// Version as text, also for unquoted YAML numbers like `1.0`.
    pub fn version_text(&self) -> Option<String> {
        match self.0.get("version")? {
            Json::String(s) => Some(s.clone()),
            Json::Null => None,
            other => Some(other.to_string()),
        }
    }
    pub fn description(&self) -> Option<&'a str> {
        str_field(self.0, "description")
    }
    pub fn has_contact(&self) -> bool {
        is_present(self.0.get("contact"))
    }
    pub fn has_license(&self) -> bool {
        is_present(self.0.get("license"))
    }
    pub fn has_license_name(&self) -> bool {
        obj_field(self.0, "license").is_some_and(|l| is_present(l.get("name")))
    }
    pub fn has_terms_of_service(&self) -> bool {
        is_present(self.0.get("termsOfService"))
    }
}

fn parameters<'a>(obj: &'a Map<String, Json>) -> Vec<RefOr<'a, Parameter<'a>>> {
    obj.get("parameters")
        .and_then(Json::as_array)
        .map(|a| a.iter().filter_map(|v| ref_or(v, Parameter)).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy)]
pub struct PathItem<'a>(&'a Map<String, Json>);

impl<'a> PathItem<'a> {
    pub fn summary(&self) -> Option<&'a str> {
        str_field(self.0, "summary")
    }
    pub fn has_summary(&self) -> bool {
        is_present(self.0.get("summary"))
    }
    pub fn description(&self) -> Option<&'a str> {
        str_field(self.0, "description")
    }
    pub fn parameters(&self) -> Vec<RefOr<'a, Parameter<'a>>> {
        parameters(self.0)
    }
    pub fn operation(&self, method: &str) -> Option<Operation<'a>> {
        obj_field(self.0, method).map(Operation)
    }
    /// Defined operations in the fixed method order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, Operation<'a>)> + 'a {
        let obj = self.0;
        HTTP_METHODS
            .iter()
            .filter_map(move |m| obj_field(obj, m).map(|o| (*m, Operation(o))))
    }
    pub fn methods(&self) -> Vec<&'static str> {
        self.operations().map(|(m, _)| m).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Operation<'a>(&'a Map<String, Json>);

impl<'a> Operation<'a> {
    pub fn operation_id(&self) -> Option<&'a str> {
        str_field(self.0, "operationId").filter(|s| !s.is_empty())
    }
    pub fn summary(&self) -> Option<&'a str> {
        str_field(self.0, "summary")
    }
    pub fn has_summary(&self) -> bool {
        is_present(self.0.get("summary"))
    }
    pub fn description(&self) -> Option<&'a str> {
        str_field(self.0, "description")
    }
    pub fn tags(&self) -> Vec<&'a str> {
        self.0
            .get("tags")
            .and_then(Json::as_array)
            .map(|a| a.iter().filter_map(Json::as_str).collect())
            .unwrap_or_default()
    }
    /// Own security requirements; `Some(empty)` means explicitly disabled.
    pub fn security(&self) -> Option<&'a Vec<Json>> {
        self.0.get("security").and_then(Json::as_array)
    }
    pub fn parameters(&self) -> Vec<RefOr<'a, Parameter<'a>>> {
        parameters(self.0)
    }
    pub fn request_body(&self) -> Option<RefOr<'a, RequestBody<'a>>> {
        self.0.get("requestBody").and_then(|v| ref_or(v, RequestBody))
    }
    /// `None` when the operation has no responses object at all.
    pub fn responses(&self) -> Option<Vec<(&'a str, RefOr<'a, Response<'a>>)>> {
        obj_field(self.0, "responses").map(|m| {
            m.iter()
                .filter_map(|(code, v)| ref_or(v, Response).map(|r| (code.as_str(), r)))
                .collect()
        })
    }
    pub fn response_codes(&self) -> Vec<&'a str> {
        obj_field(self.0, "responses")
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Parameter<'a>(&'a Map<String, Json>);

impl<'a> Parameter<'a> {
    pub fn name(&self) -> Option<&'a str> {
        str_field(self.0, "name")
    }
    pub fn location(&self) -> Option<&'a str> {
        str_field(self.0, "in")
    }
    pub fn description(&self) -> Option<&'a str> {
        str_field(self.0, "description")
    }
    pub fn required(&self) -> bool {
        self.0.get("required").and_then(Json::as_bool).unwrap_or(false)
    }
    pub fn schema(&self) -> Option<SchemaNode<'a>> {
        self.0.get("schema").and_then(SchemaNode::from_json)
    }
    pub fn content(&self) -> Vec<(&'a str, MediaType<'a>)> {
        content(self.0)
    }
    pub fn has_content(&self) -> bool {
        obj_field(self.0, "content").is_some()
    }
    pub fn has_example(&self) -> bool {
        has_example(self.0)
    }
}

fn content<'a>(obj: &'a Map<String, Json>) -> Vec<(&'a str, MediaType<'a>)> {
    obj_field(obj, "content")
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_object().map(|o| (k.as_str(), MediaType(o))))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy)]
pub struct RequestBody<'a>(&'a Map<String, Json>);

impl<'a> RequestBody<'a> {
    pub fn description(&self) -> Option<&'a str> {
        str_field(self.0, "description")
    }
    pub fn has_content(&self) -> bool {
        obj_field(self.0, "content").is_some()
    }
    pub fn content(&self) -> Vec<(&'a str, MediaType<'a>)> {
        content(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Response<'a>(&'a Map<String, Json>);

impl<'a> Response<'a> {
    pub fn description(&self) -> Option<&'a str> {
        str_field(self.0, "description")
    }
    pub fn has_content(&self) -> bool {
        obj_field(self.0, "content").is_some()
    }
    pub fn content(&self) -> Vec<(&'a str, MediaType<'a>)> {
        content(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MediaType<'a>(&'a Map<String, Json>);

impl<'a> MediaType<'a> {
    pub fn schema(&self) -> Option<SchemaNode<'a>> {
        self.0.get("schema").and_then(SchemaNode::from_json)
    }
    pub fn has_example(&self) -> bool {
        has_example(self.0)
    }
    /// Example on the media type itself or on its inline schema.
    pub fn has_any_example(&self) -> bool {
        self.has_example()
            || matches!(self.schema(), Some(RefOr::Item(s)) if s.has_example())
    }
}

/// A schema position: a reference, never expanded, or an inline definition.
pub type SchemaNode<'a> = RefOr<'a, Schema<'a>>;

impl<'a> SchemaNode<'a> {
    pub fn from_json(v: &'a Json) -> Option<Self> {
        ref_or(v, Schema)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema<'a>(&'a Map<String, Json>);

impl<'a> Schema<'a> {
    pub fn schema_type(&self) -> Option<&'a str> {
        str_field(self.0, "type")
    }
    pub fn has_type(&self) -> bool {
        is_present(self.0.get("type"))
    }
    pub fn description(&self) -> Option<&'a str> {
        str_field(self.0, "description")
    }
    pub fn has_properties(&self) -> bool {
        obj_field(self.0, "properties").is_some()
    }
    pub fn properties(&self) -> Vec<(&'a str, SchemaNode<'a>)> {
        obj_field(self.0, "properties")
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| SchemaNode::from_json(v).map(|s| (k.as_str(), s)))
                    .collect()
            })
            .unwrap_or_default()
    }
    pub fn has_items(&self) -> bool {
        is_present(self.0.get("items"))
    }
    pub fn items(&self) -> Option<SchemaNode<'a>> {
        self.0.get("items").and_then(SchemaNode::from_json)
    }
    pub fn has_additional_properties(&self) -> bool {
        self.0.get("additionalProperties").is_some_and(|v| !v.is_null())
    }
    pub fn additional_properties_is_true(&self) -> bool {
        matches!(self.0.get("additionalProperties"), Some(Json::Bool(true)))
    }
    pub fn required(&self) -> Vec<&'a str> {
        self.0
            .get("required")
            .and_then(Json::as_array)
            .map(|a| a.iter().filter_map(Json::as_str).collect())
            .unwrap_or_default()
    }
    pub fn has_property(&self, name: &str) -> bool {
        obj_field(self.0, "properties").is_some_and(|m| m.contains_key(name))
    }
    /// `(keyword, members)` for each of allOf/oneOf/anyOf that is present.
    pub fn compositions(&self) -> Vec<(&'static str, Vec<SchemaNode<'a>>)> {
        ["allOf", "oneOf", "anyOf"]
            .into_iter()
            .filter_map(|kw| {
                self.0.get(kw).and_then(Json::as_array).map(|a| {
                    (kw, a.iter().filter_map(SchemaNode::from_json).collect::<Vec<_>>())
                })
            })
            .collect()
    }
    pub fn has_composition(&self) -> bool {
        ["allOf", "oneOf", "anyOf"]
            .iter()
            .any(|kw| is_present(self.0.get(*kw)))
    }
    pub fn has_example(&self) -> bool {
        has_example(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Components<'a>(&'a Map<String, Json>);

impl<'a> Components<'a> {
    fn section<T>(
        &self,
        key: &str,
        wrap: fn(&'a Map<String, Json>) -> T,
    ) -> Vec<(&'a str, RefOr<'a, T>)> {
        obj_field(self.0, key)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| ref_or(v, wrap).map(|r| (k.as_str(), r)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names defined under `components.<section>`.
    pub fn keys(&self, section: &str) -> Vec<&'a str> {
        obj_field(self.0, section)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn schemas(&self) -> Vec<(&'a str, SchemaNode<'a>)> {
        self.section("schemas", Schema)
    }
    pub fn parameters(&self) -> Vec<(&'a str, RefOr<'a, Parameter<'a>>)> {
        self.section("parameters", Parameter)
    }
    pub fn request_bodies(&self) -> Vec<(&'a str, RefOr<'a, RequestBody<'a>>)> {
        self.section("requestBodies", RequestBody)
    }
    pub fn responses(&self) -> Vec<(&'a str, RefOr<'a, Response<'a>>)> {
        self.section("responses", Response)
    }
    pub fn security_schemes(&self) -> Vec<(&'a str, SecurityScheme<'a>)> {
        obj_field(self.0, "securitySchemes")
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_object().map(|o| (k.as_str(), SecurityScheme(o))))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SecurityScheme<'a>(&'a Map<String, Json>);

impl<'a> SecurityScheme<'a> {
    pub fn scheme_type(&self) -> Option<&'a str> {
        str_field(self.0, "type").filter(|s| !s.is_empty())
    }
    pub fn has(&self, key: &str) -> bool {
        is_present(self.0.get(key))
    }
    pub fn flows(&self) -> Option<Vec<(&'a str, OAuthFlow<'a>)>> {
        obj_field(self.0, "flows").map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_object().map(|o| (k.as_str(), OAuthFlow(o))))
                .collect()
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OAuthFlow<'a>(&'a Map<String, Json>);

impl<'a> OAuthFlow<'a> {
    pub fn has(&self, key: &str) -> bool {
        is_present(self.0.get(key))
    }
    pub fn has_scopes(&self) -> bool {
        obj_field(self.0, "scopes").is_some_and(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Server<'a>(&'a Map<String, Json>);

impl<'a> Server<'a> {
    pub fn url(&self) -> Option<&'a str> {
        str_field(self.0, "url").filter(|s| !s.is_empty())
    }
    pub fn has_description(&self) -> bool {
        is_present(self.0.get("description"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Tag<'a>(&'a Map<String, Json>);

impl<'a> Tag<'a> {
    pub fn name(&self) -> Option<&'a str> {
        str_field(self.0, "name")
    }
    pub fn has_description(&self) -> bool {
        is_present(self.0.get("description"))
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^}]+\}").expect("placeholder regex must compile"))
}

/// True when the last segment is a `{param}` placeholder.
pub fn is_item_path(path: &str) -> bool {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .is_some_and(|seg| seg.starts_with('{') && seg.ends_with('}'))
}

/// Replace every `{...}` placeholder with a generic token.
pub fn normalize_path(path: &str) -> String {
    placeholder_re().replace_all(path, "{param}").into_owned()
}

/// Placeholder names in positional order.
pub fn path_params(path: &str) -> Vec<&str> {
    placeholder_re()
        .find_iter(path)
        .map(|m| &path[m.start() + 1..m.end() - 1])
        .collect()
}

/// Last `/`-separated segment of a `$ref`, e.g. `Pet` for `#/components/schemas/Pet`.
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_helpers() {
        assert!(is_item_path("/pets/{petId}"));
        assert!(!is_item_path("/pets"));
        assert!(!is_item_path("/pets/{petId}/toys"));
        assert_eq!(normalize_path("/a/{x}/b/{y}"), "/a/{param}/b/{param}");
        assert_eq!(path_params("/a/{x}/b/{y}"), vec!["x", "y"]);
        assert_eq!(ref_name("#/components/schemas/Pet"), "Pet");
    }

    #[test]
    fn test_operations_follow_method_order() {
        let doc = Document::new(json!({
            "paths": {"/a": {"patch": {}, "get": {}, "summary": "x", "delete": {}}}
        }));
        let methods: Vec<_> = doc.operations().map(|(_, m, _)| m).collect();
        assert_eq!(methods, vec!["get", "delete", "patch"]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let doc = Document::new(json!({
            "paths": {"/a": "oops", "/b": {"get": 3, "post": {}}},
            "servers": [1, {"url": "https://x"}]
        }));
        assert_eq!(doc.paths().count(), 1);
        assert_eq!(doc.operations().count(), 1);
        assert_eq!(doc.servers().len(), 1);
    }

    #[test]
    fn test_presence_rules() {
        assert!(!is_present(Some(&json!(""))));
        assert!(!is_present(Some(&json!(false))));
        assert!(!is_present(Some(&Json::Null)));
        assert!(is_present(Some(&json!(0))));
        let doc = Document::new(json!({"components": {"schemas": {
            "A": {"type": "object", "example": null},
            "B": {"$ref": "#/components/schemas/A"}
        }}}));
        let schemas = doc.components().map(|c| c.schemas()).unwrap_or_default();
        assert!(matches!(schemas[0].1, RefOr::Item(s) if !s.has_example()));
        assert!(schemas[1].1.is_ref());
    }
}
