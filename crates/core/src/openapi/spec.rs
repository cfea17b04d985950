//! OpenAPI document skeleton for serde deserialization.
//!
//! Only the structure the orchestrator walks is typed here. Schemas stay as
//! raw `serde_json::Value` and go through the schema builder, so every
//! keyword it understands works the same inside and outside OpenAPI.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP methods that make up a path item, in the order OpenAPI lists them.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Root OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct OpenApiDocument {
    /// Version string, e.g. `3.1.0`.
    pub openapi: String,
    /// Path templates in document order.
    pub paths: IndexMap<String, PathItem>,
    /// Reusable definitions.
    #[serde(default)]
    pub components: Components,
}

impl OpenApiDocument {
    /// Check the top level, then deserialize the skeleton, reporting the
    /// JSON path of the first malformed value.
    pub fn from_value(document: &Value) -> Result<Self> {
        let Some(root) = document.as_object() else {
            return Err(Error::InvalidDocument("expected a JSON object".to_string()));
        };
        if !root.get("openapi").is_some_and(Value::is_string) {
            return Err(Error::InvalidDocument(
                "missing `openapi` version string".to_string(),
            ));
        }
        if !root.get("paths").is_some_and(Value::is_object) {
            return Err(Error::InvalidDocument("missing `paths` object".to_string()));
        }

        serde_path_to_error::deserialize(document)
            .map_err(|err| Error::InvalidDocument(format!("{} at `{}`", err.inner(), err.path())))
    }
}

/// Components section containing reusable schemas and operation parts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas, emitted under their own names.
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
    /// Shared parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, ReferenceOr<Parameter>>,
    /// Shared request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, ReferenceOr<RequestBody>>,
    /// Shared responses.
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

/// Either a `$ref` object or the thing itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    /// `{ "$ref": "#/components/..." }`
    Reference {
        /// Pointer to the referenced component.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline definition.
    Item(T),
}

impl<T> ReferenceOr<T> {
    /// Follow references through `table` until an inline item is found.
    ///
    /// Only pointers of the form `{prefix}{name}` are understood.
    pub fn resolve<'a>(
        &'a self,
        table: &'a IndexMap<String, ReferenceOr<T>>,
        prefix: &str,
    ) -> std::result::Result<&'a T, String> {
        let mut current = self;
        for _ in 0..=table.len() {
            match current {
                ReferenceOr::Item(item) => return Ok(item),
                ReferenceOr::Reference { reference } => {
                    let Some(name) = reference.strip_prefix(prefix) else {
                        return Err(format!("`{reference}` is not a `{prefix}` reference"));
                    };
                    current = table
                        .get(name)
                        .ok_or_else(|| format!("`{reference}` does not exist"))?;
                }
            }
        }
        Err(format!("reference cycle through `{prefix}`"))
    }
}

/// A path item: shared parameters plus one entry per HTTP method.
#[derive(Debug, Deserialize)]
pub struct PathItem {
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
    /// Remaining keys; operations are picked out by [`PathItem::operations`].
    #[serde(flatten)]
    pub entries: IndexMap<String, Value>,
}

impl PathItem {
    /// Operations in declared order, deserialized on demand.
    pub fn operations(&self) -> Result<Vec<(&str, Operation)>> {
        self.entries
            .iter()
            .filter(|(key, _)| HTTP_METHODS.contains(&key.as_str()))
            .map(|(method, value)| {
                serde_path_to_error::deserialize(value)
                    .map(|operation| (method.as_str(), operation))
                    .map_err(|err| {
                        Error::InvalidDocument(format!(
                            "{} at `{method}.{}`",
                            err.inner(),
                            err.path()
                        ))
                    })
            })
            .collect()
    }
}

/// An API operation (endpoint).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Source of the declaration base name when present.
    pub operation_id: Option<String>,
    /// Copied to the output entry.
    pub summary: Option<String>,
    /// Copied to the output entry.
    pub description: Option<String>,
    /// Operation-level parameters; they override path-level ones.
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
    /// Inline or referenced request body.
    pub request_body: Option<ReferenceOr<RequestBody>>,
    /// Responses keyed by status code, in document order.
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

/// A parameter (query, path, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Field name in the generated object.
    pub name: String,
    /// `path`, `query`, `header` or `cookie`.
    #[serde(rename = "in")]
    pub location: String,
    /// Ignored for `path` parameters, which are always required.
    #[serde(default)]
    pub required: bool,
    /// Rendered as JSDoc on the field.
    pub description: Option<String>,
    /// Rendered as a `@deprecated` tag.
    #[serde(default)]
    pub deprecated: bool,
    /// Value schema.
    pub schema: Option<Value>,
    /// Alternative to `schema` for complex serializations.
    pub content: Option<IndexMap<String, MediaType>>,
}

impl Parameter {
    /// `schema`, or the preferred `content` schema.
    pub fn schema(&self) -> Option<&Value> {
        self.schema
            .as_ref()
            .or_else(|| self.content.as_ref().and_then(select_schema))
    }
}

/// A request body definition.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    /// Body schemas per media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Empty when the document leaves it out.
    #[serde(default)]
    pub description: String,
    /// Body schemas per media type; empty for bodiless responses.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Deserialize)]
pub struct MediaType {
    /// Body schema, absent for opaque payloads.
    pub schema: Option<Value>,
}

/// Pick the body schema: `application/json`, then any `+json` type, then the
/// first media type that has a schema.
pub fn select_schema(content: &IndexMap<String, MediaType>) -> Option<&Value> {
    let with_schema = || {
        content.iter().filter_map(|(media_type, entry)| {
            entry.schema.as_ref().map(|schema| (media_type, schema))
        })
    };

    with_schema()
        .find(|(media_type, _)| media_type.as_str() == "application/json")
        .or_else(|| with_schema().find(|(media_type, _)| media_type.ends_with("+json")))
        .or_else(|| with_schema().next())
        .map(|(_, schema)| schema)
}
