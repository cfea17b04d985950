//! Result records handed back to the binding layer.
//!
//! Field names serialize in camelCase; absent categories are omitted rather
//! than serialized as `null`.

use indexmap::IndexMap;
use serde::Serialize;

use crate::diagnostics::Diagnostic;

/// Everything generated from one OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiOutput {
    /// One entry per operation, in document order.
    pub paths: Vec<OpenApiPath>,
    /// Named shapes: `components.schemas` entries and hoisted objects.
    pub components: Vec<OpenApiComponent>,
    /// Recoverable defects found while converting.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl OpenApiOutput {
    /// Look up an operation by path template and lowercase method.
    pub fn operation(&self, path: &str, method: &str) -> Option<&OpenApiPath> {
        self.paths
            .iter()
            .find(|entry| entry.path == path && entry.method == method)
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&OpenApiComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Type declarations for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiPath {
    /// Path template, e.g. `/users/{id}`.
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
    /// Operation summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declaration of the query parameter object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_ts_type: Option<String>,
    /// Declaration of the path parameter object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_ts_type: Option<String>,
    /// Declaration of the request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    /// Status code to response, in document order.
    pub responses: IndexMap<String, OpenApiResponse>,
}

/// One documented response of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiResponse {
    /// Response description, empty when absent.
    pub description: String,
    /// Declaration of the response body, `void` when there is none.
    pub ts_type: String,
}

/// A named, shared declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiComponent {
    /// Component name as declared.
    pub name: String,
    /// Full declaration text.
    pub ts_type: String,
}
