//! Type synthesis from JSON Schema and OpenAPI documents to TypeScript.
//!
//! Two entry points cover the two input kinds:
//! - [`schema_to_type`] / [`synthesize`] convert one JSON Schema into a root
//!   declaration plus every named declaration it depends on
//! - [`openapi_to_types`] converts a whole OpenAPI document into component
//!   declarations and per-operation parameter, body and response types
//!
//! Repeated anonymous object shapes are hoisted into named declarations and
//! referenced by name, so the output stays compact for large documents.
//! Every call owns its registry and returns owned text, so independent calls
//! never share state.

pub mod diagnostics;
pub mod error;
pub mod openapi;
pub mod options;
pub mod schema;

use serde_json::Value;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{Error, Result};
pub use openapi::{OpenApiComponent, OpenApiOutput, OpenApiPath, OpenApiResponse};
pub use options::SchemaTypeOptions;
pub use schema::{Declaration, Shape, TypeOutput, synthesize};

/// Convert one JSON Schema into TypeScript source.
///
/// The root declaration comes first, followed by the declarations of every
/// definition and hoisted shape it needs, separated by blank lines.
pub fn schema_to_type(
    name: &str,
    schema: &Value,
    options: Option<&SchemaTypeOptions>,
) -> Result<String> {
    Ok(synthesize(name, schema, options)?.text())
}

/// Convert an OpenAPI document with default options.
pub fn openapi_to_types(document: &Value) -> Result<OpenApiOutput> {
    openapi_to_types_with(document, &SchemaTypeOptions::default())
}

/// Convert an OpenAPI document.
pub fn openapi_to_types_with(
    document: &Value,
    options: &SchemaTypeOptions,
) -> Result<OpenApiOutput> {
    openapi::convert(document, options)
}
