//! OpenAPI to TypeScript type synthesis.
//!
//! This module reads OpenAPI 3.0/3.1 documents and produces:
//! - One declaration per component schema, under the schema's own name
//! - Per-operation path parameter, query parameter, request body and
//!   response declarations
//! - Named declarations for nested objects, shared across the document

mod orchestrator;
mod output;
mod spec;

pub use orchestrator::convert;
pub use output::{OpenApiComponent, OpenApiOutput, OpenApiPath, OpenApiResponse};
pub use spec::{HTTP_METHODS, OpenApiDocument};
