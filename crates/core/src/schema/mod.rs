//! JSON Schema to TypeScript declarations.
//!
//! The pipeline runs in three passes over a per-call [`Registry`]:
//!
//! 1. [`builder`] turns the schema into [`Shape`]s, registering every `$ref`
//!    target under a reserved name.
//! 2. [`dedup`] rewrites nested objects that repeat, or that match a
//!    registered definition, into references.
//! 3. [`emit`] renders each component as one declaration.
//!
//! Nothing is cached between calls; two calls with the same input produce
//! byte-identical output.

pub mod builder;
pub mod dedup;
pub mod emit;
pub mod equivalence;
pub mod registry;
pub mod shape;
pub mod utils;

use serde_json::Value;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};
use crate::options::SchemaTypeOptions;

pub use builder::ShapeBuilder;
pub use dedup::{Deduplicator, HoistPolicy};
pub use emit::{Emit, Emitter};
pub use registry::{Component, ComponentOrigin, NameAllocator, Registry, ShapePath};
pub use shape::{Field, Literal, ObjectShape, Primitive, Shape};

/// One emitted `export` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declared type name.
    pub name: String,
    /// Full declaration text, without a trailing newline.
    pub text: String,
}

/// Result of converting one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeOutput {
    /// Name of the root declaration.
    pub name: String,
    /// Root declaration first, then definitions and hoisted shapes in
    /// registration order.
    pub declarations: Vec<Declaration>,
    /// Recoverable defects found while building.
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeOutput {
    /// All declarations separated by blank lines.
    pub fn text(&self) -> String {
        self.declarations
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Look up a declaration by name.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }
}

/// Convert one JSON Schema into TypeScript declarations rooted at `name`.
pub fn synthesize(
    name: &str,
    schema: &Value,
    options: Option<&SchemaTypeOptions>,
) -> Result<TypeOutput> {
    if name.trim().is_empty() {
        return Err(Error::InvalidSchema("type name must not be empty".to_string()));
    }
    if !schema.is_object() {
        return Err(Error::InvalidSchema(format!(
            "expected a JSON object, found {}",
            builder::json_kind(schema)
        )));
    }

    let options = options.copied().unwrap_or_default();
    let mut registry = Registry::new();
    let mut diagnostics = Diagnostics::default();

    let root = registry.reserve_root(name)?;
    ShapeBuilder::new(schema, &mut registry, &mut diagnostics).build_definition(&root, schema)?;
    Deduplicator::shared(&mut registry).canonicalize_components()?;

    let emitter = Emitter::new(options);
    let declarations: Vec<Declaration> = registry
        .components()
        .iter()
        .filter_map(|component| {
            component.shape.as_ref().map(|shape| Declaration {
                name: component.name.clone(),
                text: emitter.declaration(&component.name, shape),
            })
        })
        .collect();

    tracing::debug!(
        name = %root,
        declarations = declarations.len(),
        diagnostics = diagnostics.records().len(),
        "synthesized schema types"
    );

    Ok(TypeOutput {
        name: root,
        declarations,
        diagnostics: diagnostics.into_vec(),
    })
}
