//! Rendering options shared by both entry points.

use serde::Deserialize;

/// Style switches for the TypeScript emitter.
///
/// Deserializes from the camelCase object handed over by a binding layer;
/// missing keys fall back to [`SchemaTypeOptions::default`], which disables
/// both flags (permissive `any`, `type` aliases).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaTypeOptions {
    /// Render shapes without type information as `unknown` instead of `any`.
    pub prefer_unknown_over_any: bool,
    /// Declare top-level object shapes with `interface` instead of `type`.
    pub prefer_interface_over_type: bool,
}

impl SchemaTypeOptions {
    /// The sentinel used for [`Shape::Unknown`](crate::Shape::Unknown).
    pub fn unknown_sentinel(&self) -> &'static str {
        if self.prefer_unknown_over_any {
            "unknown"
        } else {
            "any"
        }
    }
}
