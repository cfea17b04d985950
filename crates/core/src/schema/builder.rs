//! Schema to shape conversion.
//!
//! Keywords are looked at in a fixed precedence order; the first one that
//! applies decides the shape:
//!
//! 1. `$ref`
//! 2. `const`, then `enum`
//! 3. `allOf`
//! 4. `anyOf` / `oneOf` (alternatives concatenated)
//! 5. `type` (a single name or a list of names)
//! 6. `properties` / `additionalProperties` imply an object, `items` an array
//!
//! Anything else is [`Shape::Unknown`]. `nullable: true` is applied last.
//! When `anyOf`/`oneOf` sit next to `allOf`, `type`, `properties` or `items`,
//! those build a base shape first and every alternative refines it.
//! Malformed fragments are reported to [`Diagnostics`] and degrade to
//! `Unknown`; only registry failures abort the build.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::registry::{Registry, ShapePath};
use super::shape::{Field, Literal, ObjectShape, Primitive, Shape};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;

/// Keywords we recognise but cannot express as a type.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "not",
    "if",
    "then",
    "else",
    "$dynamicRef",
    "dependentSchemas",
];

/// Keywords that decide a shape. A schema without any of them only
/// constrains values (`required`, `minLength`, ...).
const SHAPE_KEYWORDS: &[&str] = &[
    "$ref",
    "const",
    "enum",
    "allOf",
    "anyOf",
    "oneOf",
    "type",
    "properties",
    "items",
    "prefixItems",
];

/// Keywords that build a base shape next to `anyOf`/`oneOf`.
const BASE_KEYWORDS: &[&str] = &["allOf", "type", "properties", "items", "prefixItems"];

/// Pointer segments that only group definitions and carry no naming value.
const POINTER_GROUPS: &[&str] = &["$defs", "definitions", "components", "schemas", "properties"];

/// Builds shapes for one document, registering `$ref` targets as it goes.
#[derive(Debug)]
pub struct ShapeBuilder<'a> {
    root: &'a Value,
    registry: &'a mut Registry,
    diagnostics: &'a mut Diagnostics,
    in_progress: HashSet<String>,
}

impl<'a> ShapeBuilder<'a> {
    /// `root` is the document local `$ref` pointers resolve against.
    pub fn new(
        root: &'a Value,
        registry: &'a mut Registry,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            root,
            registry,
            diagnostics,
            in_progress: HashSet::new(),
        }
    }

    /// Build and register the shape of an already reserved component.
    pub fn build_definition(&mut self, name: &str, schema: &Value) -> Result<()> {
        self.in_progress.insert(name.to_string());
        let shape = self.build(schema, &ShapePath::root(name));
        self.in_progress.remove(name);
        self.registry.define(name, shape?);
        Ok(())
    }

    /// Convert one schema fragment found at `path`.
    pub fn build(&mut self, schema: &Value, path: &ShapePath) -> Result<Shape> {
        let Some(map) = schema.as_object() else {
            match schema {
                Value::Bool(true) => {}
                Value::Bool(false) => self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidSchema,
                    "schema `false` matches nothing; emitting the unknown type",
                ),
                other => self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidSchema,
                    format!("expected a schema object, found {}", json_kind(other)),
                ),
            }
            return Ok(Shape::Unknown);
        };

        let shape = self.build_keywords(map, path)?;
        if map.get("nullable").and_then(Value::as_bool) == Some(true) {
            Ok(shape.nullable())
        } else {
            Ok(shape)
        }
    }

    fn build_keywords(&mut self, map: &Map<String, Value>, path: &ShapePath) -> Result<Shape> {
        if let Some(reference) = map.get("$ref") {
            return self.build_reference(reference, path);
        }
        if let Some(value) = map.get("const") {
            return Ok(self.build_const(value, path));
        }
        if let Some(values) = map.get("enum") {
            return Ok(self.build_enum(values, path));
        }

        let any_of = map.get("anyOf");
        let one_of = map.get("oneOf");
        if any_of.is_none() && one_of.is_none() {
            return self.build_base(map, path);
        }

        let groups = any_of.into_iter().chain(one_of);
        if has_base(map) {
            let base = self.build_base(map, path)?;
            self.refine_alternatives(base, groups, path)
        } else {
            self.build_alternatives(groups, path)
        }
    }

    /// Everything below `anyOf`/`oneOf` in the precedence order.
    fn build_base(&mut self, map: &Map<String, Value>, path: &ShapePath) -> Result<Shape> {
        if let Some(members) = map.get("allOf") {
            return self.build_all_of(members, map, path);
        }

        match map.get("type") {
            Some(Value::String(name)) => return self.build_typed(name, map, path),
            Some(Value::Array(names)) => {
                let mut alternatives = Vec::with_capacity(names.len());
                for name in names {
                    match name.as_str() {
                        Some(name) => alternatives.push(self.build_typed(name, map, path)?),
                        None => self.diagnostics.record(
                            path,
                            DiagnosticKind::InvalidSchema,
                            format!("ignoring non-string entry {name} in `type`"),
                        ),
                    }
                }
                return Ok(Shape::union(alternatives));
            }
            Some(other) => {
                self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidSchema,
                    format!("`type` must be a string or a list, found {}", json_kind(other)),
                );
                return Ok(Shape::Unknown);
            }
            None => {}
        }

        if map.contains_key("properties") || has_schema_additional(map) {
            return self.build_object(map, path);
        }
        if map.contains_key("items") || map.contains_key("prefixItems") {
            return self.build_array(map, path);
        }

        self.report_unsupported(map, path);
        Ok(Shape::Unknown)
    }

    fn report_unsupported(&mut self, map: &Map<String, Value>, path: &ShapePath) {
        if let Some(keyword) = UNSUPPORTED_KEYWORDS.iter().find(|k| map.contains_key(**k)) {
            self.diagnostics.record(
                path,
                DiagnosticKind::UnsupportedKeyword,
                format!("`{keyword}` has no type equivalent"),
            );
        }
    }

    /// `required` names of a schema that carries no shape of its own, or
    /// `None` when the schema does decide a shape.
    fn constraint_only(&mut self, schema: &Value, path: &ShapePath) -> Option<Vec<String>> {
        match schema {
            Value::Bool(true) => Some(Vec::new()),
            Value::Object(map) if !has_shape(map) => {
                self.report_unsupported(map, path);
                Some(required_names(map).into_iter().map(str::to_string).collect())
            }
            _ => None,
        }
    }

    fn build_typed(
        &mut self,
        name: &str,
        map: &Map<String, Value>,
        path: &ShapePath,
    ) -> Result<Shape> {
        match name {
            "object" => self.build_object(map, path),
            "array" => self.build_array(map, path),
            other => match Primitive::from_type_name(other) {
                Some(primitive) => Ok(Shape::Primitive(primitive)),
                None => {
                    self.diagnostics.record(
                        path,
                        DiagnosticKind::InvalidSchema,
                        format!("unknown type name `{other}`"),
                    );
                    Ok(Shape::Unknown)
                }
            },
        }
    }

    fn build_object(&mut self, map: &Map<String, Value>, path: &ShapePath) -> Result<Shape> {
        let required = required_names(map);

        let mut object = ObjectShape::default();
        match map.get("properties") {
            Some(Value::Object(properties)) => {
                for (name, schema) in properties {
                    let shape = self.build(schema, &path.child(name))?;
                    object.fields.push(Field {
                        name: name.clone(),
                        shape,
                        required: required.contains(&name.as_str()),
                        description: description(schema),
                        deprecated: deprecated(schema),
                    });
                }
            }
            Some(other) => self.diagnostics.record(
                path,
                DiagnosticKind::InvalidSchema,
                format!("`properties` must be an object, found {}", json_kind(other)),
            ),
            None => {}
        }

        if let Some(schema @ Value::Object(_)) = map.get("additionalProperties") {
            object.additional = Some(Box::new(self.build(schema, &path.value())?));
        }

        Ok(Shape::Object(object))
    }

    fn build_array(&mut self, map: &Map<String, Value>, path: &ShapePath) -> Result<Shape> {
        let items_path = path.item();
        let element = match map.get("items").or_else(|| map.get("prefixItems")) {
            Some(Value::Array(tuple)) => {
                let mut alternatives = Vec::with_capacity(tuple.len());
                for schema in tuple {
                    alternatives.push(self.build(schema, &items_path)?);
                }
                Shape::union(alternatives)
            }
            Some(schema) => self.build(schema, &items_path)?,
            None => Shape::Unknown,
        };
        Ok(Shape::Array(Box::new(element)))
    }

    fn build_alternatives<'v>(
        &mut self,
        groups: impl Iterator<Item = &'v Value>,
        path: &ShapePath,
    ) -> Result<Shape> {
        let mut alternatives = Vec::new();
        for group in groups {
            let Some(schemas) = group.as_array() else {
                self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidSchema,
                    format!("`anyOf`/`oneOf` must be a list, found {}", json_kind(group)),
                );
                continue;
            };
            for schema in schemas {
                alternatives.push(self.build(schema, path)?);
            }
        }
        Ok(Shape::union(alternatives))
    }

    /// Alternatives next to a base shape: each one narrows the base.
    ///
    /// An alternative without a shape of its own contributes its `required`
    /// names to an object base. An object alternative is merged into an
    /// object base with fields. Any other alternative replaces a non-object
    /// or empty base; next to fields it is dropped with a diagnostic.
    fn refine_alternatives<'v>(
        &mut self,
        base: Shape,
        groups: impl Iterator<Item = &'v Value>,
        path: &ShapePath,
    ) -> Result<Shape> {
        let mut refined = Vec::new();
        for group in groups {
            let Some(schemas) = group.as_array() else {
                self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidSchema,
                    format!("`anyOf`/`oneOf` must be a list, found {}", json_kind(group)),
                );
                continue;
            };
            for schema in schemas {
                refined.push(self.refine(&base, schema, path)?);
            }
        }

        if refined.is_empty() {
            return Ok(base);
        }
        Ok(Shape::union(refined))
    }

    fn refine(&mut self, base: &Shape, schema: &Value, path: &ShapePath) -> Result<Shape> {
        if let Some(required) = self.constraint_only(schema, path) {
            return Ok(with_required(base.clone(), &required));
        }

        let alternative = self.build(schema, path)?;
        match (base, &alternative) {
            (_, Shape::Unknown) => Ok(base.clone()),
            (Shape::Object(object), _)
                if object.fields.is_empty() && object.additional.is_none() =>
            {
                Ok(alternative)
            }
            (Shape::Object(_), _) => {
                if self.resolve_object(&alternative)?.is_some() {
                    return self.merge_objects(vec![base.clone(), alternative], path);
                }
                self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidSchema,
                    format!(
                        "alternative is not an object ({}); keeping the declared object",
                        shape_kind(&alternative)
                    ),
                );
                Ok(base.clone())
            }
            _ => Ok(alternative),
        }
    }

    fn build_const(&mut self, value: &Value, path: &ShapePath) -> Shape {
        match Literal::from_json(value) {
            Some(literal) => Shape::Literal(literal),
            None => {
                self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidEnum,
                    format!("`const` must be a scalar, found {}", json_kind(value)),
                );
                Shape::Unknown
            }
        }
    }

    fn build_enum(&mut self, values: &Value, path: &ShapePath) -> Shape {
        let Some(values) = values.as_array() else {
            self.diagnostics.record(
                path,
                DiagnosticKind::InvalidEnum,
                format!("`enum` must be a list, found {}", json_kind(values)),
            );
            return Shape::Unknown;
        };

        let mut literals: Vec<Literal> = Vec::with_capacity(values.len());
        for value in values {
            match Literal::from_json(value) {
                Some(literal) if !literals.contains(&literal) => literals.push(literal),
                Some(_) => {}
                None => self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidEnum,
                    format!("ignoring non-scalar enum value of kind {}", json_kind(value)),
                ),
            }
        }

        match literals.len() {
            0 => {
                self.diagnostics.record(
                    path,
                    DiagnosticKind::InvalidEnum,
                    "`enum` has no usable values",
                );
                Shape::Unknown
            }
            1 => Shape::Literal(literals.remove(0)),
            _ => Shape::Enum(literals),
        }
    }

    /// Merge `allOf` members and sibling `properties`. Members without a
    /// shape of their own, and a sibling `required`, only mark fields as
    /// required.
    fn build_all_of(
        &mut self,
        members: &Value,
        map: &Map<String, Value>,
        path: &ShapePath,
    ) -> Result<Shape> {
        let Some(members) = members.as_array() else {
            self.diagnostics.record(
                path,
                DiagnosticKind::InvalidSchema,
                format!("`allOf` must be a list, found {}", json_kind(members)),
            );
            return Ok(Shape::Unknown);
        };

        let mut required: Vec<String> = required_names(map)
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut shapes = Vec::with_capacity(members.len() + 1);
        for member in members {
            match self.constraint_only(member, path) {
                Some(names) => required.extend(names),
                None => shapes.push(self.build(member, path)?),
            }
        }
        if map.contains_key("properties") || has_schema_additional(map) {
            shapes.push(self.build_object(map, path)?);
        }

        let merged = match shapes.len() {
            0 if required.is_empty() => return Ok(Shape::Unknown),
            0 => Shape::Object(ObjectShape::default()),
            1 if required.is_empty() => return Ok(shapes.remove(0)),
            _ => self.merge_objects(shapes, path)?,
        };
        Ok(with_required(merged, &required))
    }

    /// Merge `allOf` members into one object. Any member that is not an
    /// object after following references turns the whole merge into
    /// `Unknown`.
    fn merge_objects(&mut self, shapes: Vec<Shape>, path: &ShapePath) -> Result<Shape> {
        let mut merged = ObjectShape::default();
        for shape in shapes {
            let Some(object) = self.resolve_object(&shape)? else {
                self.diagnostics.record(
                    path,
                    DiagnosticKind::AllOfNonObject,
                    format!(
                        "`allOf` member is not an object ({}); emitting the unknown type",
                        shape_kind(&shape)
                    ),
                );
                return Ok(Shape::Unknown);
            };

            for field in object.fields {
                match merged.fields.iter_mut().find(|f| f.name == field.name) {
                    Some(existing) => {
                        existing.required |= field.required;
                        if existing.shape != field.shape {
                            self.diagnostics.record(
                                path.child(&field.name),
                                DiagnosticKind::DuplicateField,
                                "conflicting `allOf` definitions; keeping the first",
                            );
                        }
                    }
                    None => merged.fields.push(field),
                }
            }
            if merged.additional.is_none() {
                merged.additional = object.additional;
            }
        }
        Ok(Shape::Object(merged))
    }

    /// Follow references to an object shape. Components that are reserved
    /// but not built yet are built on the spot, unless they are being built
    /// further up the stack.
    fn resolve_object(&mut self, shape: &Shape) -> Result<Option<ObjectShape>> {
        let mut current = shape.clone();
        for _ in 0..=self.registry.len() {
            match current {
                Shape::Object(object) => return Ok(Some(object)),
                Shape::Reference(name) => {
                    if self.registry.shape(&name).is_none() && !self.in_progress.contains(&name) {
                        self.build_pending(&name)?;
                    }
                    match self.registry.shape(&name) {
                        Some(target) => current = target.clone(),
                        None => return Ok(None),
                    }
                }
                _ => return Ok(None),
            }
        }
        Ok(None)
    }

    fn build_pending(&mut self, name: &str) -> Result<()> {
        let root = self.root;
        let target = self
            .registry
            .pointer_of(name)
            .and_then(|pointer| pointer.strip_prefix('#'))
            .and_then(|fragment| root.pointer(fragment));
        match target {
            Some(schema) => self.build_definition(name, schema),
            None => Ok(()),
        }
    }

    fn build_reference(&mut self, reference: &Value, path: &ShapePath) -> Result<Shape> {
        let Some(pointer) = reference.as_str() else {
            self.diagnostics.record(
                path,
                DiagnosticKind::InvalidSchema,
                format!("`$ref` must be a string, found {}", json_kind(reference)),
            );
            return Ok(Shape::Unknown);
        };

        if let Some(name) = self.registry.name_for_pointer(pointer) {
            return Ok(Shape::Reference(name.to_string()));
        }

        let Some(fragment) = pointer.strip_prefix('#') else {
            self.diagnostics.record(
                path,
                DiagnosticKind::UnresolvedReference,
                format!("only document-local references are supported, found `{pointer}`"),
            );
            return Ok(Shape::Unknown);
        };

        let root = self.root;
        let Some(target) = root.pointer(fragment) else {
            self.diagnostics.record(
                path,
                DiagnosticKind::UnresolvedReference,
                format!("`{pointer}` does not point into the document"),
            );
            return Ok(Shape::Unknown);
        };

        let name = self
            .registry
            .reserve_definition(pointer, &pointer_name(fragment))?;
        tracing::debug!(pointer, name = %name, "resolving reference");
        self.build_definition(&name, target)?;
        Ok(Shape::Reference(name))
    }
}

fn has_shape(map: &Map<String, Value>) -> bool {
    SHAPE_KEYWORDS.iter().any(|k| map.contains_key(*k)) || has_schema_additional(map)
}

fn has_base(map: &Map<String, Value>) -> bool {
    BASE_KEYWORDS.iter().any(|k| map.contains_key(*k)) || has_schema_additional(map)
}

/// `additionalProperties` given as a schema; `true`/`false` carry no shape.
fn has_schema_additional(map: &Map<String, Value>) -> bool {
    map.get("additionalProperties").is_some_and(Value::is_object)
}

fn required_names(map: &Map<String, Value>) -> Vec<&str> {
    map.get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Mark the named fields of an object as required; other shapes pass through.
fn with_required(shape: Shape, names: &[String]) -> Shape {
    match shape {
        Shape::Object(mut object) => {
            for field in &mut object.fields {
                field.required |= names.contains(&field.name);
            }
            Shape::Object(object)
        }
        other => other,
    }
}

/// Naming hint for a pointer: its last segment that is not a grouping keyword.
fn pointer_name(fragment: &str) -> String {
    let name: String = fragment
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .filter(|segment| !segment.is_empty() && !POINTER_GROUPS.contains(&segment.as_str()))
        .next_back()
        .unwrap_or_default();

    if name.is_empty() {
        "Definition".to_string()
    } else {
        name
    }
}

fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn deprecated(schema: &Value) -> bool {
    schema
        .get("deprecated")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Human name of a JSON value kind, for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn shape_kind(shape: &Shape) -> &'static str {
    match shape {
        Shape::Primitive(_) => "primitive",
        Shape::Literal(_) => "literal",
        Shape::Enum(_) => "enum",
        Shape::Array(_) => "array",
        Shape::Object(_) => "object",
        Shape::Union(_) => "union",
        Shape::Reference(_) => "reference",
        Shape::Unknown => "unknown",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(schema: &Value) -> (Shape, Registry, Diagnostics) {
        let mut registry = Registry::new();
        let mut diagnostics = Diagnostics::default();
        let root = registry.reserve_root("Root").unwrap();
        let shape = ShapeBuilder::new(schema, &mut registry, &mut diagnostics)
            .build(schema, &ShapePath::root(&root))
            .unwrap();
        (shape, registry, diagnostics)
    }

    fn string() -> Shape {
        Shape::Primitive(Primitive::String)
    }

    #[test]
    fn test_object_fields_keep_order_and_optionality() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "Unique id" },
                "age": { "type": "integer", "deprecated": true }
            },
            "required": ["id"]
        });
        let (shape, _, diagnostics) = build(&schema);
        let Shape::Object(object) = shape else {
            panic!("expected object, got {shape:?}");
        };

        assert_eq!(object.fields.len(), 2);
        assert_eq!(object.fields[0].name, "id");
        assert!(object.fields[0].required);
        assert_eq!(object.fields[0].description.as_deref(), Some("Unique id"));
        assert_eq!(object.fields[1].shape, Shape::Primitive(Primitive::Integer));
        assert!(!object.fields[1].required);
        assert!(object.fields[1].deprecated);
        assert!(diagnostics.records().is_empty());
    }

    #[test]
    fn test_keyword_precedence() {
        let (shape, _, _) = build(&json!({ "type": "string", "enum": ["a", "b"] }));
        assert_eq!(
            shape,
            Shape::Enum(vec![Literal::String("a".into()), Literal::String("b".into())])
        );

        let (shape, _, _) = build(&json!({ "const": 3, "enum": [1, 2] }));
        assert_eq!(shape, Shape::Literal(Literal::Int(3)));
    }

    #[test]
    fn test_type_list_and_nullable_make_unions() {
        let (shape, _, _) = build(&json!({ "type": ["string", "null"] }));
        assert_eq!(shape, Shape::Union(vec![string(), Shape::Primitive(Primitive::Null)]));

        let (shape, _, _) = build(&json!({ "type": "string", "nullable": true }));
        assert_eq!(shape, Shape::Union(vec![string(), Shape::Primitive(Primitive::Null)]));
    }

    #[test]
    fn test_any_of_and_one_of_are_concatenated() {
        let (shape, _, _) = build(&json!({
            "anyOf": [{ "type": "string" }],
            "oneOf": [{ "type": "boolean" }, { "type": "string" }]
        }));
        assert_eq!(shape, Shape::Union(vec![string(), Shape::Primitive(Primitive::Boolean)]));
    }

    #[test]
    fn test_arrays_and_inferred_kinds() {
        let (shape, _, _) = build(&json!({ "items": { "type": "string" } }));
        assert_eq!(shape, Shape::Array(Box::new(string())));

        let (shape, _, _) = build(&json!({ "type": "array" }));
        assert_eq!(shape, Shape::Array(Box::new(Shape::Unknown)));

        let (shape, _, _) = build(&json!({ "additionalProperties": { "type": "number" } }));
        let Shape::Object(object) = shape else {
            panic!("expected object");
        };
        assert!(object.fields.is_empty());
        assert_eq!(object.additional.as_deref(), Some(&Shape::Primitive(Primitive::Number)));
    }

    #[test]
    fn test_empty_schema_is_unknown_without_diagnostics() {
        let (shape, _, diagnostics) = build(&json!({}));
        assert_eq!(shape, Shape::Unknown);
        assert!(diagnostics.records().is_empty());
    }

    #[test]
    fn test_unsupported_keyword_is_reported() {
        let (shape, _, diagnostics) = build(&json!({ "not": { "type": "string" } }));
        assert_eq!(shape, Shape::Unknown);
        assert_eq!(diagnostics.records()[0].kind, DiagnosticKind::UnsupportedKeyword);
    }

    #[test]
    fn test_enum_defects() {
        let (shape, _, diagnostics) = build(&json!({ "enum": [] }));
        assert_eq!(shape, Shape::Unknown);
        assert_eq!(diagnostics.records()[0].kind, DiagnosticKind::InvalidEnum);

        let (shape, _, diagnostics) = build(&json!({ "enum": ["a", { "x": 1 }, "a"] }));
        assert_eq!(shape, Shape::Literal(Literal::String("a".into())));
        assert_eq!(diagnostics.records().len(), 1);
    }

    #[test]
    fn test_all_of_merges_objects_and_references() {
        let schema = json!({
            "$defs": {
                "base": {
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }
            },
            "allOf": [
                { "$ref": "#/$defs/base" },
                { "type": "object", "properties": { "name": { "type": "string" } } }
            ],
            "properties": { "id": { "type": "string" } }
        });
        let (shape, _, diagnostics) = build(&schema);
        let Shape::Object(object) = shape else {
            panic!("expected merged object");
        };

        let names: Vec<&str> = object.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "name"]);
        assert!(object.fields[0].required);
        assert!(diagnostics.records().is_empty());
    }

    #[test]
    fn test_all_of_with_non_object_member_degrades() {
        let (shape, _, diagnostics) = build(&json!({
            "allOf": [{ "type": "string" }, { "type": "object", "properties": {} }]
        }));
        assert_eq!(shape, Shape::Unknown);
        assert_eq!(diagnostics.records()[0].kind, DiagnosticKind::AllOfNonObject);
    }

    #[test]
    fn test_all_of_member_with_only_required_marks_fields() {
        let schema = json!({
            "$defs": {
                "base": {
                    "type": "object",
                    "properties": { "id": { "type": "string" }, "label": { "type": "string" } }
                }
            },
            "allOf": [{ "$ref": "#/$defs/base" }, { "required": ["id"] }],
            "required": ["label"]
        });
        let (shape, _, diagnostics) = build(&schema);
        let Shape::Object(object) = shape else {
            panic!("expected merged object, got {shape:?}");
        };

        assert!(object.field("id").unwrap().required);
        assert!(object.field("label").unwrap().required);
        assert!(diagnostics.records().is_empty());
    }

    #[test]
    fn test_all_of_single_reference_stays_a_reference() {
        let schema = json!({
            "$defs": { "base": { "type": "object", "properties": { "id": { "type": "string" } } } },
            "allOf": [{ "$ref": "#/$defs/base" }],
            "description": "Documented alias"
        });
        let (shape, _, _) = build(&schema);
        assert_eq!(shape, Shape::Reference("base".into()));
    }

    #[test]
    fn test_required_only_alternatives_refine_the_object() {
        let schema = json!({
            "type": "object",
            "properties": { "email": { "type": "string" }, "phone": { "type": "string" } },
            "anyOf": [{ "required": ["email"] }, { "required": ["phone"] }]
        });
        let (shape, _, diagnostics) = build(&schema);
        let Shape::Union(alternatives) = shape else {
            panic!("expected one object per alternative, got {shape:?}");
        };

        let required = |shape: &Shape| match shape {
            Shape::Object(object) => object
                .fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name.clone())
                .collect::<Vec<_>>(),
            other => panic!("expected object, got {other:?}"),
        };
        assert_eq!(alternatives.len(), 2);
        assert_eq!(required(&alternatives[0]), ["email"]);
        assert_eq!(required(&alternatives[1]), ["phone"]);
        assert!(diagnostics.records().is_empty());
    }

    #[test]
    fn test_typed_alternatives_next_to_properties() {
        let schema = json!({
            "type": "object",
            "properties": { "kind": { "type": "string" } },
            "required": ["kind"],
            "oneOf": [
                { "properties": { "radius": { "type": "number" } } },
                { "type": "string" }
            ]
        });
        let (shape, _, diagnostics) = build(&schema);
        let Shape::Union(alternatives) = shape else {
            panic!("expected a union, got {shape:?}");
        };
        let Shape::Object(circle) = &alternatives[0] else {
            panic!("expected merged object");
        };
        let names: Vec<&str> = circle.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["kind", "radius"]);
        assert!(circle.fields[0].required);

        let Shape::Object(fallback) = &alternatives[1] else {
            panic!("expected the declared object");
        };
        assert_eq!(fallback.fields.len(), 1);
        assert_eq!(diagnostics.records().len(), 1);
        assert_eq!(diagnostics.records()[0].kind, DiagnosticKind::InvalidSchema);
    }

    #[test]
    fn test_alternatives_replace_an_empty_object_base() {
        let schema = json!({
            "$defs": {
                "a": { "type": "object", "properties": { "x": { "type": "string" } } },
                "b": { "type": "object", "properties": { "y": { "type": "string" } } }
            },
            "type": "object",
            "oneOf": [{ "$ref": "#/$defs/a" }, { "$ref": "#/$defs/b" }]
        });
        let (shape, _, _) = build(&schema);
        assert_eq!(
            shape,
            Shape::Union(vec![Shape::Reference("a".into()), Shape::Reference("b".into())])
        );
    }

    #[test]
    fn test_references_register_definitions_once() {
        let schema = json!({
            "type": "object",
            "properties": {
                "home": { "$ref": "#/$defs/address" },
                "work": { "$ref": "#/$defs/address" }
            },
            "$defs": {
                "address": { "type": "object", "properties": { "city": { "type": "string" } } }
            }
        });
        let (shape, registry, _) = build(&schema);
        let Shape::Object(object) = shape else {
            panic!("expected object");
        };

        assert_eq!(object.fields[0].shape, Shape::Reference("address".into()));
        assert_eq!(object.fields[1].shape, Shape::Reference("address".into()));
        assert_eq!(registry.len(), 2);
        assert!(registry.shape("address").is_some());
    }

    #[test]
    fn test_recursive_reference_terminates() {
        let schema = json!({
            "type": "object",
            "properties": {
                "value": { "type": "string" },
                "children": { "type": "array", "items": { "$ref": "#" } }
            }
        });
        let (shape, registry, _) = build(&schema);
        let Shape::Object(object) = shape else {
            panic!("expected object");
        };
        assert_eq!(
            object.fields[1].shape,
            Shape::Array(Box::new(Shape::Reference("Root".into())))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unresolvable_references_are_unknown() {
        let (shape, _, diagnostics) = build(&json!({ "$ref": "https://example.com/x.json" }));
        assert_eq!(shape, Shape::Unknown);
        assert_eq!(diagnostics.records()[0].kind, DiagnosticKind::UnresolvedReference);

        let (shape, _, diagnostics) = build(&json!({ "$ref": "#/$defs/missing" }));
        assert_eq!(shape, Shape::Unknown);
        assert_eq!(diagnostics.records()[0].kind, DiagnosticKind::UnresolvedReference);
    }

    #[test]
    fn test_pointer_name() {
        assert_eq!(pointer_name("/components/schemas/Pet"), "Pet");
        assert_eq!(pointer_name("/$defs/a~1b"), "a/b");
        assert_eq!(pointer_name("/definitions"), "Definition");
    }
}
