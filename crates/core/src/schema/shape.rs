//! Shape IR for schema-to-type synthesis.
//!
//! This module defines the closed set of type shapes the builder produces:
//! - Shape: primitives, literals, enums, arrays, objects, unions, references
//! - Literal: constant values pinned by `const`/`enum`
//! - ObjectShape/Field: ordered fields with optionality and docs
//!
//! Nothing past this point looks at `serde_json::Value` again, apart from
//! [`Literal::from_json`].

use serde_json::Value;

/// Scalar type names understood by the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`; renders like `number`
    Integer,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
}

impl Primitive {
    /// Map a JSON Schema `type` name to a primitive, if it is one.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Primitive::String),
            "number" => Some(Primitive::Number),
            "integer" => Some(Primitive::Integer),
            "boolean" => Some(Primitive::Boolean),
            "null" => Some(Primitive::Null),
            _ => None,
        }
    }
}

/// A constant value usable as a literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `"foo"`
    String(String),
    /// `42`
    Int(i64),
    /// Integers above `i64::MAX`, kept exact.
    UInt(u64),
    /// `1.5`
    Number(f64),
    /// `true`
    Bool(bool),
    /// `null`
    Null,
}

impl Literal {
    /// Convert a scalar JSON value; objects and arrays have no literal type.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Literal::Int)
                .or_else(|| n.as_u64().map(Literal::UInt))
                .or_else(|| n.as_f64().map(Literal::Number)),
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name as written in the schema.
    pub name: String,
    /// Shape of the property value.
    pub shape: Shape,
    /// Whether the name is listed in `required`.
    pub required: bool,
    /// `description` of the property schema, rendered as JSDoc.
    pub description: Option<String>,
    /// `deprecated: true` on the property schema.
    pub deprecated: bool,
}

impl Field {
    /// A field without documentation.
    pub fn new(name: impl Into<String>, shape: Shape, required: bool) -> Self {
        Self {
            name: name.into(),
            shape,
            required,
            description: None,
            deprecated: false,
        }
    }
}

/// Ordered field list plus an optional index-signature value shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    /// Fields in declaration order, names unique.
    pub fields: Vec<Field>,
    /// Shape of `additionalProperties` when it is a schema.
    pub additional: Option<Box<Shape>>,
}

impl ObjectShape {
    /// An object with the given fields and no index signature.
    pub fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            additional: None,
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// IR node for one schema fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Scalar type: string, number, integer, boolean, null
    Primitive(Primitive),
    /// Single pinned value
    Literal(Literal),
    /// Finite value set, order preserved, no duplicates
    Enum(Vec<Literal>),
    /// Homogeneous sequence: T[]
    Array(Box<Shape>),
    /// Object type with ordered fields
    Object(ObjectShape),
    /// Alternatives from anyOf/oneOf/type lists/nullable, flattened
    Union(Vec<Shape>),
    /// Named registry entry
    Reference(String),
    /// No usable type information
    Unknown,
}

impl Shape {
    /// Build a union, flattening nested unions one level and collapsing
    /// exact duplicates. Zero alternatives give `Unknown`, one gives itself.
    pub fn union(alternatives: impl IntoIterator<Item = Shape>) -> Shape {
        let mut flat: Vec<Shape> = Vec::new();
        for alternative in alternatives {
            match alternative {
                Shape::Union(inner) => {
                    for shape in inner {
                        if !flat.contains(&shape) {
                            flat.push(shape);
                        }
                    }
                }
                shape => {
                    if !flat.contains(&shape) {
                        flat.push(shape);
                    }
                }
            }
        }

        match flat.len() {
            0 => Shape::Unknown,
            1 => flat.pop().unwrap_or(Shape::Unknown),
            _ => Shape::Union(flat),
        }
    }

    /// `self | null`
    pub fn nullable(self) -> Shape {
        Shape::union([self, Shape::Primitive(Primitive::Null)])
    }

    /// Objects and references: the things worth naming when they repeat.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Shape::Object(_) | Shape::Reference(_))
    }

    /// Walk every direct child shape.
    pub fn children(&self) -> Vec<&Shape> {
        match self {
            Shape::Array(element) => vec![element.as_ref()],
            Shape::Object(object) => object
                .fields
                .iter()
                .map(|f| &f.shape)
                .chain(object.additional.as_deref())
                .collect(),
            Shape::Union(alternatives) => alternatives.iter().collect(),
            Shape::Primitive(_)
            | Shape::Literal(_)
            | Shape::Enum(_)
            | Shape::Reference(_)
            | Shape::Unknown => Vec::new(),
        }
    }
}
