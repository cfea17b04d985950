//! TypeScript rendering for shapes.
//!
//! Scalars implement [`Emit`] directly; anything that nests goes through an
//! [`Emitter`], which knows the options and the indentation depth.

use super::shape::{Literal, ObjectShape, Primitive, Shape};
use super::utils::{escape_js_string, jsdoc_lines, quote_if_needed};
use crate::options::SchemaTypeOptions;

/// Trait for rendering context-free IR nodes as TypeScript source.
pub trait Emit {
    /// Render to a TypeScript type expression.
    fn emit(&self) -> String;
}

impl Emit for Primitive {
    fn emit(&self) -> String {
        match self {
            Primitive::String => "string",
            Primitive::Number | Primitive::Integer => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
        }
        .to_string()
    }
}

impl Emit for Literal {
    fn emit(&self) -> String {
        match self {
            Literal::String(s) => format!("\"{}\"", escape_js_string(s)),
            Literal::Int(n) => n.to_string(),
            Literal::UInt(n) => n.to_string(),
            Literal::Number(n) => n.to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        }
    }
}

const INDENT: &str = "  ";

/// Renders shapes and declarations with a fixed set of options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter {
    options: SchemaTypeOptions,
}

impl Emitter {
    /// An emitter using `options`.
    pub fn new(options: SchemaTypeOptions) -> Self {
        Self { options }
    }

    /// Render a shape as a type expression at the top level.
    pub fn render(&self, shape: &Shape) -> String {
        self.render_at(shape, 0)
    }

    /// `export interface` for plain objects when asked for, `export type`
    /// otherwise.
    pub fn declaration(&self, name: &str, shape: &Shape) -> String {
        match shape {
            Shape::Object(object)
                if self.options.prefer_interface_over_type && object.additional.is_none() =>
            {
                format!("export interface {name} {};", self.render_object(object, 0))
            }
            _ => format!("export type {name} = {};", self.render_at(shape, 0)),
        }
    }

    /// Declaration for a response without content.
    pub fn void_declaration(&self, name: &str) -> String {
        format!("export type {name} = void;")
    }

    fn render_at(&self, shape: &Shape, depth: usize) -> String {
        match shape {
            Shape::Primitive(primitive) => primitive.emit(),
            Shape::Literal(literal) => literal.emit(),
            Shape::Enum(values) => values.iter().map(Emit::emit).collect::<Vec<_>>().join(" | "),
            Shape::Array(element) => {
                let inner = self.render_at(element, depth);
                if self.needs_parens(element, depth) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            Shape::Object(object) => self.render_object(object, depth),
            Shape::Union(alternatives) => self.union_parts(alternatives, depth).join(" | "),
            Shape::Reference(name) => name.clone(),
            Shape::Unknown => self.options.unknown_sentinel().to_string(),
        }
    }

    /// Whether an array element needs parentheses before `[]`.
    fn needs_parens(&self, element: &Shape, depth: usize) -> bool {
        match element {
            Shape::Enum(values) => values.len() > 1,
            Shape::Union(alternatives) => self.union_parts(alternatives, depth).len() > 1,
            Shape::Object(object) => !object.fields.is_empty() && object.additional.is_some(),
            _ => false,
        }
    }

    /// Rendered alternatives with textual duplicates removed.
    fn union_parts(&self, alternatives: &[Shape], depth: usize) -> Vec<String> {
        let mut parts: Vec<String> = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let rendered = self.render_at(alternative, depth);
            if !parts.contains(&rendered) {
                parts.push(rendered);
            }
        }
        parts
    }

    fn render_object(&self, object: &ObjectShape, depth: usize) -> String {
        let record = object
            .additional
            .as_ref()
            .map(|value| format!("Record<string, {}>", self.render_at(value, depth)));

        if object.fields.is_empty() {
            return record.unwrap_or_else(|| "{}".to_string());
        }

        let indent = INDENT.repeat(depth + 1);
        let mut body = String::from("{\n");
        for field in &object.fields {
            let doc = jsdoc_lines(field.description.as_deref(), field.deprecated);
            if !doc.is_empty() {
                body.push_str(&format!("{indent}/**\n"));
                for line in doc {
                    if line.is_empty() {
                        body.push_str(&format!("{indent} *\n"));
                    } else {
                        body.push_str(&format!("{indent} * {line}\n"));
                    }
                }
                body.push_str(&format!("{indent} */\n"));
            }

            let optional = if field.required { "" } else { "?" };
            body.push_str(&format!(
                "{indent}{}{optional}: {};\n",
                quote_if_needed(&field.name),
                self.render_at(&field.shape, depth + 1)
            ));
        }
        body.push_str(&INDENT.repeat(depth));
        body.push('}');

        match record {
            Some(record) => format!("{body} & {record}"),
            None => body,
        }
    }
}
