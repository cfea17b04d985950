//! Structural equality and fingerprints over shapes.
//!
//! Two shapes are equivalent when they accept the same values as far as the
//! emitted types can tell: same field names, optionality and field shapes,
//! regardless of declaration order. Documentation is ignored. References are
//! followed through the registry; a pair of names already under comparison is
//! assumed equal, which makes recursive shapes terminate.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use super::registry::Registry;
use super::shape::{ObjectShape, Shape};

/// Whether `a` and `b` describe the same type.
pub fn equivalent(a: &Shape, b: &Shape, registry: &Registry) -> bool {
    Comparison {
        registry,
        assumed: HashSet::new(),
    }
    .shapes(a, b)
}

/// Shallow hash used to bucket candidates before a full comparison.
///
/// Equivalent shapes always hash the same, whether they are written inline
/// or behind a reference.
pub fn fingerprint(shape: &Shape, registry: &Registry) -> u64 {
    let mut hasher = DefaultHasher::new();
    let shape = resolve(shape, registry);
    tag(shape, registry).hash(&mut hasher);
    match shape {
        Shape::Primitive(primitive) => primitive.hash(&mut hasher),
        Shape::Enum(values) => values.len().hash(&mut hasher),
        Shape::Array(element) => tag(element, registry).hash(&mut hasher),
        Shape::Object(object) => {
            let mut fields: Vec<(&str, bool, u8)> = object
                .fields
                .iter()
                .map(|f| (f.name.as_str(), f.required, tag(&f.shape, registry)))
                .collect();
            fields.sort_unstable();
            fields.hash(&mut hasher);
            object.additional.is_some().hash(&mut hasher);
        }
        Shape::Union(alternatives) => {
            for alternative in alternatives {
                tag(alternative, registry).hash(&mut hasher);
            }
        }
        Shape::Reference(name) => name.hash(&mut hasher),
        Shape::Literal(_) | Shape::Unknown => {}
    }
    hasher.finish()
}

/// Names of placeholders a fingerprint of `shape` looked through.
///
/// The fingerprint changes once any of them is defined.
pub fn placeholders<'a>(shape: &'a Shape, registry: &'a Registry) -> Vec<&'a str> {
    let shape = resolve(shape, registry);
    if let Shape::Reference(name) = shape {
        return vec![name.as_str()];
    }
    shape
        .children()
        .into_iter()
        .filter_map(|child| match resolve(child, registry) {
            Shape::Reference(name) => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

/// Follow references until a non-reference shape or a placeholder.
fn resolve<'a>(shape: &'a Shape, registry: &'a Registry) -> &'a Shape {
    let mut current = shape;
    for _ in 0..=registry.len() {
        match current {
            Shape::Reference(name) => match registry.shape(name) {
                Some(target) => current = target,
                None => return current,
            },
            _ => return current,
        }
    }
    current
}

/// Kind of a shape after following references.
pub(super) fn tag(shape: &Shape, registry: &Registry) -> u8 {
    match resolve(shape, registry) {
        Shape::Primitive(_) => 1,
        Shape::Literal(_) => 2,
        Shape::Enum(_) => 3,
        Shape::Array(_) => 4,
        Shape::Object(_) => 5,
        Shape::Union(_) => 6,
        Shape::Reference(_) => 7,
        Shape::Unknown => 8,
    }
}

struct Comparison<'a> {
    registry: &'a Registry,
    assumed: HashSet<(String, String)>,
}

impl Comparison<'_> {
    fn shapes(&mut self, a: &Shape, b: &Shape) -> bool {
        let registry = self.registry;
        match (a, b) {
            (Shape::Reference(x), Shape::Reference(y)) => {
                if x == y || !self.assumed.insert((x.clone(), y.clone())) {
                    return true;
                }
                match (registry.shape(x), registry.shape(y)) {
                    (Some(sx), Some(sy)) => self.shapes(sx, sy),
                    _ => false,
                }
            }
            (Shape::Reference(name), other) | (other, Shape::Reference(name)) => {
                match registry.shape(name) {
                    Some(target) => self.shapes(target, other),
                    None => false,
                }
            }
            (Shape::Primitive(x), Shape::Primitive(y)) => x == y,
            (Shape::Literal(x), Shape::Literal(y)) => x == y,
            (Shape::Enum(x), Shape::Enum(y)) => x == y,
            (Shape::Array(x), Shape::Array(y)) => self.shapes(x, y),
            (Shape::Object(x), Shape::Object(y)) => self.objects(x, y),
            (Shape::Union(x), Shape::Union(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(p, q)| self.shapes(p, q))
            }
            (Shape::Unknown, Shape::Unknown) => true,
            _ => false,
        }
    }

    fn objects(&mut self, a: &ObjectShape, b: &ObjectShape) -> bool {
        if a.fields.len() != b.fields.len() {
            return false;
        }

        for field in &a.fields {
            let Some(other) = b.field(&field.name) else {
                return false;
            };
            if field.required != other.required || !self.shapes(&field.shape, &other.shape) {
                return false;
            }
        }

        match (&a.additional, &b.additional) {
            (None, None) => true,
            (Some(x), Some(y)) => self.shapes(x, y),
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::registry::ShapePath;
    use crate::schema::shape::{Field, Primitive};

    fn string() -> Shape {
        Shape::Primitive(Primitive::String)
    }

    fn object(fields: Vec<Field>) -> Shape {
        Shape::Object(ObjectShape::with_fields(fields))
    }

    #[test]
    fn test_field_order_and_docs_do_not_matter() {
        let registry = Registry::new();
        let mut documented = Field::new("a", string(), true);
        documented.description = Some("first".to_string());

        let x = object(vec![documented, Field::new("b", string(), false)]);
        let y = object(vec![Field::new("b", string(), false), Field::new("a", string(), true)]);
        assert!(equivalent(&x, &y, &registry));
        assert_eq!(fingerprint(&x, &registry), fingerprint(&y, &registry));
    }

    #[test]
    fn test_optionality_matters() {
        let registry = Registry::new();
        let x = object(vec![Field::new("a", string(), true)]);
        let y = object(vec![Field::new("a", string(), false)]);
        assert!(!equivalent(&x, &y, &registry));
    }

    #[test]
    fn test_reference_equals_its_inline_target() {
        let mut registry = Registry::new();
        let inline = object(vec![Field::new("id", string(), true)]);
        let name = registry
            .hoist(inline.clone(), &ShapePath::root("Item"))
            .unwrap();

        let reference = Shape::Reference(name);
        assert!(equivalent(&reference, &inline, &registry));
        assert_eq!(fingerprint(&reference, &registry), fingerprint(&inline, &registry));
    }

    #[test]
    fn test_recursive_shapes_terminate() {
        let mut registry = Registry::new();
        let a = registry.reserve_root("A").unwrap();
        let b = registry.reserve_definition("#/$defs/B", "B").unwrap();
        let node = |next: &str| {
            object(vec![
                Field::new("value", string(), true),
                Field::new("next", Shape::Reference(next.to_string()), false),
            ])
        };
        registry.define(&a, node(&a));
        registry.define(&b, node(&b));

        assert!(equivalent(
            &Shape::Reference(a.clone()),
            &Shape::Reference(b.clone()),
            &registry
        ));
        assert!(equivalent(&node(&a), &node(&b), &registry));
    }

    #[test]
    fn test_placeholders_only_match_themselves() {
        let mut registry = Registry::new();
        let a = registry.reserve_definition("#/$defs/A", "A").unwrap();
        let b = registry.reserve_definition("#/$defs/B", "B").unwrap();
        assert!(equivalent(&Shape::Reference(a.clone()), &Shape::Reference(a.clone()), &registry));
        assert!(!equivalent(&Shape::Reference(a), &Shape::Reference(b), &registry));
    }

    #[test]
    fn test_placeholders_seen_by_fingerprint() {
        let mut registry = Registry::new();
        let pending = registry.reserve_definition("#/$defs/Tag", "Tag").unwrap();
        let shape = object(vec![
            Field::new("id", string(), true),
            Field::new("tag", Shape::Reference(pending.clone()), false),
        ]);
        assert_eq!(placeholders(&shape, &registry), [pending.as_str()]);

        registry.define(&pending, string());
        assert!(placeholders(&shape, &registry).is_empty());
    }
}
