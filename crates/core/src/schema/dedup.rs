//! Hoisting and deduplication of nested shapes.
//!
//! After building, nested object shapes are rewritten bottom-up. A nested
//! object that is structurally equal to a registered component becomes a
//! reference to it. Otherwise it is promoted to a new component when the
//! policy says so: under [`HoistPolicy::Shared`] only when it occurs at least
//! twice across the document, under [`HoistPolicy::Always`] unconditionally.
//! Pure index signatures (`Record<string, T>`) always stay inline.
//! Top-level shapes are never replaced, so explicit definitions keep their
//! own names even when two of them look alike.

use std::collections::HashMap;

use super::equivalence::{equivalent, fingerprint};
use super::registry::{ComponentOrigin, Registry, ShapePath};
use super::shape::{Field, ObjectShape, Shape};
use crate::error::Result;

/// When a nested shape without an equal component gets its own name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoistPolicy {
    /// Only shapes that occur two or more times.
    Shared,
    /// Every nested object that has fields.
    Always,
}

/// Structural occurrence counts of hoisting candidates.
#[derive(Debug, Default)]
struct Occurrences {
    buckets: HashMap<u64, Vec<(Shape, usize)>>,
}

impl Occurrences {
    fn collect(registry: &Registry) -> Self {
        let mut occurrences = Self::default();
        for component in registry.components() {
            if let Some(shape) = &component.shape {
                for child in shape.children() {
                    occurrences.visit(child, registry);
                }
            }
        }
        occurrences
    }

    fn visit(&mut self, shape: &Shape, registry: &Registry) {
        if is_candidate(shape, HoistPolicy::Shared) {
            let bucket = self.buckets.entry(fingerprint(shape, registry)).or_default();
            match bucket.iter_mut().find(|(seen, _)| equivalent(seen, shape, registry)) {
                Some((_, count)) => *count += 1,
                None => bucket.push((shape.clone(), 1)),
            }
        }
        for child in shape.children() {
            self.visit(child, registry);
        }
    }

    fn count(&self, shape: &Shape, registry: &Registry) -> usize {
        self.buckets
            .get(&fingerprint(shape, registry))
            .and_then(|bucket| {
                bucket
                    .iter()
                    .find(|(seen, _)| equivalent(seen, shape, registry))
                    .map(|(_, count)| *count)
            })
            .unwrap_or(0)
    }
}

fn is_candidate(shape: &Shape, policy: HoistPolicy) -> bool {
    match shape {
        Shape::Object(object) => !object.fields.is_empty(),
        Shape::Union(alternatives) => {
            policy == HoistPolicy::Shared
                && alternatives.iter().filter(|a| a.is_object_like()).count() >= 2
        }
        _ => false,
    }
}

/// Rewrites shapes in place against one registry.
#[derive(Debug)]
pub struct Deduplicator<'r> {
    registry: &'r mut Registry,
    policy: HoistPolicy,
    occurrences: Occurrences,
}

impl<'r> Deduplicator<'r> {
    /// Hoist only shapes that repeat; counts occurrences across every
    /// component currently in the registry.
    pub fn shared(registry: &'r mut Registry) -> Self {
        registry.refresh();
        let occurrences = Occurrences::collect(registry);
        Self {
            registry,
            policy: HoistPolicy::Shared,
            occurrences,
        }
    }

    /// Hoist every nested object that has fields.
    pub fn always(registry: &'r mut Registry) -> Self {
        registry.refresh();
        Self {
            registry,
            policy: HoistPolicy::Always,
            occurrences: Occurrences::default(),
        }
    }

    /// Canonicalize every component that has not been canonicalized yet.
    pub fn canonicalize_components(&mut self) -> Result<()> {
        let pending: Vec<String> = self
            .registry
            .components()
            .iter()
            .filter(|c| {
                !c.canonical && c.origin != ComponentOrigin::Hoisted && c.shape.is_some()
            })
            .map(|c| c.name.clone())
            .collect();

        for name in pending {
            let Some(shape) = self.registry.shape(&name).cloned() else {
                continue;
            };
            let shape = self.canonicalize(shape, &ShapePath::root(&name), 0)?;
            self.registry.define_canonical(&name, shape);
        }
        Ok(())
    }

    /// Canonicalize a top-level fragment that is not itself a component.
    /// The fragment is replaced by a reference when a component already
    /// describes the same shape.
    pub fn canonicalize_fragment(&mut self, shape: Shape, path: &ShapePath) -> Result<Shape> {
        let shape = self.canonicalize(shape, path, 0)?;
        if is_candidate(&shape, self.policy) {
            if let Some(name) = self.registry.find_equivalent(&shape) {
                return Ok(Shape::Reference(name.to_string()));
            }
        }
        Ok(shape)
    }

    fn canonicalize(&mut self, shape: Shape, path: &ShapePath, depth: usize) -> Result<Shape> {
        let shape = match shape {
            Shape::Array(element) => {
                Shape::Array(Box::new(self.canonicalize(*element, &path.item(), depth + 1)?))
            }
            Shape::Object(object) => {
                let mut fields = Vec::with_capacity(object.fields.len());
                for field in object.fields {
                    let path = path.child(&field.name);
                    let shape = self.canonicalize(field.shape, &path, depth + 1)?;
                    fields.push(Field { shape, ..field });
                }
                let additional = match object.additional {
                    Some(value) => {
                        let value = self.canonicalize(*value, &path.value(), depth + 1)?;
                        Some(Box::new(value))
                    }
                    None => None,
                };
                Shape::Object(ObjectShape { fields, additional })
            }
            Shape::Union(alternatives) => {
                // Several named alternatives must not take the union's own name.
                let distinct = alternatives.iter().filter(|a| a.is_object_like()).count() >= 2;
                let mut canonical = Vec::with_capacity(alternatives.len());
                for (n, alternative) in alternatives.into_iter().enumerate() {
                    let path = if distinct { path.alternative(n + 1) } else { path.clone() };
                    canonical.push(self.canonicalize(alternative, &path, depth + 1)?);
                }
                Shape::union(canonical)
            }
            other => other,
        };

        if depth == 0 || !is_candidate(&shape, self.policy) {
            return Ok(shape);
        }
        self.intern(shape, path)
    }

    fn intern(&mut self, shape: Shape, path: &ShapePath) -> Result<Shape> {
        if let Some(name) = self.registry.find_equivalent(&shape) {
            return Ok(Shape::Reference(name.to_string()));
        }

        let hoist = match self.policy {
            HoistPolicy::Always => true,
            HoistPolicy::Shared => self.occurrences.count(&shape, self.registry) >= 2,
        };
        if !hoist {
            return Ok(shape);
        }

        let name = self.registry.hoist(shape, path)?;
        Ok(Shape::Reference(name))
    }
}
