//! Named components and the name allocator.
//!
//! The registry is an arena of components indexed by name. References in the
//! IR only carry a name, so recursive schemas never need back-pointers: a
//! name is reserved before its shape is built and filled in afterwards.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::equivalence::{equivalent, fingerprint, placeholders, tag};
use super::shape::Shape;
use super::utils::{pascal_segment, sanitize_type_name};
use crate::error::{Error, Result};

/// Highest numeric suffix tried before giving up on a name.
pub const MAX_NAME_SUFFIX: usize = 10_000;

/// Naming path of a shape: the root declaration followed by property names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePath {
    segments: Vec<String>,
}

impl ShapePath {
    /// Path of a top-level declaration.
    pub fn root(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    /// Path of a property below this one.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    /// Path of the element shape of an array at this path.
    pub fn item(&self) -> Self {
        self.suffixed("Item")
    }

    /// Path of the `additionalProperties` value shape at this path.
    pub fn value(&self) -> Self {
        self.suffixed("Value")
    }

    /// Path of the `n`th (1-based) alternative of a union at this path.
    pub fn alternative(&self, n: usize) -> Self {
        self.suffixed(&format!("Option{n}"))
    }

    /// Raw segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn suffixed(&self, suffix: &str) -> Self {
        let mut segments = self.segments.clone();
        match segments.last_mut() {
            Some(last) => last.push_str(suffix),
            None => segments.push(suffix.to_string()),
        }
        Self { segments }
    }
}

impl fmt::Display for ShapePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Hands out unique declaration names, deterministically.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Derive a name from a shape path.
    ///
    /// Tries the PascalCased last segment, then ascends toward the root
    /// (`Address`, `UserAddress`), then suffixes the full name from 2 up.
    pub fn allocate(&mut self, path: &ShapePath) -> Result<String> {
        let parts: Vec<String> = path
            .segments()
            .iter()
            .map(|s| pascal_segment(s))
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            return self.allocate_suffixed("AnonymousType");
        }

        for start in (0..parts.len()).rev() {
            let candidate = sanitize_type_name(&parts[start..].concat());
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }

        self.allocate_suffixed(&sanitize_type_name(&parts.concat()))
    }

    /// Claim an explicit name (sanitized), suffixing it on collision.
    pub fn allocate_name(&mut self, preferred: &str) -> Result<String> {
        let base = sanitize_type_name(preferred);
        if self.taken.insert(base.clone()) {
            return Ok(base);
        }
        self.allocate_suffixed(&base)
    }

    fn allocate_suffixed(&mut self, base: &str) -> Result<String> {
        for suffix in 2..=MAX_NAME_SUFFIX {
            let candidate = format!("{base}{suffix}");
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(Error::NameExhausted {
            base: base.to_string(),
            attempts: MAX_NAME_SUFFIX - 1,
        })
    }
}

/// Where a component came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentOrigin {
    /// The caller-named root of a single-schema call.
    Root,
    /// A `$ref` target or an OpenAPI `components.schemas` entry.
    Definition,
    /// An anonymous shape promoted to a named declaration.
    Hoisted,
}

/// A named shape held by the registry.
#[derive(Debug, Clone)]
pub struct Component {
    /// Unique declaration name.
    pub name: String,
    /// `None` while the shape is still being built.
    pub shape: Option<Shape>,
    /// How the component entered the registry.
    pub origin: ComponentOrigin,
    /// Whether nested shapes have been through deduplication.
    pub canonical: bool,
    /// `$ref` pointer that resolves to this component, if any.
    pub pointer: Option<String>,
}

/// Arena of components for one synthesis call.
///
/// Fingerprints are kept per component. A fingerprint computed while a
/// referenced component was still a placeholder is recomputed when that
/// placeholder is filled.
#[derive(Debug, Default)]
pub struct Registry {
    names: NameAllocator,
    components: Vec<Component>,
    index: HashMap<String, usize>,
    pointers: HashMap<String, String>,
    buckets: HashMap<u64, Vec<usize>>,
    fingerprints: HashMap<usize, u64>,
    waiting: HashMap<String, Vec<usize>>,
    stale: bool,
}

impl Registry {
    /// An empty registry; every call builds its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the caller-supplied root name. `#` resolves to it.
    pub fn reserve_root(&mut self, name: &str) -> Result<String> {
        let name = self.names.allocate_name(name)?;
        self.push(name.clone(), ComponentOrigin::Root, Some("#"));
        self.pointers.insert("#".to_string(), name.clone());
        Ok(name)
    }

    /// Reserve a definition reached through `pointer`, named after `preferred`.
    pub fn reserve_definition(&mut self, pointer: &str, preferred: &str) -> Result<String> {
        let name = self.names.allocate_name(preferred)?;
        self.push(name.clone(), ComponentOrigin::Definition, Some(pointer));
        self.pointers.insert(pointer.to_string(), name.clone());
        Ok(name)
    }

    /// Reserve a declaration name that is not a component (per-operation types).
    pub fn reserve_declaration(&mut self, preferred: &str) -> Result<String> {
        self.names.allocate_name(preferred)
    }

    /// Name already bound to a `$ref` pointer.
    pub fn name_for_pointer(&self, pointer: &str) -> Option<&str> {
        self.pointers.get(pointer).map(String::as_str)
    }

    /// Fill in (or replace) the shape of a reserved component.
    pub fn define(&mut self, name: &str, shape: Shape) {
        self.set_shape(name, shape, false);
    }

    /// Like [`Registry::define`], for shapes that are already deduplicated.
    pub fn define_canonical(&mut self, name: &str, shape: Shape) {
        self.set_shape(name, shape, true);
    }

    /// Promote an anonymous shape to a new component named from `path`.
    pub fn hoist(&mut self, shape: Shape, path: &ShapePath) -> Result<String> {
        let name = self.names.allocate(path)?;
        tracing::debug!(name = %name, path = %path, "hoisting shape");
        let idx = self.push(name.clone(), ComponentOrigin::Hoisted, None);
        let component = &mut self.components[idx];
        component.shape = Some(shape);
        component.canonical = true;
        self.index_component(idx);
        Ok(name)
    }

    /// First registered component structurally equal to `shape`.
    pub fn find_equivalent(&self, shape: &Shape) -> Option<&str> {
        let candidates = self.buckets.get(&fingerprint(shape, self))?;
        candidates.iter().find_map(|&idx| {
            let component = &self.components[idx];
            component
                .shape
                .as_ref()
                .filter(|existing| equivalent(shape, existing, self))
                .map(|_| component.name.as_str())
        })
    }

    /// Recompute every fingerprint, but only after a replaced shape changed
    /// kind; filled placeholders are handled as they are defined.
    pub fn refresh(&mut self) {
        if !self.stale {
            return;
        }
        self.buckets.clear();
        self.fingerprints.clear();
        self.waiting.clear();
        for idx in 0..self.components.len() {
            self.index_component(idx);
        }
        self.stale = false;
    }

    /// Shape registered under `name`, if defined.
    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.index
            .get(name)
            .and_then(|&idx| self.components[idx].shape.as_ref())
    }

    /// Pointer a component was reserved under.
    pub fn pointer_of(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .and_then(|&idx| self.components[idx].pointer.as_deref())
    }

    /// Components in registration order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn push(&mut self, name: String, origin: ComponentOrigin, pointer: Option<&str>) -> usize {
        let idx = self.components.len();
        self.index.insert(name.clone(), idx);
        self.components.push(Component {
            name,
            shape: None,
            origin,
            canonical: false,
            pointer: pointer.map(str::to_string),
        });
        idx
    }

    fn set_shape(&mut self, name: &str, shape: Shape, canonical: bool) {
        let Some(&idx) = self.index.get(name) else {
            tracing::warn!(name, "defining a component that was never reserved");
            return;
        };

        // Referrers only see the kind of a defined component.
        let changed_kind = self.components[idx]
            .shape
            .as_ref()
            .is_some_and(|previous| tag(previous, self) != tag(&shape, self));
        self.stale |= changed_kind;
        let component = &mut self.components[idx];
        component.shape = Some(shape);
        component.canonical = canonical;
        self.index_component(idx);

        for dependent in self.waiting.remove(name).unwrap_or_default() {
            self.index_component(dependent);
        }
    }

    /// (Re)compute the fingerprint of one component and move it to its bucket.
    fn index_component(&mut self, idx: usize) {
        if let Some(previous) = self.fingerprints.remove(&idx) {
            if let Some(bucket) = self.buckets.get_mut(&previous) {
                bucket.retain(|&i| i != idx);
            }
        }
        let Some(shape) = &self.components[idx].shape else {
            return;
        };

        let fp = fingerprint(shape, self);
        let pending: Vec<String> = placeholders(shape, self)
            .into_iter()
            .map(str::to_string)
            .collect();
        for name in pending {
            let dependents = self.waiting.entry(name).or_default();
            if !dependents.contains(&idx) {
                dependents.push(idx);
            }
        }
        self.fingerprints.insert(idx, fp);
        self.buckets.entry(fp).or_default().push(idx);
    }
}
