//! Walks an OpenAPI document and produces per-operation declarations.
//!
//! All schemas of one document share a single registry: component schemas
//! are registered first under their own names, then every operation is
//! converted in document order. Nested objects are always hoisted here, and
//! an operation type that matches a component becomes a reference to it.

use indexmap::IndexMap;
use serde_json::Value;

use super::output::{OpenApiComponent, OpenApiOutput, OpenApiPath, OpenApiResponse};
use super::spec::{
    Components, OpenApiDocument, Operation, Parameter, PathItem, ReferenceOr, select_schema,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::options::SchemaTypeOptions;
use crate::schema::utils::pascal_segment;
use crate::schema::{
    ComponentOrigin, Deduplicator, Emitter, Field, ObjectShape, Registry, Shape, ShapeBuilder,
    ShapePath,
};

const PARAMETERS_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODIES_PREFIX: &str = "#/components/requestBodies/";
const RESPONSES_PREFIX: &str = "#/components/responses/";

/// Convert a whole document.
pub fn convert(document: &Value, options: &SchemaTypeOptions) -> Result<OpenApiOutput> {
    let spec = OpenApiDocument::from_value(document)?;
    let mut orchestrator = Orchestrator {
        document,
        registry: Registry::new(),
        diagnostics: Diagnostics::default(),
        emitter: Emitter::new(*options),
    };

    orchestrator.register_components(&spec.components)?;

    let mut paths = Vec::new();
    for (template, item) in &spec.paths {
        for (method, operation) in item.operations()? {
            paths.push(orchestrator.convert_operation(
                template,
                method,
                item,
                &operation,
                &spec.components,
            )?);
        }
    }

    orchestrator.finish(paths)
}

struct Orchestrator<'d> {
    document: &'d Value,
    registry: Registry,
    diagnostics: Diagnostics,
    emitter: Emitter,
}

impl Orchestrator<'_> {
    fn register_components(&mut self, components: &Components) -> Result<()> {
        let mut reserved = Vec::with_capacity(components.schemas.len());
        for name in components.schemas.keys() {
            let escaped = name.replace('~', "~0").replace('/', "~1");
            let pointer = format!("#/components/schemas/{escaped}");
            reserved.push(self.registry.reserve_definition(&pointer, name)?);
        }

        for (declared, schema) in reserved.iter().zip(components.schemas.values()) {
            // allOf members may already have built later components
            if self.registry.shape(declared).is_none() {
                self.builder().build_definition(declared, schema)?;
            }
        }

        Deduplicator::always(&mut self.registry).canonicalize_components()?;
        tracing::debug!(components = self.registry.len(), "registered component schemas");
        Ok(())
    }

    fn convert_operation(
        &mut self,
        template: &str,
        method: &str,
        item: &PathItem,
        operation: &Operation,
        components: &Components,
    ) -> Result<OpenApiPath> {
        let base = operation_base_name(template, method, operation);
        let scope = format!("{method} {template}");
        tracing::debug!(operation = %scope, base = %base, "converting operation");

        let parameters =
            self.merge_parameters(&scope, &item.parameters, &operation.parameters, components);
        let path_ts_type = self.parameter_declaration(&base, "Path", "path", &parameters)?;
        let query_ts_type = self.parameter_declaration(&base, "Query", "query", &parameters)?;

        let request_body = match &operation.request_body {
            Some(body) => match body.resolve(&components.request_bodies, REQUEST_BODIES_PREFIX) {
                Ok(body) => match select_schema(&body.content) {
                    Some(schema) => Some(self.schema_declaration(&format!("{base}Body"), schema)?),
                    None => None,
                },
                Err(reason) => {
                    self.diagnostics.record(&scope, DiagnosticKind::UnresolvedReference, reason);
                    None
                }
            },
            None => None,
        };

        let mut responses = IndexMap::new();
        for (code, response) in &operation.responses {
            let response = match response.resolve(&components.responses, RESPONSES_PREFIX) {
                Ok(response) => response,
                Err(reason) => {
                    self.diagnostics.record(&scope, DiagnosticKind::UnresolvedReference, reason);
                    continue;
                }
            };

            let hint = format!("{base}Response{}", pascal_segment(code));
            let ts_type = match select_schema(&response.content) {
                Some(schema) => self.schema_declaration(&hint, schema)?,
                None => {
                    let name = self.registry.reserve_declaration(&hint)?;
                    self.emitter.void_declaration(&name)
                }
            };
            responses.insert(
                code.clone(),
                OpenApiResponse {
                    description: response.description.clone(),
                    ts_type,
                },
            );
        }

        Ok(OpenApiPath {
            path: template.to_string(),
            method: method.to_string(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            query_ts_type,
            path_ts_type,
            request_body,
            responses,
        })
    }

    /// Path-level parameters overridden by operation-level ones with the
    /// same name and location. References are resolved; duplicates within
    /// one level keep the first.
    fn merge_parameters(
        &mut self,
        scope: &str,
        shared: &[ReferenceOr<Parameter>],
        own: &[ReferenceOr<Parameter>],
        components: &Components,
    ) -> Vec<Parameter> {
        let mut merged: Vec<Parameter> = Vec::new();
        for level in [shared, own] {
            let mut seen: Vec<(&str, &str)> = Vec::new();
            for parameter in level {
                let parameter = match parameter.resolve(&components.parameters, PARAMETERS_PREFIX) {
                    Ok(parameter) => parameter,
                    Err(reason) => {
                        self.diagnostics.record(scope, DiagnosticKind::UnresolvedReference, reason);
                        continue;
                    }
                };

                let key = (parameter.name.as_str(), parameter.location.as_str());
                if seen.contains(&key) {
                    self.diagnostics.record(
                        format!("{scope}.{}", parameter.name),
                        DiagnosticKind::DuplicateField,
                        format!("duplicate {} parameter; keeping the first", parameter.location),
                    );
                    continue;
                }
                seen.push(key);

                merged.retain(|p| !(p.name == parameter.name && p.location == parameter.location));
                merged.push(parameter.clone());
            }
        }
        merged
    }

    fn parameter_declaration(
        &mut self,
        base: &str,
        suffix: &str,
        location: &str,
        parameters: &[Parameter],
    ) -> Result<Option<String>> {
        let selected: Vec<&Parameter> =
            parameters.iter().filter(|p| p.location == location).collect();
        if selected.is_empty() {
            return Ok(None);
        }

        let name = self.registry.reserve_declaration(&format!("{base}{suffix}"))?;
        let path = ShapePath::root(&name);
        let mut object = ObjectShape::default();
        for parameter in selected {
            let shape = match parameter.schema() {
                Some(schema) => self.builder().build(schema, &path.child(&parameter.name))?,
                None => Shape::Unknown,
            };
            object.fields.push(Field {
                name: parameter.name.clone(),
                shape,
                required: parameter.required || location == "path",
                description: parameter.description.clone(),
                deprecated: parameter.deprecated,
            });
        }

        let shape = Deduplicator::always(&mut self.registry)
            .canonicalize_fragment(Shape::Object(object), &path)?;
        Ok(Some(self.emitter.declaration(&name, &shape)))
    }

    fn schema_declaration(&mut self, hint: &str, schema: &Value) -> Result<String> {
        let name = self.registry.reserve_declaration(hint)?;
        let path = ShapePath::root(&name);
        let shape = self.builder().build(schema, &path)?;
        let shape = Deduplicator::always(&mut self.registry).canonicalize_fragment(shape, &path)?;
        Ok(self.emitter.declaration(&name, &shape))
    }

    fn finish(mut self, paths: Vec<OpenApiPath>) -> Result<OpenApiOutput> {
        // References reached only from operations are registered raw.
        Deduplicator::always(&mut self.registry).canonicalize_components()?;

        let components: Vec<OpenApiComponent> = self
            .registry
            .components()
            .iter()
            .filter(|c| c.origin != ComponentOrigin::Root)
            .filter_map(|c| {
                c.shape.as_ref().map(|shape| OpenApiComponent {
                    name: c.name.clone(),
                    ts_type: self.emitter.declaration(&c.name, shape),
                })
            })
            .collect();

        tracing::debug!(
            operations = paths.len(),
            components = components.len(),
            diagnostics = self.diagnostics.records().len(),
            "converted OpenAPI document"
        );

        Ok(OpenApiOutput {
            paths,
            components,
            diagnostics: self.diagnostics.into_vec(),
        })
    }

    fn builder(&mut self) -> ShapeBuilder<'_> {
        ShapeBuilder::new(self.document, &mut self.registry, &mut self.diagnostics)
    }
}

/// PascalCased `operationId`, or method plus path segments.
fn operation_base_name(template: &str, method: &str, operation: &Operation) -> String {
    if let Some(id) = operation.operation_id.as_deref().map(pascal_segment) {
        if !id.is_empty() {
            return id;
        }
    }

    let mut name = pascal_segment(method);
    for segment in template.split('/') {
        name.push_str(&pascal_segment(segment));
    }
    name
}
