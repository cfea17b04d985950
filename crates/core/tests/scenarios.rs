//! End-to-end scenarios through the public entry points.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use schema_ts::{
    DiagnosticKind, SchemaTypeOptions, openapi_to_types, openapi_to_types_with, schema_to_type,
    synthesize,
};
use serde_json::{Value, json};

fn todo_item() -> Value {
    json!({
        "type": "object",
        "properties": {
            "description": { "type": "string" },
            "priority": { "type": "integer" }
        }
    })
}

#[test]
fn test_user_object() {
    let schema = json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "age": { "type": "number" }
        },
        "required": ["id"]
    });
    assert_eq!(
        schema_to_type("User", &schema, None).unwrap(),
        "export type User = {\n  id: string;\n  age?: number;\n};"
    );
}

#[test]
fn test_primitives_and_enums() {
    assert_eq!(
        schema_to_type("Name", &json!({ "type": "string" }), None).unwrap(),
        "export type Name = string;"
    );
    assert_eq!(
        schema_to_type("Count", &json!({ "type": "integer" }), None).unwrap(),
        "export type Count = number;"
    );
    assert_eq!(
        schema_to_type("Choice", &json!({ "enum": ["a", "b"] }), None).unwrap(),
        "export type Choice = \"a\" | \"b\";"
    );
    assert_eq!(
        schema_to_type(
            "Flags",
            &json!({ "type": "array", "items": { "enum": [1, 2] } }),
            None
        )
        .unwrap(),
        "export type Flags = (1 | 2)[];"
    );
}

#[test]
fn test_repeated_object_under_union_arrays_is_hoisted_once() {
    let schema = json!({
        "type": "object",
        "properties": {
            "todos": { "type": "array", "items": { "anyOf": [{ "type": "string" }, todo_item()] } },
            "done": { "type": "array", "items": { "anyOf": [{ "type": "string" }, todo_item()] } }
        }
    });

    let output = synthesize("Tasks", &schema, None).unwrap();
    assert_eq!(output.declarations.len(), 2);
    assert_eq!(
        output.text(),
        "export type Tasks = {\n  todos?: (string | TodosItem)[];\n  done?: (string | TodosItem)[];\n};\n\n\
         export type TodosItem = {\n  description?: string;\n  priority?: number;\n};"
    );
}

#[test]
fn test_recursive_definitions_terminate() {
    let schema = json!({
        "$ref": "#/$defs/Node",
        "$defs": {
            "Node": {
                "type": "object",
                "properties": {
                    "value": { "type": "number" },
                    "children": { "type": "array", "items": { "$ref": "#/$defs/Node" } }
                },
                "required": ["value"]
            }
        }
    });
    assert_eq!(
        schema_to_type("Tree", &schema, None).unwrap(),
        "export type Tree = Node;\n\nexport type Node = {\n  value: number;\n  children?: Node[];\n};"
    );
}

#[test]
fn test_self_reference_through_root() {
    let schema = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "parent": { "$ref": "#" }
        }
    });
    assert_eq!(
        schema_to_type("Category", &schema, None).unwrap(),
        "export type Category = {\n  name?: string;\n  parent?: Category;\n};"
    );
}

#[test]
fn test_all_of_fallback_reports_diagnostic() {
    let schema = json!({
        "type": "object",
        "properties": {
            "mixed": { "allOf": [{ "type": "string" }, { "type": "object", "properties": { "a": {} } }] }
        }
    });
    let options = SchemaTypeOptions {
        prefer_unknown_over_any: true,
        ..Default::default()
    };
    let output = synthesize("Holder", &schema, Some(&options)).unwrap();

    assert_eq!(output.text(), "export type Holder = {\n  mixed?: unknown;\n};");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].kind, DiagnosticKind::AllOfNonObject);
    assert_eq!(output.diagnostics[0].path, "Holder.mixed");
}

#[test]
fn test_required_alternatives_keep_the_declared_object() {
    let schema = json!({
        "type": "object",
        "properties": {
            "email": { "type": "string" },
            "phone": { "type": "string" }
        },
        "anyOf": [{ "required": ["email"] }, { "required": ["phone"] }]
    });
    let output = synthesize("Contact", &schema, None).unwrap();
    assert_eq!(
        output.text(),
        "export type Contact = {\n  email: string;\n  phone?: string;\n} | {\n  email?: string;\n  phone: string;\n};"
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_all_of_member_that_only_requires_fields() {
    let schema = json!({
        "allOf": [{ "$ref": "#/$defs/Base" }, { "required": ["id"] }],
        "$defs": {
            "Base": {
                "type": "object",
                "properties": { "id": { "type": "string" }, "name": { "type": "string" } }
            }
        }
    });
    let output = synthesize("Thing", &schema, None).unwrap();
    assert_eq!(
        output.text(),
        "export type Thing = {\n  id: string;\n  name?: string;\n};\n\n\
         export type Base = {\n  id?: string;\n  name?: string;\n};"
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_large_integer_enum_values_stay_exact() {
    let schema = json!({ "enum": [u64::MAX, 1] });
    assert_eq!(
        schema_to_type("Big", &schema, None).unwrap(),
        "export type Big = 18446744073709551615 | 1;"
    );
}

#[test]
fn test_jsdoc_for_documented_fields() {
    let schema = json!({
        "type": "object",
        "properties": {
            "login": { "type": "string", "description": "Login name" },
            "legacyId": { "type": "string", "deprecated": true }
        },
        "required": ["login"]
    });
    assert_eq!(
        schema_to_type("Account", &schema, None).unwrap(),
        "export type Account = {\n  /**\n   * Login name\n   */\n  login: string;\n  /**\n   * @deprecated\n   */\n  legacyId?: string;\n};"
    );
}

#[test]
fn test_interface_and_unknown_options() {
    let schema = json!({
        "type": "object",
        "properties": { "data": {} }
    });
    let options = SchemaTypeOptions {
        prefer_unknown_over_any: true,
        prefer_interface_over_type: true,
    };
    assert_eq!(
        schema_to_type("Payload", &schema, Some(&options)).unwrap(),
        "export interface Payload {\n  data?: unknown;\n};"
    );
    assert_eq!(
        schema_to_type("Payload", &schema, None).unwrap(),
        "export type Payload = {\n  data?: any;\n};"
    );
}

#[test]
fn test_single_schema_output_is_deterministic() {
    let schema = json!({
        "type": "object",
        "properties": {
            "a": { "type": "array", "items": todo_item() },
            "b": todo_item(),
            "c": { "$ref": "#/definitions/Extra" }
        },
        "definitions": {
            "Extra": { "type": "object", "properties": { "x": { "type": ["string", "null"] } } }
        }
    });
    let first = schema_to_type("Root", &schema, None).unwrap();
    let second = schema_to_type("Root", &schema, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_openapi_single_get() {
    let document = json!({
        "openapi": "3.1.0",
        "info": { "title": "Health", "version": "1.0.0" },
        "paths": {
            "/health": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "status": { "type": "string" } },
                                "required": ["status"]
                            } } }
                        }
                    }
                }
            }
        }
    });

    let output = openapi_to_types(&document).unwrap();
    assert_eq!(output.paths.len(), 1);

    let entry = &output.paths[0];
    assert_eq!(entry.path, "/health");
    assert_eq!(entry.method, "get");
    assert!(entry.query_ts_type.is_none());
    assert!(entry.path_ts_type.is_none());
    assert!(entry.request_body.is_none());
    assert_eq!(entry.responses.len(), 1);
    assert_eq!(entry.responses["200"].description, "OK");
    assert_eq!(
        entry.responses["200"].ts_type,
        "export type GetHealthResponse200 = {\n  status: string;\n};"
    );
    assert!(output.components.is_empty());

    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({
            "paths": [{
                "path": "/health",
                "method": "get",
                "responses": {
                    "200": {
                        "description": "OK",
                        "tsType": "export type GetHealthResponse200 = {\n  status: string;\n};"
                    }
                }
            }],
            "components": []
        })
    );
}

#[test]
fn test_openapi_shared_nested_objects_become_components() {
    let document = json!({
        "openapi": "3.0.3",
        "paths": {
            "/orders": {
                "post": {
                    "operationId": "createOrder",
                    "requestBody": { "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": {
                            "shipping": { "type": "object", "properties": { "street": { "type": "string" }, "zip": { "type": "string" } } }
                        }
                    } } } },
                    "responses": {
                        "201": { "description": "Created", "content": { "application/json": { "schema": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string", "nullable": true },
                                "billing": { "type": "object", "properties": { "zip": { "type": "string" }, "street": { "type": "string" } } }
                            }
                        } } } }
                    }
                }
            }
        }
    });

    let output = openapi_to_types(&document).unwrap();
    let names: Vec<&str> = output.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Shipping"]);
    assert_eq!(
        output.components[0].ts_type,
        "export type Shipping = {\n  street?: string;\n  zip?: string;\n};"
    );

    let entry = output.operation("/orders", "post").unwrap();
    assert_eq!(
        entry.request_body.as_deref(),
        Some("export type CreateOrderBody = {\n  shipping?: Shipping;\n};")
    );
    assert_eq!(
        entry.responses["201"].ts_type,
        "export type CreateOrderResponse201 = {\n  id?: string | null;\n  billing?: Shipping;\n};"
    );
}

#[test]
fn test_openapi_output_is_deterministic() {
    let document = json!({
        "openapi": "3.1.0",
        "paths": {
            "/a/{id}": {
                "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }],
                "get": { "responses": { "200": { "description": "", "content": { "application/json": { "schema": todo_item() } } } } },
                "put": { "requestBody": { "content": { "application/json": { "schema": todo_item() } } }, "responses": {} }
            }
        },
        "components": { "schemas": { "Todo": todo_item() } }
    });
    let options = SchemaTypeOptions {
        prefer_interface_over_type: true,
        ..Default::default()
    };
    let first = openapi_to_types_with(&document, &options).unwrap();
    let second = openapi_to_types_with(&document, &options).unwrap();
    assert_eq!(first, second);

    let get = first.operation("/a/{id}", "get").unwrap();
    assert_eq!(get.responses["200"].ts_type, "export type GetAIdResponse200 = Todo;");
    assert_eq!(
        get.path_ts_type.as_deref(),
        Some("export interface GetAIdPath {\n  id: number;\n};")
    );
}

#[test]
fn test_openapi_rejects_malformed_documents() {
    assert!(openapi_to_types(&json!({ "swagger": "2.0", "paths": {} })).is_err());
    assert!(openapi_to_types(&json!({ "openapi": "3.1.0", "paths": [] })).is_err());
    assert!(openapi_to_types(&json!("openapi")).is_err());
}
