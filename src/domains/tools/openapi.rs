//! OpenAPI 3.1 document built from the capability registry.

use serde_json::{Map, Value, json};

use super::capability::{route_path, tool_name};
use super::registry::CapabilityRegistry;
use super::spec::object_schema;

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Error" }
            }
        }
    })
}

/// Render the document. `secured` adds the bearer scheme to every operation.
pub fn openapi_document(
    registry: &CapabilityRegistry,
    secured: bool,
    title: &str,
    version: &str,
) -> Value {
    let mut paths = Map::new();
    for (capability, op) in registry.operations() {
        let mut operation = json!({
            "operationId": tool_name(&capability.namespace, op.name),
            "summary": op.description,
            "tags": [capability.namespace],
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": Value::Object(object_schema(&op.parameters))
                    }
                }
            },
            "responses": {
                "200": {
                    "description": "Successful response",
                    "content": {
                        "application/json": { "schema": op.returns.json_schema() }
                    }
                },
                "400": error_response("Invalid request"),
                "401": error_response("Missing or invalid bearer token"),
                "500": error_response("Internal server error"),
            }
        });
        if capability.namespace == "web" || capability.namespace == "fetch" {
            if let Some(responses) = operation["responses"].as_object_mut() {
                responses.insert("502".into(), error_response("Upstream unavailable"));
                responses.insert("503".into(), error_response("Provider not configured"));
                responses.insert("504".into(), error_response("Upstream timed out"));
            }
        }
        if secured {
            operation["security"] = json!([{ "bearerAuth": [] }]);
        }
        paths.insert(
            route_path(&capability.namespace, op.name),
            json!({ "post": operation }),
        );
    }

    let tags: Vec<Value> = registry
        .all()
        .iter()
        .map(|c| json!({ "name": c.namespace, "description": c.description }))
        .collect();

    let mut components = json!({
        "schemas": {
            "Error": {
                "type": "object",
                "properties": {
                    "error": {
                        "type": "object",
                        "properties": {
                            "kind": { "type": "string" },
                            "message": { "type": "string" }
                        },
                        "required": ["kind", "message"]
                    }
                },
                "required": ["error"]
            }
        }
    });
    if secured {
        components["securitySchemes"] = json!({
            "bearerAuth": { "type": "http", "scheme": "bearer" }
        });
    }

    json!({
        "openapi": "3.1.0",
        "info": { "title": title, "version": version },
        "tags": tags,
        "paths": paths,
        "components": components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::with_default_capabilities().unwrap()
    }

    #[test]
    fn test_paths_cover_every_operation() {
        let registry = registry();
        let doc = openapi_document(&registry, false, "tool-hub", "0.1.0");
        let paths = doc["paths"].as_object().unwrap();
        assert_eq!(paths.len(), registry.route_paths().len());

        let evaluate = &doc["paths"]["/calc/evaluate"]["post"];
        assert_eq!(evaluate["operationId"], "calc_evaluate");
        assert_eq!(
            evaluate["requestBody"]["content"]["application/json"]["schema"]["required"],
            json!(["expression"])
        );
        assert!(evaluate.get("security").is_none());
        assert!(doc["components"].get("securitySchemes").is_none());
    }

    #[test]
    fn test_secured_document_declares_bearer_scheme() {
        let doc = openapi_document(&registry(), true, "tool-hub", "0.1.0");
        assert_eq!(doc["components"]["securitySchemes"]["bearerAuth"]["scheme"], "bearer");
        assert_eq!(
            doc["paths"]["/time/now"]["post"]["security"],
            json!([{ "bearerAuth": [] }])
        );
    }
}
