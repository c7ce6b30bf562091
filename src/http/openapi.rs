//! OpenAPI document for the REST adapter
//!
//! Built from the gateway's descriptors so the document always
//! matches what the handlers accept.

use serde_json::{json, Map, Value};

use crate::core::dispatch::Gateway;

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn result_schema(tool: &str) -> Value {
    match tool {
        "calc-evaluate" => json!({ "oneOf": [{ "type": "number" }, { "type": "boolean" }] }),
        "web-search_google" | "web-search_searxng" => json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/SearchResult" }
        }),
        _ => json!({ "type": "string" }),
    }
}

/// Render the OpenAPI 3.1 document
pub fn openapi_document(gateway: &Gateway) -> Value {
    let mut paths = Map::new();
    let auth_enabled = gateway.config().auth_enabled();

    for descriptor in gateway.descriptors() {
        let mut responses = Map::new();
        responses.insert(
            "200".to_string(),
            json!({
                "description": "Successful response",
                "content": { "application/json": { "schema": result_schema(descriptor.name) } }
            }),
        );
        responses.insert("400".to_string(), error_response("Invalid input"));
        if auth_enabled {
            responses.insert("401".to_string(), error_response("Invalid or missing token"));
        }
        if descriptor.check_available(gateway.config()).is_err() {
            responses.insert("503".to_string(), error_response("Feature not configured"));
        }

        let mut operation = json!({
            "operationId": descriptor.name,
            "summary": descriptor.description,
            "requestBody": {
                "required": true,
                "content": { "application/json": { "schema": descriptor.schema.to_json_schema() } }
            },
            "responses": responses
        });
        if auth_enabled {
            operation["security"] = json!([{ "bearerAuth": [] }]);
        }

        paths.insert(format!("/{}", descriptor.name), json!({ "post": operation }));
    }

    let mut components = json!({
        "schemas": {
            "SearchResult": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "url": { "type": "string" },
                    "content": { "type": "string" },
                    "excerpt": { "type": "string" }
                },
                "required": ["title", "url", "content", "excerpt"]
            },
            "ErrorResponse": {
                "type": "object",
                "properties": {
                    "detail": { "type": "string" },
                    "kind": { "type": "string" }
                },
                "required": ["detail", "kind"]
            }
        }
    });
    if auth_enabled {
        components["securitySchemes"] = json!({
            "bearerAuth": { "type": "http", "scheme": "bearer" }
        });
    }

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "toolgate",
            "description": "Web search, webpage extraction and calculator tools",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": paths,
        "components": components
    })
}
