//! Bundle schemas and the validation gate
//!
//! Each bundle kind has a declared JSON Schema. A bundle is rendered as a
//! JSON document, with numeric columns coerced from their source text, and
//! checked against the schema of its kind before it may be written.

pub mod document;
pub mod validator;

pub use document::bundle_document;
pub use validator::{BundleValidator, JsonSchemaValidator, NoValidation};

use once_cell::sync::Lazy;
use serde_json::{json, Value};

fn string() -> Value {
    json!({ "type": "string" })
}

fn integer() -> Value {
    json!({ "type": "integer" })
}

fn number() -> Value {
    json!({ "type": "number" })
}

fn tags_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["id", "key", "value", "type"],
            "properties": {
                "id": integer(),
                "key": string(),
                "value": string(),
                "type": string()
            }
        }
    })
}

/// Schema of a node bundle: `{"node": {...}, "node_tags": [...]}`
pub static NODE_BUNDLE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["node", "node_tags"],
        "properties": {
            "node": {
                "type": "object",
                "required": ["id", "lat", "lon", "user", "uid", "version", "changeset", "timestamp"],
                "properties": {
                    "id": integer(),
                    "lat": number(),
                    "lon": number(),
                    "user": string(),
                    "uid": integer(),
                    "version": string(),
                    "changeset": integer(),
                    "timestamp": string()
                }
            },
            "node_tags": tags_schema()
        }
    })
});

/// Schema of a way bundle: `{"way": {...}, "way_nodes": [...], "way_tags": [...]}`
pub static WAY_BUNDLE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["way", "way_nodes", "way_tags"],
        "properties": {
            "way": {
                "type": "object",
                "required": ["id", "user", "uid", "version", "changeset", "timestamp"],
                "properties": {
                    "id": integer(),
                    "user": string(),
                    "uid": integer(),
                    "version": string(),
                    "changeset": integer(),
                    "timestamp": string()
                }
            },
            "way_nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "node_id", "position"],
                    "properties": {
                        "id": integer(),
                        "node_id": integer(),
                        "position": integer()
                    }
                }
            },
            "way_tags": tags_schema()
        }
    })
});
