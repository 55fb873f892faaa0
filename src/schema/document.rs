use crate::melt::types::Bundle;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Columns checked as integers
const INTEGER_COLUMNS: [&str; 5] = ["id", "uid", "changeset", "node_id", "position"];

/// Columns checked as floating-point numbers
const NUMBER_COLUMNS: [&str; 2] = ["lat", "lon"];

/// Render a bundle as the JSON document its schema describes
///
/// Numeric columns are coerced from their text when it parses; anything
/// that does not parse stays a string, and missing values become `null`,
/// so both are reported by validation rather than here.
pub fn bundle_document(bundle: &Bundle) -> serde_json::Result<Value> {
    let document = match bundle {
        Bundle::Node(b) => json!({
            "node": row(&b.node)?,
            "node_tags": rows(&b.tags)?,
        }),
        Bundle::Way(b) => json!({
            "way": row(&b.way)?,
            "way_nodes": rows(&b.nodes)?,
            "way_tags": rows(&b.tags)?,
        }),
    };
    Ok(document)
}

fn rows<T: Serialize>(records: &[T]) -> serde_json::Result<Value> {
    records
        .iter()
        .map(row)
        .collect::<serde_json::Result<Vec<_>>>()
        .map(Value::Array)
}

fn row<T: Serialize>(record: &T) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(ref mut fields) = value {
        coerce_fields(fields);
    }
    Ok(value)
}

fn coerce_fields(fields: &mut Map<String, Value>) {
    for (column, field) in fields.iter_mut() {
        let Value::String(text) = field else {
            continue;
        };

        if INTEGER_COLUMNS.contains(&column.as_str()) {
            if let Ok(n) = text.parse::<i64>() {
                *field = Value::from(n);
            }
        } else if NUMBER_COLUMNS.contains(&column.as_str()) {
            if let Some(n) = text.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                *field = Value::Number(n);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::types::{Node, NodeBundle, TagRecord, Way, WayBundle, WayNode};

    #[test]
    fn test_node_document_coerces_numbers() {
        let bundle = Bundle::Node(NodeBundle {
            node: Node {
                id: Some("42".into()),
                lat: Some("3.25".into()),
                lon: Some("101.5".into()),
                user: Some("alice".into()),
                uid: Some("7".into()),
                version: Some("2".into()),
                changeset: Some("x1".into()),
                timestamp: None,
            },
            tags: vec![TagRecord {
                id: Some("42".into()),
                key: "name".into(),
                value: Some("123".into()),
                tag_type: "regular".into(),
            }],
        });

        let document = bundle_document(&bundle).unwrap();

        assert_eq!(document["node"]["id"], json!(42));
        assert_eq!(document["node"]["lat"], json!(3.25));
        assert_eq!(document["node"]["uid"], json!(7));
        // version is a string column even when numeric
        assert_eq!(document["node"]["version"], json!("2"));
        assert_eq!(document["node"]["changeset"], json!("x1"));
        assert_eq!(document["node"]["timestamp"], Value::Null);
        assert_eq!(document["node_tags"][0]["id"], json!(42));
        assert_eq!(document["node_tags"][0]["value"], json!("123"));
        assert_eq!(document["node_tags"][0]["type"], json!("regular"));
    }

    #[test]
    fn test_way_document_layout() {
        let bundle = Bundle::Way(WayBundle {
            way: Way {
                id: Some("5".into()),
                ..Way::default()
            },
            nodes: vec![WayNode { id: Some("5".into()), node_id: Some("9".into()), position: 0 }],
            tags: vec![],
        });

        let document = bundle_document(&bundle).unwrap();

        assert_eq!(document["way"]["id"], json!(5));
        assert_eq!(document["way_nodes"], json!([{"id": 5, "node_id": 9, "position": 0}]));
        assert_eq!(document["way_tags"], json!([]));
    }
}
