//! Recursive JSON-Schema sanitiser (component A): strips keywords the upstream rejects
//! from a client-supplied tool `input_schema` before it is forwarded as a
//! `functionDeclarations[].parameters` value.

use serde_json::{Map, Value};

/// Keywords removed wherever they appear as object keys, at any nesting depth.
const REJECTED_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$ref",
    "definitions",
    "title",
    "examples",
    "default",
    "readOnly",
    "writeOnly",
    "additionalProperties",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "pattern",
    "format",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "patternProperties",
    "dependencies",
    "contentMediaType",
    "contentEncoding",
    "const",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
];

/// Strip every rejected keyword from `schema` at every nesting depth. Total: never
/// fails, never panics, whatever shape `schema` is.
pub fn sanitize(schema: &Value) -> Value {
    match schema {
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Object(object) => sanitize_object(object),
        other => other.clone(),
    }
}

fn sanitize_object(object: &Map<String, Value>) -> Value {
    let mut out = Map::with_capacity(object.len());

    for (key, value) in object {
        if REJECTED_KEYWORDS.contains(&key.as_str()) {
            continue;
        }

        let value = match value {
            Value::Object(_) | Value::Array(_) => sanitize(value),
            other => other.clone(),
        };
        out.insert(key.clone(), value);
    }

    restrict_required_to_properties(&mut out);
    Value::Object(out)
}

/// After stripping, `required` may list names whose `properties` entry was itself
/// dropped only in pathological input (a client declaring a name both required and
/// absent from `properties`); trim the list down to names still declared, and drop it
/// entirely if that leaves it empty.
fn restrict_required_to_properties(object: &mut Map<String, Value>) {
    let Some(properties) = object.get("properties").and_then(Value::as_object).cloned() else {
        return;
    };

    let Some(Value::Array(required)) = object.get("required") else {
        return;
    };

    let restricted: Vec<Value> = required
        .iter()
        .filter(|name| name.as_str().is_some_and(|name| properties.contains_key(name)))
        .cloned()
        .collect();

    if restricted.is_empty() {
        object.remove("required");
    } else {
        object.insert("required".to_string(), Value::Array(restricted));
    }
}

/// Walk `schema` and report whether any rejected keyword survived sanitisation. Used by
/// tests, never to reject a request.
pub fn has_rejected_keywords(schema: &Value) -> bool {
    match schema {
        Value::Object(object) => {
            object.keys().any(|key| REJECTED_KEYWORDS.contains(&key.as_str()))
                || object.values().any(has_rejected_keywords)
        }
        Value::Array(items) => items.iter().any(has_rejected_keywords),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn s1_round_trip_sanitiser() {
        let input = json!({
            "type": "object",
            "properties": {
                "q": {"type": "string", "pattern": "^x$", "minLength": 1}
            },
            "required": ["q"],
            "additionalProperties": false,
            "$schema": "http://x",
        });

        let expected = json!({
            "type": "object",
            "properties": {
                "q": {"type": "string"}
            },
            "required": ["q"],
        });

        assert_eq!(sanitize(&input), expected);
    }

    #[test]
    fn sanitiser_is_idempotent() {
        let input = json!({
            "type": "object",
            "properties": {
                "tags": {
                    "type": "array",
                    "items": {"type": "string", "format": "uri"},
                    "uniqueItems": true,
                }
            },
            "anyOf": [{"type": "object"}],
        });

        let once = sanitize(&input);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn recurses_into_nested_properties_and_items() {
        let input = json!({
            "type": "object",
            "properties": {
                "addr": {
                    "type": "object",
                    "properties": {
                        "zip": {"type": "string", "pattern": "^[0-9]{5}$"}
                    }
                },
                "tags": {"type": "array", "items": {"type": "string", "minLength": 2}}
            }
        });

        let output = sanitize(&input);
        assert!(!has_rejected_keywords(&output));
    }

    #[test]
    fn drops_required_names_no_longer_in_properties() {
        let input = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a", "ghost"],
        });

        let output = sanitize(&input);
        assert_eq!(output["required"], json!(["a"]));
    }

    #[test]
    fn drops_required_entirely_when_it_becomes_empty() {
        let input = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["ghost"],
        });

        let output = sanitize(&input);
        assert!(output.get("required").is_none());
    }

    #[test]
    fn non_object_non_array_input_is_returned_unchanged() {
        assert_eq!(sanitize(&json!("just a string")), json!("just a string"));
        assert_eq!(sanitize(&json!(42)), json!(42));
    }
}
