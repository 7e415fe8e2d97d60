//! Strict JSON schema generation for structured output.

use schemars::JsonSchema;

/// Generate the schema for `T` in the form strict structured output accepts:
/// no `$schema` key and `additionalProperties: false` on every object.
pub fn strict_schema_for<T: JsonSchema + ?Sized>() -> serde_json::Value {
    let mut value = schemars::schema_for!(T).to_value();
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
    }
    add_additional_properties_false(&mut value);
    value
}

/// Recursively set `additionalProperties: false` on every object schema.
pub fn add_additional_properties_false(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            let is_object_schema = map.get("type").and_then(|t| t.as_str()) == Some("object")
                || map.contains_key("properties");
            if is_object_schema {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
            }
            for (key, child) in map.iter_mut() {
                if key != "additionalProperties" {
                    add_additional_properties_false(child);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                add_additional_properties_false(item);
            }
        }
        _ => {}
    }
}
