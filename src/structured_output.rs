use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::providers::utils::sanitize_function_name;

/// A type the model's final answer is parsed into.
///
/// Implemented for every `DeserializeOwned + JsonSchema` type; derive both and
/// use doc comments or `#[schemars(description = "...")]` to describe fields.
pub trait StructuredResponse: DeserializeOwned + JsonSchema {
    /// The `response_format` object requesting output that matches `Self`
    fn response_format() -> Value {
        let mut schema = schema_for!(Self).to_value();
        make_strict(&mut schema);
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": sanitize_function_name(&Self::schema_name()),
                "schema": schema,
                "strict": true,
            }
        })
    }

    fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

impl<T: DeserializeOwned + JsonSchema> StructuredResponse for T {}

/// A simple string response from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BasicResponse {
    pub response: String,
}

/// Rewrite a generated schema into the subset strict mode accepts: every
/// object closed and every property required, no `$schema`, no numeric
/// `format` hints.
pub fn make_strict(schema: &mut Value) {
    let Some(object) = schema.as_object_mut() else {
        return;
    };
    object.remove("$schema");

    let numeric = matches!(
        object.get("type").and_then(Value::as_str),
        Some("integer" | "number")
    );
    if numeric {
        object.remove("format");
    }

    if let Some(properties) = object.get_mut("properties").and_then(Value::as_object_mut) {
        let required: Vec<String> = properties.keys().cloned().collect();
        for property in properties.values_mut() {
            make_strict(property);
        }
        object.insert("required".to_string(), json!(required));
        object.insert("additionalProperties".to_string(), json!(false));
    } else if object.get("type").and_then(Value::as_str) == Some("object") {
        object.insert("additionalProperties".to_string(), json!(false));
    }

    if let Some(items) = object.get_mut("items") {
        make_strict(items);
    }
    for key in ["$defs", "definitions"] {
        if let Some(defs) = object.get_mut(key).and_then(Value::as_object_mut) {
            defs.values_mut().for_each(make_strict);
        }
    }
    for key in ["anyOf", "oneOf", "allOf"] {
        if let Some(variants) = object.get_mut(key).and_then(Value::as_array_mut) {
            variants.iter_mut().for_each(make_strict);
        }
    }
}
