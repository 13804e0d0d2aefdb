use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{ToolingError, ToolingResult};

/// One named parameter of a tool operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolArgument {
    /// The name of the argument
    pub name: String,
    /// A description of the argument
    pub description: String,
    /// Declared type, e.g. `str`, `int`, `float`, `list[str]`
    #[serde(rename = "type")]
    pub type_name: String,
    /// Optional allowed values, e.g. `["yes", "no"]`
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

impl ToolArgument {
    pub fn new<N, D, T>(name: N, description: D, type_name: T) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            type_name: type_name.into(),
            allowed_values: None,
        }
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn render(&self) -> ToolingResult<Value> {
        if self.type_name.contains("dict") {
            return Err(ToolingError::UnsupportedType(self.type_name.clone()));
        }
        if self.type_name.contains("list") {
            return self.render_list_type();
        }

        let mut rendered = json!({
            "type": to_schema_type(&self.type_name),
            "description": self.description,
        });
        if let Some(values) = self.enum_values() {
            rendered["enum"] = json!(values);
        }
        Ok(rendered)
    }

    /// `type_name` is `list[<subtype>]`. Only the first bracket pair is looked
    /// at, so nested generics come out with a garbled item type.
    fn render_list_type(&self) -> ToolingResult<Value> {
        let open = self.type_name.find('[');
        let close = self.type_name.find(']');
        let subtype = match (open, close) {
            (Some(open), Some(close)) if open < close => &self.type_name[open + 1..close],
            _ => return Err(ToolingError::MalformedType(self.type_name.clone())),
        };

        let mut items = json!({ "type": to_schema_type(subtype) });
        if let Some(values) = self.enum_values() {
            items["enum"] = json!(values);
        }
        Ok(json!({
            "type": "array",
            "description": self.description,
            "items": items,
        }))
    }

    fn enum_values(&self) -> Option<&[String]> {
        self.allowed_values
            .as_deref()
            .filter(|values| !values.is_empty())
    }
}

/// Unknown names pass through unchanged.
fn to_schema_type(type_name: &str) -> &str {
    match type_name {
        "int" => "integer",
        "float" => "number",
        "str" => "string",
        "bool" => "boolean",
        other => other,
    }
}
