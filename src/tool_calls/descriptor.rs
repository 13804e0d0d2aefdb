use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use super::argument::ToolArgument;
use crate::errors::{ToolingError, ToolingResult};

/// Name, purpose and parameters of one tool operation, as the model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// The name of the tool
    pub name: String,
    /// A description of the tool
    pub description: String,
    /// Arguments to the tool, all of them required
    pub arguments: Vec<ToolArgument>,
}

impl ToolDescriptor {
    pub fn new<N, D>(name: N, description: D, arguments: Vec<ToolArgument>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            arguments,
        }
    }

    pub fn argument_names(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|arg| arg.name.as_str())
    }

    /// Build OpenAI's strict function declaration
    pub fn render(&self) -> ToolingResult<Value> {
        let mut seen = HashSet::new();
        let mut properties = Map::new();
        for arg in &self.arguments {
            if !seen.insert(arg.name.as_str()) {
                return Err(ToolingError::DuplicateArgument(arg.name.clone()));
            }
            properties.insert(arg.name.clone(), arg.render()?);
        }
        let required: Vec<&str> = self.argument_names().collect();

        Ok(json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "strict": true,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                }
            }
        }))
    }
}
