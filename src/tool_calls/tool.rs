use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::{self, Debug};

use super::descriptor::ToolDescriptor;
use crate::errors::{ToolingError, ToolingResult};
use crate::providers::utils::is_valid_function_name;

/// What the orchestrator needs from a tool: its declarations and a way to run
/// a call by name.
pub trait Dispatch {
    /// Render every operation to the API's tool format, in registration order
    fn render_tool_descriptors(&self) -> ToolingResult<Vec<Value>>;

    /// Run `function_name` and return its textual result. Never fails: errors
    /// come back as text for the model to read.
    fn call(&mut self, function_name: &str, arguments: &Value) -> String;
}

/// Named arguments of a single call, already checked against the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .0
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("missing argument '{}'", name))?;
        serde_json::from_value(value.clone())
            .map_err(|e| anyhow::anyhow!("argument '{}' has the wrong type: {}", name, e))
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

type Handler<S> = Box<dyn Fn(&mut S, &Arguments) -> anyhow::Result<Value>>;

struct Operation<S> {
    descriptor: ToolDescriptor,
    handler: Handler<S>,
}

/// A bundle of operations over shared state `S`.
///
/// ```
/// use chatgpt_tooling::{Tool, ToolArgument, ToolDescriptor};
/// use serde_json::json;
///
/// let mut tool = Tool::new(0_i64)
///     .register(
///         ToolDescriptor::new(
///             "add",
///             "Add to the running total",
///             vec![ToolArgument::new("amount", "How much to add", "int")],
///         ),
///         |total, args| {
///             *total += args.get::<i64>("amount")?;
///             Ok(json!(*total))
///         },
///     )
///     .unwrap();
///
/// assert_eq!(tool.call("add", &json!({"amount": 2})), "2");
/// assert_eq!(*tool.state(), 2);
/// ```
pub struct Tool<S = ()> {
    state: S,
    operations: Vec<Operation<S>>,
    sanitize_brackets: bool,
}

impl<S> Tool<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            operations: Vec::new(),
            sanitize_brackets: true,
        }
    }

    /// Add an operation. Fails if the name is taken, is not a valid function
    /// name, or the descriptor does not render.
    pub fn register<F>(mut self, descriptor: ToolDescriptor, handler: F) -> ToolingResult<Self>
    where
        F: Fn(&mut S, &Arguments) -> anyhow::Result<Value> + 'static,
    {
        if !is_valid_function_name(&descriptor.name) {
            return Err(ToolingError::InvalidToolName(descriptor.name));
        }
        if self.find(&descriptor.name).is_some() {
            return Err(ToolingError::DuplicateTool(descriptor.name));
        }
        descriptor.render()?;

        self.operations.push(Operation {
            descriptor,
            handler: Box::new(handler),
        });
        Ok(self)
    }

    /// Square brackets in results are swapped for parentheses unless disabled.
    pub fn with_bracket_sanitizing(mut self, enabled: bool) -> Self {
        self.sanitize_brackets = enabled;
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.operations.iter().map(|op| &op.descriptor)
    }

    pub fn render_tool_descriptors(&self) -> ToolingResult<Vec<Value>> {
        self.descriptors().map(ToolDescriptor::render).collect()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.operations
            .iter()
            .position(|op| op.descriptor.name == name)
    }

    /// Run an operation, reporting failures as typed errors.
    pub fn dispatch(&mut self, function_name: &str, arguments: &Value) -> ToolingResult<Value> {
        let index = self
            .find(function_name)
            .ok_or_else(|| ToolingError::ToolNotFound(function_name.to_string()))?;
        let operation = &self.operations[index];
        let arguments = check_arguments(&operation.descriptor, arguments)?;

        (operation.handler)(&mut self.state, &arguments).map_err(|e| {
            tracing::error!("{} failed: {:?}", function_name, e);
            ToolingError::ExecutionError(format!("{:#}", e))
        })
    }

    pub fn call(&mut self, function_name: &str, arguments: &Value) -> String {
        tracing::debug!("calling {} with {}", function_name, arguments);
        match self.dispatch(function_name, arguments) {
            Ok(value) => {
                let output = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                if self.sanitize_brackets {
                    output.replace('[', "(").replace(']', ")")
                } else {
                    output
                }
            }
            Err(ToolingError::ExecutionError(message)) => message,
            Err(err) => {
                tracing::error!("{} could not be called: {}", function_name, err);
                err.to_string()
            }
        }
    }
}

fn check_arguments(descriptor: &ToolDescriptor, arguments: &Value) -> ToolingResult<Arguments> {
    let object = arguments.as_object().ok_or_else(|| {
        ToolingError::InvalidParameters(format!(
            "arguments to {} must be a JSON object, got {}",
            descriptor.name, arguments
        ))
    })?;

    if let Some(missing) = descriptor
        .argument_names()
        .find(|name| !object.contains_key(*name))
    {
        return Err(ToolingError::InvalidParameters(format!(
            "{} is missing argument '{}'",
            descriptor.name, missing
        )));
    }
    if let Some(unexpected) = object
        .keys()
        .find(|key| !descriptor.argument_names().any(|name| name == key.as_str()))
    {
        return Err(ToolingError::InvalidParameters(format!(
            "{} got an unexpected argument '{}'",
            descriptor.name, unexpected
        )));
    }

    Ok(Arguments(object.clone()))
}

impl<S> Dispatch for Tool<S> {
    fn render_tool_descriptors(&self) -> ToolingResult<Vec<Value>> {
        Tool::<S>::render_tool_descriptors(self)
    }

    fn call(&mut self, function_name: &str, arguments: &Value) -> String {
        Tool::<S>::call(self, function_name, arguments)
    }
}

impl<S: Debug> Debug for Tool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("state", &self.state)
            .field(
                "operations",
                &self.descriptors().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            )
            .field("sanitize_brackets", &self.sanitize_brackets)
            .finish()
    }
}
