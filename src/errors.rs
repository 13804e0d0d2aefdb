use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolingError {
    #[error("Invalid role: {0}, must be one of system, assistant, user, function, tool")]
    InvalidRole(String),

    #[error("Invalid content: expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unsupported argument type: {0}, dict types are not supported")]
    UnsupportedType(String),

    #[error("Malformed argument type: {0}")]
    MalformedType(String),

    #[error("Duplicate argument name: {0}")]
    DuplicateArgument(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool name '{0}', it must match [a-zA-Z0-9_-]+")]
    InvalidToolName(String),

    #[error("Tool result for call {0} does not follow an assistant message declaring it")]
    OrphanToolResult(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Input message too long. Message: {0}")]
    ContextLengthExceeded(String),

    #[error("Model refused to answer: {0}")]
    Refusal(String),

    #[error("Depth limit reached: more than {0} rounds of tool calls")]
    DepthExceeded(usize),
}

pub type ToolingResult<T> = Result<T, ToolingError>;
