pub mod chatgpt;
pub mod errors;
pub mod prompt;
pub mod providers;
pub mod structured_output;
pub mod token_counter;
pub mod tool_calls;

pub use chatgpt::ChatGPT;
pub use errors::{ToolingError, ToolingResult};
pub use prompt::Prompt;
pub use structured_output::{BasicResponse, StructuredResponse};
pub use tool_calls::{Arguments, Dispatch, Tool, ToolArgument, ToolDescriptor};
