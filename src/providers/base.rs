use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// One chat-completion round trip
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub messages: &'a [Message],
    /// Already rendered `response_format` object
    pub response_format: &'a Value,
    /// Already rendered tool descriptors, empty when no tool is offered
    pub tools: &'a [Value],
    pub temperature: f32,
}

/// Base trait for chat-completion backends
pub trait Provider {
    /// Create a provider instance from environment variables
    fn from_env() -> Result<Self>
    where
        Self: Sized;

    /// Generate the next assistant message for the transcript. Blocks until the
    /// remote service answers.
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<(Message, Usage)>;
}
