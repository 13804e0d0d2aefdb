use anyhow::{anyhow, Result};

use crate::errors::ToolingError;
use crate::prompt::Prompt;
use crate::providers::base::{CompletionRequest, Provider};
use crate::providers::openai::OpenAiProvider;
use crate::structured_output::StructuredResponse;
use crate::tool_calls::Dispatch;

/// Rounds of tool calls allowed in one `ask` before giving up
pub const MAX_DEPTH: usize = 10;

const TEMPERATURE: f32 = 0.0;

/// Chat completion with structured output and, optionally, tool calls.
pub struct ChatGPT<P = OpenAiProvider> {
    provider: P,
    max_depth: usize,
}

impl ChatGPT<OpenAiProvider> {
    /// OpenAI provider configured from `OPENAI_API_KEY`, `OPENAI_API_HOST` and
    /// `OPENAI_MODEL`. Fails when the key is missing.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(OpenAiProvider::from_env()?))
    }
}

impl<P: Provider> ChatGPT<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Send the prompt and run any tool calls the model asks for.
    ///
    /// If tool calls are run, the model is asked again with their results, so
    /// it can chain operations. This repeats until the model answers without
    /// tool calls or `max_depth` rounds have passed. Every assistant message
    /// and tool result is appended to `prompt`.
    pub fn ask<R: StructuredResponse>(
        &self,
        prompt: &mut Prompt,
        mut tool: Option<&mut dyn Dispatch>,
    ) -> Result<R> {
        let response_format = R::response_format();
        let tools = match tool.as_deref() {
            Some(tool) => tool.render_tool_descriptors()?,
            None => Vec::new(),
        };

        for depth in 0..self.max_depth {
            tracing::debug!(depth, "asking:");
            for message in prompt.messages() {
                tracing::debug!("  - {}", message.summary());
            }

            let request = CompletionRequest {
                messages: prompt.messages(),
                response_format: &response_format,
                tools: &tools,
                temperature: TEMPERATURE,
            };
            let (message, usage) = match self.provider.complete(&request) {
                Ok(reply) => reply,
                Err(e) => {
                    log_transcript(prompt, &e);
                    return Err(e);
                }
            };
            tracing::debug!(depth, ?usage, "response: {}", message.summary());

            if !message.has_tool_calls() {
                let parsed = match R::parse(message.text()) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        let e = anyhow!(e).context(format!(
                            "Response does not match the requested format: {}",
                            message.text()
                        ));
                        log_transcript(prompt, &e);
                        return Err(e);
                    }
                };
                prompt.push(message);
                return Ok(parsed);
            }

            // Tool results must immediately follow the message declaring the calls
            let tool_calls = message.tool_calls.clone();
            prompt.push(message);
            for call in &tool_calls {
                let output = match (&mut tool, call.parsed_arguments()) {
                    (Some(tool), Ok(arguments)) => tool.call(&call.name, &arguments),
                    (Some(_), Err(e)) => format!(
                        "Could not interpret arguments for {}: {} ({})",
                        call.name, call.arguments, e
                    ),
                    (None, _) => format!("No tools are available, {} cannot be called", call.name),
                };
                prompt.push_tool_result(&call.id, &call.name, &output)?;
            }
        }

        Err(ToolingError::DepthExceeded(self.max_depth).into())
    }
}

fn log_transcript(prompt: &Prompt, error: &anyhow::Error) {
    tracing::error!("chat completion failed: {:#}", error);
    tracing::error!("here are the messages that led to the error:");
    for message in prompt.messages() {
        tracing::error!("  - {:?}", message);
    }
}
