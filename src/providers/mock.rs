use anyhow::{anyhow, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

use super::base::{CompletionRequest, Provider, Usage};
use super::types::message::Message;

/// What the mock saw on one `complete` call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<Value>,
    pub response_format: Value,
    pub temperature: f32,
}

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: RefCell<VecDeque<Result<Message>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<Message>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl Provider for MockProvider {
    fn from_env() -> Result<Self> {
        Ok(Self::new(Vec::new()))
    }

    fn complete(&self, request: &CompletionRequest<'_>) -> Result<(Message, Usage)> {
        self.requests.borrow_mut().push(RecordedRequest {
            messages: request.messages.to_vec(),
            tools: request.tools.to_vec(),
            response_format: request.response_format.clone(),
            temperature: request.temperature,
        });

        let next = self
            .responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("MockProvider ran out of responses"))?;
        next.map(|message| (message, Usage::default()))
    }
}
