use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{CompletionRequest, Provider, Usage};
use super::configs::base::ProviderConfig;
use super::configs::openai::OpenAiProviderConfig;
use super::types::message::Message;
use super::utils::{
    check_openai_context_length_error, messages_to_openai_spec, openai_response_to_message,
};

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn get_usage(data: &Value) -> Usage {
        let Some(usage) = data.get("usage") else {
            return Usage::default();
        };

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    fn build_payload(&self, request: &CompletionRequest<'_>) -> Value {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(request.messages),
            "response_format": request.response_format,
            "temperature": request.temperature,
        });

        if !request.tools.is_empty() {
            if let Some(object) = payload.as_object_mut() {
                object.insert("tools".to_string(), json!(request.tools));
                object.insert("tool_choice".to_string(), json!("auto"));
            }
        }

        payload
    }

    fn post(&self, payload: &Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()?;

        match response.status() {
            StatusCode::OK => Ok(response.json()?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                // error bodies carry the API's explanation, keep it when it parses
                let body: Value = response.json().unwrap_or(Value::Null);
                if let Some(error) = body.get("error") {
                    if let Some(err) = check_openai_context_length_error(error) {
                        return Err(err.into());
                    }
                    return Err(anyhow!("Request failed: {}\nError: {}", status, error));
                }
                Err(anyhow!("Request failed: {}", status))
            }
        }
    }
}

impl Provider for OpenAiProvider {
    fn from_env() -> Result<Self> {
        let config = OpenAiProviderConfig::from_env()?;
        Self::new(config)
    }

    fn complete(&self, request: &CompletionRequest<'_>) -> Result<(Message, Usage)> {
        let payload = self.build_payload(request);
        tracing::debug!(model = %self.config.model, tools = request.tools.len(), "requesting chat completion");

        let response = self.post(&payload)?;

        // Raise specific error if context length is exceeded
        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        let message = openai_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}
