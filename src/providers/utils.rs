use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};

use super::types::message::{Message, Role, ToolCall};
use crate::errors::ToolingError;

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages.iter().map(message_to_openai_spec).collect()
}

fn message_to_openai_spec(message: &Message) -> Value {
    let mut converted = json!({
        "role": message.role
    });

    if let Some(content) = &message.content {
        converted["content"] = json!(content);
    }

    if !message.tool_calls.is_empty() {
        let tool_calls: Vec<Value> = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments,
                    }
                })
            })
            .collect();
        converted["tool_calls"] = json!(tool_calls);
    }

    if let Some(id) = &message.tool_call_id {
        converted["tool_call_id"] = json!(id);
    }
    if let Some(name) = &message.name {
        converted["name"] = json!(name);
    }

    converted
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("No message in response: {}", response))?;

    if let Some(refusal) = original.get("refusal").and_then(|r| r.as_str()) {
        return Err(ToolingError::Refusal(refusal.to_string()).into());
    }

    let content = original
        .get("content")
        .and_then(|c| c.as_str())
        .map(str::to_string);

    let mut tool_calls = Vec::new();
    if let Some(tool_calls_array) = original.get("tool_calls").and_then(|t| t.as_array()) {
        for tool_call in tool_calls_array {
            let id = tool_call["id"].as_str().unwrap_or_default();
            let function_name = tool_call["function"]["name"].as_str().unwrap_or_default();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();
            tool_calls.push(ToolCall::new(id, function_name, arguments));
        }
    }

    if tool_calls.is_empty() {
        let content = content.ok_or_else(|| anyhow!("Response has neither content nor tool calls"))?;
        return Ok(Message::new(Role::Assistant, &content));
    }

    Ok(Message::assistant_tool_calls(content, tool_calls))
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

pub fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

pub fn check_openai_context_length_error(error: &Value) -> Option<ToolingError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ToolingError::ContextLengthExceeded(message))
    } else {
        None
    }
}
