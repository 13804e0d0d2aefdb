use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ToolingError, ToolingResult};
use crate::providers::types::message::{Message, Role};
use crate::providers::utils::messages_to_openai_spec;
use crate::token_counter::TokenCounter;

/// The whole conversation passed to the model. Replies and tool results are
/// appended to it in place by [`crate::ChatGPT::ask`].
///
/// ```
/// use chatgpt_tooling::Prompt;
///
/// let mut prompt = Prompt::new();
/// prompt.add("system", "You are a helpful assistant.").unwrap();
/// prompt.add("user", "What is the capital of France?").unwrap();
/// assert_eq!(prompt.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    messages: Vec<Message>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. `role` must be one of system, assistant, user,
    /// function or tool.
    pub fn add(&mut self, role: &str, content: &str) -> ToolingResult<()> {
        let role: Role = role.parse()?;
        self.messages.push(Message::new(role, content));
        Ok(())
    }

    /// Like [`Prompt::add`] for untyped content; only JSON strings are accepted.
    pub fn add_json(&mut self, role: &str, content: &Value) -> ToolingResult<()> {
        let role: Role = role.parse()?;
        let content = content.as_str().ok_or(ToolingError::TypeMismatch {
            expected: "string",
            found: json_type_name(content),
        })?;
        self.messages.push(Message::new(role, content));
        Ok(())
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a tool result. The messages before it must be the assistant
    /// message declaring `tool_call_id`, possibly followed by its other results.
    pub fn push_tool_result(
        &mut self,
        tool_call_id: &str,
        function_name: &str,
        content: &str,
    ) -> ToolingResult<()> {
        let requester = self
            .messages
            .iter()
            .rev()
            .find(|message| message.role != Role::Tool);
        match requester {
            Some(message) if message.declares_tool_call(tool_call_id) => {
                self.messages
                    .push(Message::tool_result(tool_call_id, function_name, content));
                Ok(())
            }
            _ => Err(ToolingError::OrphanToolResult(tool_call_id.to_string())),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tokens in the transcript as it is sent on the wire. Not used by the
    /// model calls, just here in case you need it.
    pub fn count_tokens(&self, counter: &TokenCounter) -> Result<usize> {
        let text = serde_json::to_string(&messages_to_openai_spec(&self.messages))?;
        counter.count_tokens(&text)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::message::ToolCall;
    use crate::token_counter::tests::WORD_TOKENIZER;
    use serde_json::json;

    #[test]
    fn test_add_valid_roles() -> ToolingResult<()> {
        let mut prompt = Prompt::new();
        let roles = ["system", "assistant", "user", "function", "tool"];
        for (i, role) in roles.iter().enumerate() {
            prompt.add(role, &format!("message {}", i))?;
            assert_eq!(prompt.len(), i + 1);
            let last = prompt.last().unwrap();
            assert_eq!(last.role.as_str(), *role);
            assert_eq!(last.text(), format!("message {}", i));
        }
        Ok(())
    }

    #[test]
    fn test_add_invalid_role() {
        let mut prompt = Prompt::new();
        prompt.add("user", "hi").unwrap();
        for role in ["robot", "", "User", "developer"] {
            assert_eq!(
                prompt.add(role, "hello"),
                Err(ToolingError::InvalidRole(role.to_string()))
            );
        }
        assert_eq!(prompt.len(), 1);
    }

    #[test]
    fn test_add_json() {
        let mut prompt = Prompt::new();
        assert!(prompt.add_json("user", &json!("hello")).is_ok());
        assert_eq!(
            prompt.add_json("user", &json!(42)),
            Err(ToolingError::TypeMismatch {
                expected: "string",
                found: "number"
            })
        );
        assert!(matches!(
            prompt.add_json("user", &json!(["a"])),
            Err(ToolingError::TypeMismatch { found: "array", .. })
        ));
        assert!(matches!(
            prompt.add_json("nobody", &json!("hi")),
            Err(ToolingError::InvalidRole(_))
        ));
        assert_eq!(prompt.len(), 1);
    }

    #[test]
    fn test_push_tool_result_follows_declaring_message() -> ToolingResult<()> {
        let mut prompt = Prompt::new();
        prompt.add("user", "flip twice")?;
        prompt.push(Message::assistant_tool_calls(
            None,
            vec![
                ToolCall::new("a", "flip_coin", "{}"),
                ToolCall::new("b", "flip_coin", "{}"),
            ],
        ));
        prompt.push_tool_result("a", "flip_coin", "heads")?;
        prompt.push_tool_result("b", "flip_coin", "tails")?;
        assert_eq!(prompt.len(), 4);
        assert_eq!(prompt.messages()[3].tool_call_id.as_deref(), Some("b"));

        assert_eq!(
            prompt.push_tool_result("c", "flip_coin", "heads"),
            Err(ToolingError::OrphanToolResult("c".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_push_tool_result_without_request() {
        let mut prompt = Prompt::new();
        assert!(prompt.push_tool_result("a", "f", "x").is_err());
        prompt.add("user", "hi").unwrap();
        assert!(prompt.push_tool_result("a", "f", "x").is_err());
        assert_eq!(prompt.len(), 1);
    }

    #[test]
    fn test_serialization() -> anyhow::Result<()> {
        let mut prompt = Prompt::new();
        prompt.add("system", "You are a helpful assistant.")?;
        prompt.add("user", "Hello")?;

        let serialized = serde_json::to_string(&prompt)?;
        let deserialized: Prompt = serde_json::from_str(&serialized)?;
        assert_eq!(prompt, deserialized);
        Ok(())
    }

    #[test]
    fn test_count_tokens() -> anyhow::Result<()> {
        let counter = TokenCounter::from_bytes(WORD_TOKENIZER)?;
        let mut prompt = Prompt::new();
        assert_eq!(prompt.count_tokens(&counter)?, 1);

        // [{"  content  ":"  hello  ","  role  ":"  user  "}]
        prompt.add("user", "hello")?;
        assert_eq!(prompt.count_tokens(&counter)?, 9);
        Ok(())
    }
}
