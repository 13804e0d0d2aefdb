use anyhow::Result;
use chatgpt_tooling::providers::configs::openai::OpenAiProviderConfig;
use chatgpt_tooling::providers::openai::OpenAiProvider;
use chatgpt_tooling::providers::types::message::Role;
use chatgpt_tooling::{BasicResponse, ChatGPT, Prompt, Tool, ToolArgument, ToolDescriptor};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};

fn chatgpt(server: &ServerGuard) -> Result<ChatGPT> {
    let config = OpenAiProviderConfig::new(
        "test_api_key".to_string(),
        server.url(),
        "gpt-4o-mini".to_string(),
    );
    Ok(ChatGPT::new(OpenAiProvider::new(config)?))
}

fn completion(message: Value) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 20, "completion_tokens": 10, "total_tokens": 30}
    })
    .to_string()
}

fn lookup_tool() -> Result<Tool<Vec<String>>> {
    let tool = Tool::new(Vec::new()).register(
        ToolDescriptor::new(
            "lookup_capital",
            "Look up the capital city of a country.",
            vec![ToolArgument::new("country", "The country name.", "str")],
        ),
        |lookups: &mut Vec<String>, args| {
            let country: String = args.get("country")?;
            lookups.push(country.clone());
            Ok(json!(match country.as_str() {
                "France" => "Paris",
                _ => "unknown",
            }))
        },
    )?;
    Ok(tool)
}

#[test]
fn test_structured_answer_without_tools() -> Result<()> {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "temperature": 0.0,
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "BasicResponse", "strict": true}
            }
        })))
        .with_status(200)
        .with_body(completion(json!({
            "role": "assistant",
            "content": "{\"response\":\"Paris\"}",
            "refusal": null
        })))
        .expect(1)
        .create();

    let mut prompt = Prompt::new();
    prompt.add("system", "You are a helpful assistant.")?;
    prompt.add("user", "What is the capital of France?")?;

    let response: BasicResponse = chatgpt(&server)?.ask(&mut prompt, None)?;

    mock.assert();
    assert_eq!(response.response, "Paris");
    assert_eq!(prompt.len(), 3);
    assert_eq!(prompt.last().map(|m| m.role), Some(Role::Assistant));
    Ok(())
}

#[test]
fn test_tool_round_trip() -> Result<()> {
    let mut server = Server::new();

    // The follow-up request carries the tool result, the first one does not.
    let follow_up = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex(r#""tool_call_id":"call_abc""#.to_string()))
        .with_status(200)
        .with_body(completion(json!({
            "role": "assistant",
            "content": "{\"response\":\"The capital of France is Paris.\"}"
        })))
        .expect(1)
        .create();
    let first = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({"tool_choice": "auto"})))
        .with_status(200)
        .with_body(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {"name": "lookup_capital", "arguments": "{\"country\":\"France\"}"}
            }]
        })))
        .expect(1)
        .create();

    let mut prompt = Prompt::new();
    prompt.add("user", "What is the capital of France?")?;
    let mut tool = lookup_tool()?;

    let response: BasicResponse = chatgpt(&server)?.ask(&mut prompt, Some(&mut tool))?;

    first.assert();
    follow_up.assert();
    assert_eq!(response.response, "The capital of France is Paris.");
    assert_eq!(tool.state(), &vec!["France".to_string()]);

    let messages = prompt.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].tool_calls[0].id, "call_abc");
    assert_eq!(messages[2].role, Role::Tool);
    assert_eq!(messages[2].text(), "Paris");
    Ok(())
}

#[test]
fn test_api_error_is_returned() -> Result<()> {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(json!({"error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}}).to_string())
        .create();

    let mut prompt = Prompt::new();
    prompt.add("user", "Hello?")?;

    let err = chatgpt(&server)?
        .ask::<BasicResponse>(&mut prompt, None)
        .unwrap_err();
    assert!(err.to_string().contains("401"));
    assert_eq!(prompt.len(), 1);
    Ok(())
}
