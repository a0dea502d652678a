//! Ollama Chat API with tool calling support
//!
//! This module provides a client for Ollama's `/api/chat` endpoint,
//! which supports tool/function calling for agentic workflows.

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// A message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "system", "user", "assistant", "tool"
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::with_role("tool", content)
    }

    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }
}

/// A tool call from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

/// Function call details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Tool definition for the model
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // Always "function"
    pub function: FunctionDefinition,
}

/// Function specification for a tool
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value, // JSON Schema
}

/// Response from /api/chat
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub done: bool,
    #[serde(default)]
    pub eval_count: u32,
    #[serde(default)]
    pub eval_duration: u64,
}

/// Error type for chat operations
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Ollama returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Empty response from Ollama")]
    EmptyResponse,
}

impl ChatError {
    /// Whether the model refused the request because it has no tool template.
    pub fn is_tools_unsupported(&self) -> bool {
        matches!(self, ChatError::Api { message, .. } if message.contains("does not support tools"))
    }
}

/// Everything needed for one chat completion.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub temperature: f32,
}

/// Something that can answer a chat request.
///
/// The agent loop only sees this trait, so the HTTP client can be swapped
/// for a scripted backend in tests.
pub trait ChatBackend: Send + Sync {
    fn chat<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, Result<ChatResponse, ChatError>>;
}

/// Client for Ollama's /api/chat endpoint with tool support
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Ollama server (e.g., "http://localhost:11434")
    /// * `timeout` - Upper bound for a single request, including model load
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Send a chat request with optional tools
    ///
    /// # Returns
    /// ChatResponse containing the model's reply and any tool calls
    pub async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let endpoint = format!("{}/api/chat", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": false,
            "options": {
                "temperature": request.temperature
            }
        });

        if let Some(tools) = request.tools {
            body["tools"] = serde_json::to_value(tools)?;
        }

        let response = self.client.post(&endpoint).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        if text.is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        let chat_response: ChatResponse = serde_json::from_str(&text)?;
        Ok(chat_response)
    }
}

impl ChatBackend for ChatClient {
    fn chat<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, Result<ChatResponse, ChatError>> {
        Box::pin(self.send(request))
    }
}

/// Pull the `error` field out of an Ollama error body, falling back to the raw text.
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Try to parse tool calls from the response content text
///
/// This handles models that output tool calls as JSON in the text
/// instead of using the native tool_calls field.
pub fn parse_tool_calls_from_text(content: &str) -> Vec<ToolCall> {
    let mut tool_calls = Vec::new();

    let content = content.trim();

    // Try parsing the entire content as a tool call
    if let Some(tool_call) = try_parse_tool_call(content) {
        tool_calls.push(tool_call);
        return tool_calls;
    }

    // Look for balanced {...} spans that might be tool calls
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in content.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        if let Some(tool_call) = try_parse_tool_call(&content[s..=i]) {
                            tool_calls.push(tool_call);
                        }
                    }
                    start = None;
                }
            }
            _ => {}
        }
    }

    tool_calls
}

/// Try to parse a single tool call from a JSON string
fn try_parse_tool_call(json_str: &str) -> Option<ToolCall> {
    let value = serde_json::from_str::<serde_json::Value>(json_str).ok()?;
    parse_tool_call_from_value(&value)
}

/// Parse a tool call from a JSON Value
fn parse_tool_call_from_value(value: &serde_json::Value) -> Option<ToolCall> {
    // Some models wrap the call: {"function": {"name": ..., "arguments": ...}}
    let value = value.get("function").filter(|f| f.is_object()).unwrap_or(value);

    // Expected format: {"name": "...", "arguments": {...}}
    let name = value.get("name").and_then(|n| n.as_str())?;

    // Some models use "parameters" instead of "arguments", and some
    // send the arguments as a JSON-encoded string
    let arguments = value.get("arguments").or_else(|| value.get("parameters"))?;
    let arguments = match arguments {
        serde_json::Value::String(s) => serde_json::from_str(s).ok()?,
        other => other.clone(),
    };

    Some(ToolCall {
        function: FunctionCall {
            name: name.to_string(),
            arguments,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_tool_call() {
        let calls = parse_tool_calls_from_text(
            r#"{"name": "calculator", "arguments": {"operation": "sum", "a": 2, "b": 3}}"#,
        );
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "calculator");
        assert_eq!(calls[0].function.arguments["a"], 2);
    }

    #[test]
    fn test_parse_tool_call_embedded_in_prose() {
        let text = r#"I will ask the analyst.
{"name": "analyst", "parameters": {"query": "23.5 * 17.8"}}
Then I will answer."#;
        let calls = parse_tool_calls_from_text(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "analyst");
        assert_eq!(calls[0].function.arguments["query"], "23.5 * 17.8");
    }

    #[test]
    fn test_parse_stringified_arguments() {
        let calls = parse_tool_calls_from_text(
            r#"{"function": {"name": "web_search", "arguments": "{\"query\": \"ollama\"}"}}"#,
        );
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.arguments["query"], "ollama");
    }

    #[test]
    fn test_plain_text_has_no_tool_calls() {
        assert!(parse_tool_calls_from_text("Python is a programming language.").is_empty());
        assert!(parse_tool_calls_from_text("a } stray { brace").is_empty());
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"error":"registry.ollama.ai/library/phi does not support tools"}"#),
            "registry.ollama.ai/library/phi does not support tools"
        );
        assert_eq!(api_error_message("bad gateway\n"), "bad gateway");
    }

    #[test]
    fn test_tools_unsupported_detection() {
        let err = ChatError::Api {
            status: 400,
            message: "phi does not support tools".to_string(),
        };
        assert!(err.is_tools_unsupported());
        assert!(!ChatError::EmptyResponse.is_tools_unsupported());
    }
}
