use std::fmt;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::{Map, Value};

use crate::chat::message::ChatMessage;
use crate::chat::tools::{ToolCall, ToolDefinition, parse_tool_calls};

/// Default Ollama host.
pub const DEFAULT_HOST: &str = "http://localhost:11434";
/// Default model identifier, passed through to the server unchanged.
pub const DEFAULT_MODEL: &str = "qwen3:4b";

/// Blocking Ollama chat client.
///
/// Issues exactly one `POST {host}/api/chat` per invocation. There are no
/// retries and no response-shape validation beyond deserialization; failures
/// surface as [`ChatError`] and are left to the caller.
#[derive(Debug, Clone)]
pub struct ChatClient {
    host: String,
    model: String,
    client: Client,
    tools: Option<Vec<ToolDefinition>>,
}

impl ChatClient {
    /// Creates a client bound to a host and model id.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            client: Client::new(),
            tools: None,
        }
    }

    /// Returns a cloned client bound to tool declarations.
    pub fn bind_tools(&self, tools: Vec<ToolDefinition>) -> Self {
        let mut bound = self.clone();
        bound.tools = Some(tools);
        bound
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the exact outbound request body.
    ///
    /// `stream` is pinned to `false` so the server answers with a single
    /// complete reply. The `tools` key is present only when tools are bound.
    pub fn request_payload(&self, messages: &[ChatMessage]) -> Value {
        let mut payload = Map::new();
        payload.insert("model".to_string(), Value::String(self.model.clone()));
        payload.insert(
            "messages".to_string(),
            Value::Array(
                messages
                    .iter()
                    .map(|message| {
                        serde_json::to_value(message).unwrap_or(Value::Null)
                    })
                    .collect(),
            ),
        );
        payload.insert("stream".to_string(), Value::Bool(false));
        if let Some(tools) = &self.tools {
            payload.insert(
                "tools".to_string(),
                Value::Array(tools.iter().map(|tool| tool.to_json()).collect()),
            );
        }
        Value::Object(payload)
    }

    /// Invokes the model and returns the full structured reply.
    pub fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, ChatError> {
        let url = format!("{}/api/chat", self.host.trim_end_matches('/'));
        let payload = self.request_payload(messages);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .map_err(ChatError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(ChatError::Api { status, body });
        }

        let raw: Value = response.json().map_err(ChatError::Request)?;
        let message = &raw["message"];
        let content = message["content"].as_str().unwrap_or("").to_string();
        let tool_calls = parse_tool_calls(message);
        let stats = ReplyStats {
            total_duration_ns: raw["total_duration"].as_u64(),
            prompt_eval_count: raw["prompt_eval_count"].as_u64(),
            eval_count: raw["eval_count"].as_u64(),
        };

        Ok(ChatReply {
            content,
            tool_calls,
            stats,
            raw,
        })
    }

    /// Invokes the model and unwraps `message.content` into a plain string.
    pub fn chat_text(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let reply = self.chat(messages)?;
        if reply.content.is_empty() && reply.tool_calls.is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(reply.content)
    }
}

/// Structured reply from one chat invocation.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Natural language content of the assistant message.
    pub content: String,
    /// Tool call requests emitted by the model, never executed here.
    pub tool_calls: Vec<ToolCall>,
    /// Server-side timing and token counts, when reported.
    pub stats: ReplyStats,
    /// The complete response body as received.
    pub raw: Value,
}

/// Timing and token counters reported by the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyStats {
    pub total_duration_ns: Option<u64>,
    pub prompt_eval_count: Option<u64>,
    pub eval_count: Option<u64>,
}

#[derive(Debug)]
pub enum ChatError {
    Request(reqwest::Error),
    Api { status: StatusCode, body: String },
    EmptyResponse,
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(source) => write!(f, "ollama request failed: {source}"),
            Self::Api { status, body } => write!(f, "ollama API error {status}: {body}"),
            Self::EmptyResponse => {
                write!(f, "ollama response did not contain message content")
            }
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(source) => Some(source),
            _ => None,
        }
    }
}
