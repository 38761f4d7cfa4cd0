use crate::error::AgentError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments exactly as the model produced them.
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    /// Set on `tool` messages: the call this result answers.
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    pub fn assistant_with_tools(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::new("assistant", content)
        }
    }

    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new("tool", content)
        }
    }
}

/// What the model answered for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Final(String),
    ToolCalls { content: String, calls: Vec<ToolCall> },
}

#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<ModelReply, AgentError>;
}

pub fn serialize_messages(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let mut msg = json!({ "role": m.role, "content": m.content });
            if !m.tool_calls.is_empty() {
                msg["tool_calls"] = m
                    .tool_calls
                    .iter()
                    .map(|c| {
                        json!({
                            "id": c.id,
                            "type": "function",
                            "function": { "name": c.name, "arguments": c.arguments }
                        })
                    })
                    .collect();
                // The API wants null content next to tool_calls when there is no text.
                if m.content.is_empty() {
                    msg["content"] = Value::Null;
                }
            }
            if let Some(id) = &m.tool_call_id {
                msg["tool_call_id"] = json!(id);
            }
            msg
        })
        .collect()
}

/// Extracts the first choice of a chat-completions response.
pub fn parse_reply(body: &Value) -> Result<ModelReply, AgentError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| AgentError::MalformedResponse(format!("no choices in {body}")))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let calls = match message.get("tool_calls") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(calls)) => calls
            .iter()
            .map(parse_tool_call)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(AgentError::MalformedResponse(format!(
                "tool_calls is not an array: {other}"
            )))
        }
    };

    if calls.is_empty() {
        Ok(ModelReply::Final(content))
    } else {
        Ok(ModelReply::ToolCalls { content, calls })
    }
}

fn parse_tool_call(tc: &Value) -> Result<ToolCall, AgentError> {
    let malformed = |what: &str| AgentError::MalformedResponse(format!("tool call {what}: {tc}"));

    let id = tc.get("id").and_then(Value::as_str).ok_or_else(|| malformed("has no id"))?;
    let function = tc.get("function").ok_or_else(|| malformed("has no function"))?;
    let name = function
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("has no function name"))?;
    let arguments = match function.get("arguments") {
        None | Some(Value::Null) => "{}",
        Some(Value::String(raw)) => raw.as_str(),
        Some(_) => return Err(malformed("arguments are not a string")),
    };

    Ok(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    })
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiChatModel {
    api_key: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl OpenAiChatModel {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[Value]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": serialize_messages(messages),
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.to_vec());
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

#[async_trait::async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<ModelReply, AgentError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages, tools))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(AgentError::ModelStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json().await?;
        parse_reply(&body)
    }
}
