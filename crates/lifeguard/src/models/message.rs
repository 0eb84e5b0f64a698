use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::Role;
use super::tool::ToolCall;
use crate::errors::CapabilityResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub tool_call: ToolCall,
}

/// The outcome of one tool request, correlated to it by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub created: i64,
    pub tool_result: CapabilityResult<Value>,
}

impl ToolResponse {
    pub fn new<S: Into<String>>(id: S, tool_result: CapabilityResult<Value>) -> Self {
        Self {
            id: id.into(),
            created: Utc::now().timestamp(),
            tool_result,
        }
    }

    pub fn is_success(&self) -> bool {
        self.tool_result.is_ok()
    }

    /// Serialized result as the model will read it
    pub fn payload(&self) -> String {
        match &self.tool_result {
            Ok(value) => value.to_string(),
            Err(e) => e.to_payload().to_string(),
        }
    }
}

/// An assistant turn, which may carry text, tool requests or both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_requests: Vec<ToolRequest>,
}

impl AssistantMessage {
    pub fn new() -> Self {
        Self {
            created: Utc::now().timestamp(),
            text: None,
            tool_requests: Vec::new(),
        }
    }

    /// Set the text of the message, replacing any previous text
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add a tool request to the message
    pub fn with_tool_request<S: Into<String>>(mut self, id: S, tool_call: ToolCall) -> Self {
        self.tool_requests.push(ToolRequest {
            id: id.into(),
            tool_call,
        });
        self
    }

    pub fn has_tool_requests(&self) -> bool {
        !self.tool_requests.is_empty()
    }

    /// The text of the message, or an empty string when the model sent none
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Drop any tool requests, keeping only the text
    pub fn without_tool_requests(mut self) -> Self {
        self.tool_requests.clear();
        self
    }
}

impl Default for AssistantMessage {
    fn default() -> Self {
        Self::new()
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { created: i64, text: String },
    User { created: i64, text: String },
    Assistant(AssistantMessage),
    Tool(ToolResponse),
}

impl Message {
    pub fn system<S: Into<String>>(text: S) -> Self {
        Message::System {
            created: Utc::now().timestamp(),
            text: text.into(),
        }
    }

    pub fn user<S: Into<String>>(text: S) -> Self {
        Message::User {
            created: Utc::now().timestamp(),
            text: text.into(),
        }
    }

    pub fn tool_response<S: Into<String>>(id: S, result: CapabilityResult<Value>) -> Self {
        Message::Tool(ToolResponse::new(id, result))
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::User { .. } => Role::User,
            Message::Assistant(_) => Role::Assistant,
            Message::Tool(_) => Role::Tool,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Message::Assistant(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        match self {
            Message::Tool(response) => Some(response),
            _ => None,
        }
    }
}

impl From<AssistantMessage> for Message {
    fn from(message: AssistantMessage) -> Self {
        Message::Assistant(message)
    }
}
