//! Conversation Messages
//!
//! Standard message format used across the agent system. Messages are
//! immutable once built: fields are read through accessors and the only
//! way to attach extra data is a consuming `with_*` call at creation time.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AgentError;

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
    /// Tool result fed back to the model
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            other => Err(AgentError::InvalidRole(other.to_string())),
        }
    }
}

/// Fresh `call_<uuid>` identifier for a tool call request
pub fn new_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

/// A model-issued request to invoke one tool.
///
/// `raw_arguments` is the serialized payload exactly as the model produced
/// it; it is only parsed when the request is dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub tool_name: String,
    pub raw_arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        tool_name: impl Into<String>,
        raw_arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            raw_arguments: raw_arguments.into(),
        }
    }

    /// Create a request with a locally generated ID, for protocols where the
    /// model does not assign one.
    pub fn generated(tool_name: impl Into<String>, raw_arguments: impl Into<String>) -> Self {
        Self::new(new_call_id(), tool_name, raw_arguments)
    }

    /// Wire shape: `{id, name, arguments}`
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.tool_name,
            "arguments": self.raw_arguments,
        })
    }
}

/// Additional message metadata
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,

    /// Model that generated this (for assistant messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Reasoning trace, when the provider returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    role: Role,

    /// May be empty when an assistant message only carries tool calls
    content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallRequest>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MessageMetadata>,

    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            tool_calls: None,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a message from a role name. Fails with `InvalidRole` for
    /// anything outside system, user, assistant and tool; a tool message
    /// built this way still needs [`Message::tool`] to carry its call ID.
    pub fn from_role(role: &str, content: impl Into<String>) -> crate::Result<Self> {
        let role: Role = role.parse()?;
        if role == Role::Tool {
            return Err(AgentError::InvalidRole(
                "tool messages require a tool_call_id; use Message::tool".into(),
            ));
        }
        Ok(Self::new(role, content))
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message that requests tool calls
    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        if !tool_calls.is_empty() {
            msg.tool_calls = Some(tool_calls);
        }
        msg
    }

    /// Create a tool result message answering the request `tool_call_id`
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }

    /// Tool calls attached to an assistant message, in the order requested
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    pub fn metadata(&self) -> Option<&MessageMetadata> {
        self.metadata.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Chat-completion wire shape. Optional fields are omitted, never null.
    pub fn to_wire(&self) -> Value {
        let mut wire = json!({
            "role": self.role.as_str(),
            "content": self.content,
        });
        if let Some(id) = &self.tool_call_id {
            wire["tool_call_id"] = json!(id);
        }
        if let Some(calls) = &self.tool_calls {
            wire["tool_calls"] = Value::Array(calls.iter().map(ToolCallRequest::to_wire).collect());
        }
        wire
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.role, self.content)
    }
}

/// Ordered conversation history owned by one agent.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,

    /// IDs of tool calls requested by the latest assistant message that have
    /// no tool message yet
    pending: Vec<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut conv = Self::new();
        conv.push(Message::system(prompt));
        conv
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        match message.role {
            Role::Assistant => {
                self.pending = message.tool_calls().iter().map(|c| c.id.clone()).collect();
            }
            Role::Tool => {
                let id = message.tool_call_id().unwrap_or_default();
                match self.pending.iter().position(|p| p == id) {
                    Some(pos) => {
                        self.pending.remove(pos);
                    }
                    None => tracing::warn!(
                        tool_call_id = id,
                        "tool message does not answer a pending tool call"
                    ),
                }
            }
            Role::System | Role::User => {}
        }
        self.messages.push(message);
    }

    /// Insert a system prompt in front of the existing messages
    pub fn prepend_system(&mut self, prompt: impl Into<String>) {
        self.messages.insert(0, Message::system(prompt));
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn pending_tool_calls(&self) -> &[String] {
        &self.pending
    }

    pub fn starts_with_system(&self) -> bool {
        self.messages.first().is_some_and(|m| m.role == Role::System)
    }

    /// Remove every message, system prompt included
    pub fn clear(&mut self) {
        self.messages.clear();
        self.pending.clear();
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
