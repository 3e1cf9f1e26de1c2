//! LLM Client Contract
//!
//! Defines the interface the reasoning loop uses to talk to a model. The
//! agent works exclusively through [`LlmClient`], so any backend (an
//! OpenAI-compatible HTTP API, a local server, a scripted mock) plugs in
//! without changes to agent logic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vero_core::provider::LlmClient;
//!
//! let completion = client.generate(&messages, Some(registry.schemas())).await?;
//! for call in &completion.tool_calls {
//!     println!("{} wants {}", call.id, call.tool_name);
//! }
//! ```

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{Message, MessageMetadata, ToolCallRequest};
use crate::tool::ToolSchema;

/// Response from a non-streaming model call
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text; may be empty when only tool calls are present
    pub content: String,

    /// Tool calls requested by the model, in the order returned
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,

    /// Model that generated this response
    #[serde(default)]
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Reasoning trace, for providers that return one separately
    #[serde(default)]
    pub reasoning: Option<String>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// A plain text response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// A response requesting tool calls
    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            finish_reason: Some(FinishReason::ToolUse),
            ..Default::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert into the assistant message recorded in history
    pub fn into_message(self) -> Message {
        let metadata = MessageMetadata {
            prompt_tokens: self.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: self.usage.as_ref().map(|u| u.completion_tokens),
            total_tokens: self.usage.as_ref().map(|u| u.total_tokens),
            model: Some(self.model).filter(|m| !m.is_empty()),
            reasoning: self.reasoning,
        };
        let message = Message::assistant_with_tool_calls(self.content, self.tool_calls);
        if metadata == MessageMetadata::default() {
            message
        } else {
            message.with_metadata(metadata)
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Other(String),
}

impl FinishReason {
    /// Map a chat-completions `finish_reason` string
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolUse,
            "content_filter" => FinishReason::ContentFilter,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// Lazy, finite, non-restartable sequence of text fragments. Dropping the
/// stream stops generation; there is no separate cancel signal.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Interface to a language model
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str {
        "llm"
    }

    /// Generate a complete response. `tools` carries the function schemas the
    /// model may call; `None` sends a plain chat request.
    async fn generate(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Completion>;

    /// Generate a streaming response of text fragments. Tool calls are not
    /// available in streaming mode.
    async fn generate_stream(&self, messages: &[Message]) -> Result<CompletionStream>;
}
