//! # vero-core
//!
//! A bounded tool-calling reasoning loop over a provider-agnostic LLM client.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Agent<P>                             │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │  Reasoning   │  │    Tool      │  │     LlmClient      │  │
//! │  │  Protocol P  │──│   Registry   │──│     (Strategy)     │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `TextProtocol` reads `TOOL_CALL: name({...})` directives out of plain
//! replies ([`SimpleAgent`]); `FunctionCallingProtocol` sends tool schemas
//! and reads native tool calls ([`OpenAIFunctionAgent`]); `ReActProtocol`
//! reads `Thought / Action / Action Input` steps and keeps a scratchpad in
//! the system prompt ([`ReActAgent`]). The `LlmClient`
//! trait keeps the HTTP backend out of agent logic.

pub mod error;
pub mod message;
pub mod mock;
pub mod protocol;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role, ToolCallRequest};
pub use protocol::{
    FunctionCallingProtocol, ReActProtocol, ReasoningProtocol, StepOutcome, TextProtocol,
};
pub use provider::{Completion, CompletionStream, LlmClient};
pub use reasoning::{
    Agent, AgentBuilder, AgentConfig, AgentState, OpenAIFunctionAgent, ReActAgent, SimpleAgent,
    ToolFailurePolicy,
};
pub use tool::{Tool, ToolArgs, ToolBuilder, ToolRegistry, ToolSchema};
