//! # vero-runtime
//!
//! LLM backends for vero agents.
//!
//! ## Clients
//!
//! - **OpenAI-compatible**: any server exposing `/chat/completions`
//!   (OpenAI, vLLM, SGLang, hosted Qwen endpoints)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vero_runtime::OpenAiClient;
//!
//! let client = OpenAiClient::from_env()?;
//! let mut agent = AgentBuilder::new()
//!     .client(Arc::new(client))
//!     .tool(calculator)
//!     .build_function_calling()?;
//! ```

pub mod config;
pub mod openai;
mod sse;

pub use config::OpenAiConfig;
pub use openai::OpenAiClient;

// Re-export core types for convenience
pub use vero_core::{
    AgentBuilder, AgentError, LlmClient, Message, OpenAIFunctionAgent, Result, Role, SimpleAgent,
    Tool, ToolRegistry,
};
