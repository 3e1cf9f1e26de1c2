//! Reasoning Protocols
//!
//! A protocol decides how one turn talks to the model: what the default
//! system prompt says, what is sent with the history, and how the reply is
//! read back as either a final answer or a set of tool-call requests. The
//! agent owns everything else (history, dispatch, turn bound).

mod function;
mod react;
mod text;

pub use function::FunctionCallingProtocol;
pub use react::{ReActProtocol, ReActStep, StepParseError};
pub use text::TextProtocol;

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;
use crate::provider::LlmClient;
use crate::tool::ToolRegistry;

/// Result of one model turn
#[derive(Clone, Debug)]
pub enum StepOutcome {
    /// The model answered; the message content is the final text
    Answer(Message),

    /// An assistant message whose `tool_calls` must be dispatched in order
    ToolCalls(Message),

    /// A reply the protocol could not read. It is kept in history and the
    /// next step tells the model what was wrong with it.
    Unreadable(Message),
}

#[async_trait]
pub trait ReasoningProtocol: Send + Sync {
    fn name(&self) -> &'static str;

    /// System prompt used when the agent has no override
    fn default_system_prompt(&self, tools: &ToolRegistry) -> String;

    /// Turn bound used when the agent configuration sets none
    fn default_max_turns(&self) -> usize {
        5
    }

    /// Reject a tool set the protocol cannot work with
    fn check_tools(&self, _tools: &ToolRegistry) -> Result<()> {
        Ok(())
    }

    /// Run one model call over `history` and classify the reply
    async fn step(
        &self,
        client: &dyn LlmClient,
        history: &[Message],
        tools: &ToolRegistry,
    ) -> Result<StepOutcome>;
}
