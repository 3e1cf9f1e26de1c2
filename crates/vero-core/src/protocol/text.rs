//! Text protocol: the model asks for a tool with an inline directive
//!
//! ```text
//! TOOL_CALL: add({"a": 1, "b": 2})
//! ```
//!
//! A reply counts as a directive only when the whole (trimmed) reply is that
//! one line and names a registered tool. Anything else is the final answer.
//! The argument text is not checked here; a payload that is not a JSON
//! object fails at dispatch and the error goes back to the model.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{ReasoningProtocol, StepOutcome};
use crate::error::Result;
use crate::message::{Message, ToolCallRequest};
use crate::provider::LlmClient;
use crate::tool::ToolRegistry;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^TOOL_CALL:\s*([A-Za-z_][A-Za-z0-9_\-]*)\((.*)\)$")
        .expect("directive pattern is valid")
});

const PROMPT_WITHOUT_TOOLS: &str =
    "You are a helpful and intelligent AI assistant. Answer the user concisely and accurately.";

const PROMPT_WITH_TOOLS: &str = r#"You are an intelligent agent capable of using external tools to help solve user queries.

Below is the list of available tools:

{tool_descriptions}

When you decide that using a tool is necessary:
- Reply with exactly one line in this format and nothing else:
  TOOL_CALL: tool_name({"param1": 1, "param2": "abc"})
- The arguments must be a valid JSON object that includes all required arguments of the tool.
- The tool result comes back as a tool message. Use it to answer the user.
- If no tool is needed, simply respond with normal text.

Follow the format strictly. Do not explain the tool call. Do not wrap the tool call in code blocks."#;

/// Prompt-convention protocol for models without native function calling
#[derive(Clone, Copy, Debug, Default)]
pub struct TextProtocol;

impl TextProtocol {
    /// Parse a reply into a tool call request, if it is a directive naming
    /// a registered tool.
    pub fn parse_directive(content: &str, tools: &ToolRegistry) -> Option<ToolCallRequest> {
        let captures = DIRECTIVE.captures(content.trim())?;
        let name = &captures[1];
        if !tools.contains(name) {
            tracing::debug!(tool = name, "Directive names an unknown tool; treating as answer");
            return None;
        }
        Some(ToolCallRequest::generated(name, captures[2].trim()))
    }
}

#[async_trait]
impl ReasoningProtocol for TextProtocol {
    fn name(&self) -> &'static str {
        "text"
    }

    fn default_system_prompt(&self, tools: &ToolRegistry) -> String {
        if tools.is_empty() {
            PROMPT_WITHOUT_TOOLS.to_string()
        } else {
            PROMPT_WITH_TOOLS.replace("{tool_descriptions}", &tools.descriptions())
        }
    }

    fn default_max_turns(&self) -> usize {
        3
    }

    async fn step(
        &self,
        client: &dyn LlmClient,
        history: &[Message],
        tools: &ToolRegistry,
    ) -> Result<StepOutcome> {
        let mut completion = client.generate(history, None).await?;
        completion.tool_calls.clear();

        match Self::parse_directive(&completion.content, tools) {
            Some(request) => {
                tracing::debug!(
                    tool = %request.tool_name,
                    raw_arguments = %request.raw_arguments,
                    "TOOL_CALL directive detected"
                );
                completion.tool_calls.push(request);
                Ok(StepOutcome::ToolCalls(completion.into_message()))
            }
            None => Ok(StepOutcome::Answer(completion.into_message())),
        }
    }
}
