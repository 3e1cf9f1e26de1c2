//! ReAct protocol: one `Thought / Action / Action Input` step per turn
//!
//! ```text
//! Thought: I need to add two numbers.
//! Action: add
//! Action Input: {"a": 1, "b": 2}
//! ```
//!
//! `Action: Finish` with `{"answer": "..."}` ends the run. The model sees the
//! conversation only up to the current user input; the steps taken since
//! then are rendered as a scratchpad inside the system prompt on every turn.
//! A reply that does not follow the format is kept and shows up in the next
//! scratchpad with the parse error as its observation.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{ReasoningProtocol, StepOutcome};
use crate::error::{AgentError, Result};
use crate::message::{Message, Role, ToolCallRequest};
use crate::provider::LlmClient;
use crate::tool::ToolRegistry;

static ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Action:[ \t]*(.+)$").expect("action pattern is valid"));

static ACTION_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^Action Input:\s*(\{.*\})\s*$").expect("action input pattern is valid")
});

static THOUGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Thought:\s*(.+?)\s*Action:").expect("thought pattern is valid")
});

const FINISH: &str = "Finish";

const PROMPT: &str = r#"You are a ReAct-style agent.

You have access to the following tools:
{tool_descriptions}

You reason step by step using the following loop:
Thought -> Action -> Action Input -> Observation

Previous steps (do NOT repeat them, continue from here):
{scratchpad}

Follow the rules STRICTLY.

## Response Format (MUST be followed exactly)

Thought: <your reasoning for the next step>
Action: <one of the available tool names OR Finish>
Action Input: <JSON object>

### Rules for Action Input

- Action Input MUST be a valid JSON object.
- Use DOUBLE QUOTES for all keys and string values.
- DO NOT include any text outside the JSON object.
- DO NOT wrap the JSON in markdown or code blocks.
- If the Action is Finish, the Action Input MUST be:
  {"answer": "<final answer>"}

### Examples

Thought: I need to add two numbers.
Action: add
Action Input: {"a": 1, "b": 2}

Thought: I have the final result.
Action: Finish
Action Input: {"answer": "The result is 3"}

Now produce the NEXT step only."#;

/// Why a reply could not be read as a step
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepParseError {
    #[error("missing 'Action:' line")]
    MissingAction,

    #[error("missing or invalid 'Action Input:' object")]
    MissingInput,

    #[error("Action Input is not valid JSON: {0}")]
    InvalidJson(String),
}

/// One parsed reply
#[derive(Clone, Debug, PartialEq)]
pub struct ReActStep {
    pub thought: String,
    pub action: String,
    pub input: Map<String, Value>,

    /// Action Input exactly as the model wrote it
    pub raw_input: String,
}

impl ReActStep {
    pub fn is_finish(&self) -> bool {
        self.action.eq_ignore_ascii_case(FINISH)
    }
}

/// Thought / Action / Action Input protocol
#[derive(Clone, Copy, Debug, Default)]
pub struct ReActProtocol;

impl ReActProtocol {
    pub fn parse_step(text: &str) -> std::result::Result<ReActStep, StepParseError> {
        let action = ACTION
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(StepParseError::MissingAction)?;

        let raw_input = ACTION_INPUT
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .ok_or(StepParseError::MissingInput)?;
        let input = serde_json::from_str(&raw_input)
            .map_err(|e| StepParseError::InvalidJson(e.to_string()))?;

        let thought = THOUGHT
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        Ok(ReActStep { thought, action, input, raw_input })
    }

    /// Fill in the prompt template for the current turn
    fn render_prompt(template: &str, tools: &ToolRegistry, scratchpad: &str) -> String {
        let prompt = template.replace("{tool_descriptions}", &tools.descriptions());
        if prompt.contains("{scratchpad}") {
            prompt.replace("{scratchpad}", scratchpad)
        } else if scratchpad.is_empty() {
            prompt
        } else {
            format!("{prompt}\n\nPrevious steps:\n{scratchpad}")
        }
    }
}

/// Steps taken since the last user message, oldest first
fn render_scratchpad(steps: &[Message]) -> String {
    let mut entries = Vec::new();
    for message in steps.iter().filter(|m| m.role() == Role::Assistant) {
        let Some(call) = message.tool_calls().first() else {
            let problem = match ReActProtocol::parse_step(message.content()) {
                Err(e) => e.to_string(),
                Ok(_) => "the step was not used".to_string(),
            };
            entries.push(format!(
                "{}\nObservation: Could not read this step ({problem}). \
                 Reply with Thought, Action and Action Input exactly as described.",
                message.content().trim()
            ));
            continue;
        };

        let thought = THOUGHT
            .captures(message.content())
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let observation = steps
            .iter()
            .find(|m| m.role() == Role::Tool && m.tool_call_id() == Some(call.id.as_str()))
            .map_or("(no result)", Message::content);
        entries.push(format!(
            "Thought: {thought}\nAction: {}\nAction Input: {}\nObservation: {observation}",
            call.tool_name, call.raw_arguments
        ));
    }
    entries.join("\n\n")
}

#[async_trait]
impl ReasoningProtocol for ReActProtocol {
    fn name(&self) -> &'static str {
        "react"
    }

    fn default_system_prompt(&self, _tools: &ToolRegistry) -> String {
        PROMPT.to_string()
    }

    fn default_max_turns(&self) -> usize {
        3
    }

    fn check_tools(&self, tools: &ToolRegistry) -> Result<()> {
        if tools.is_empty() {
            return Err(AgentError::Config("a ReAct agent needs at least one tool".into()));
        }
        Ok(())
    }

    async fn step(
        &self,
        client: &dyn LlmClient,
        history: &[Message],
        tools: &ToolRegistry,
    ) -> Result<StepOutcome> {
        let split = history
            .iter()
            .rposition(|m| m.role() == Role::User)
            .map_or(history.len(), |i| i + 1);
        let (context, steps) = history.split_at(split);

        let scratchpad = render_scratchpad(steps);
        let mut messages = context.to_vec();
        match messages.first() {
            Some(first) if first.role() == Role::System => {
                let prompt = Self::render_prompt(first.content(), tools, &scratchpad);
                messages[0] = Message::system(prompt);
            }
            _ => {
                let prompt = Self::render_prompt(PROMPT, tools, &scratchpad);
                messages.insert(0, Message::system(prompt));
            }
        }

        let mut completion = client.generate(&messages, None).await?;
        completion.tool_calls.clear();

        let step = match Self::parse_step(&completion.content) {
            Ok(step) => step,
            Err(e) => {
                tracing::debug!(error = %e, "Unreadable ReAct step");
                return Ok(StepOutcome::Unreadable(completion.into_message()));
            }
        };

        if step.is_finish() {
            let answer = match step.input.get("answer") {
                Some(Value::String(answer)) => answer.clone(),
                Some(other) => other.to_string(),
                None => completion.content.clone(),
            };
            tracing::debug!("Finish action detected");
            completion.content = answer;
            return Ok(StepOutcome::Answer(completion.into_message()));
        }

        tracing::debug!(action = %step.action, input = %step.raw_input, "ReAct action detected");
        completion
            .tool_calls
            .push(ToolCallRequest::generated(step.action, step.raw_input));
        Ok(StepOutcome::ToolCalls(completion.into_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Tool;

    fn registry() -> ToolRegistry {
        let add = Tool::builder("add")
            .description("Add two numbers")
            .param("a", "int")
            .param("b", "int")
            .sync_function(|args| Ok(args.get::<i64>("a")? + args.get::<i64>("b")?))
            .build()
            .unwrap();
        ToolRegistry::from_tools([add]).unwrap()
    }

    #[test]
    fn test_parse_tool_step() {
        let step = ReActProtocol::parse_step(
            "Thought: I need to add.\nAction: add\nAction Input: {\"a\": 1, \"b\": 2}",
        )
        .unwrap();
        assert_eq!(step.thought, "I need to add.");
        assert_eq!(step.action, "add");
        assert_eq!(step.input["b"], 2);
        assert_eq!(step.raw_input, r#"{"a": 1, "b": 2}"#);
        assert!(!step.is_finish());
    }

    #[test]
    fn test_parse_finish_any_case() {
        let step = ReActProtocol::parse_step(
            "Thought: done\nAction: finish\nAction Input: {\"answer\": \"3\"}\n",
        )
        .unwrap();
        assert!(step.is_finish());
        assert_eq!(step.input["answer"], "3");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ReActProtocol::parse_step("The answer is 3."),
            Err(StepParseError::MissingAction)
        );
        assert_eq!(
            ReActProtocol::parse_step("Action: add\nAction Input: a=1"),
            Err(StepParseError::MissingInput)
        );
        assert!(matches!(
            ReActProtocol::parse_step("Action: add\nAction Input: {'a': 1}"),
            Err(StepParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_scratchpad_pairs_actions_with_observations() {
        let call = ToolCallRequest::new("call_1", "add", r#"{"a": 1, "b": 2}"#);
        let steps = [
            Message::assistant("Action: add"),
            Message::assistant_with_tool_calls(
                "Thought: add them\nAction: add\nAction Input: {\"a\": 1, \"b\": 2}",
                vec![call],
            ),
            Message::tool("3", "call_1"),
        ];
        let scratchpad = render_scratchpad(&steps);

        assert!(scratchpad.starts_with("Action: add\nObservation: Could not read this step"));
        assert!(scratchpad.contains("missing or invalid 'Action Input:' object"));
        assert!(scratchpad.ends_with(
            "Thought: add them\nAction: add\nAction Input: {\"a\": 1, \"b\": 2}\nObservation: 3"
        ));
    }

    #[test]
    fn test_prompt_rendering() {
        let tools = registry();
        let prompt = ReActProtocol::render_prompt(PROMPT, &tools, "");
        assert!(prompt.contains("add(a: integer, b: integer) - Add two numbers"));
        assert!(!prompt.contains("{scratchpad}"));

        let custom = ReActProtocol::render_prompt("Use {tool_descriptions}.", &tools, "Thought: x");
        assert!(custom.starts_with("Use add(a: integer, b: integer)"));
        assert!(custom.ends_with("Previous steps:\nThought: x"));
    }

    #[test]
    fn test_requires_tools() {
        assert!(ReActProtocol.check_tools(&ToolRegistry::new()).is_err());
        assert!(ReActProtocol.check_tools(&registry()).is_ok());
    }
}
