//! Structured protocol: native function calling
//!
//! The full schema list goes out with every request and the client returns
//! typed tool-call requests. Requests keep the order the model gave them.

use async_trait::async_trait;

use super::{ReasoningProtocol, StepOutcome};
use crate::error::Result;
use crate::message::{new_call_id, Message};
use crate::provider::LlmClient;
use crate::tool::ToolRegistry;

const DEFAULT_PROMPT: &str =
    "You are an intelligent agent capable of using external tools to help solve user queries.";

#[derive(Clone, Copy, Debug, Default)]
pub struct FunctionCallingProtocol;

#[async_trait]
impl ReasoningProtocol for FunctionCallingProtocol {
    fn name(&self) -> &'static str {
        "function-calling"
    }

    fn default_system_prompt(&self, _tools: &ToolRegistry) -> String {
        DEFAULT_PROMPT.to_string()
    }

    async fn step(
        &self,
        client: &dyn LlmClient,
        history: &[Message],
        tools: &ToolRegistry,
    ) -> Result<StepOutcome> {
        let schemas = tools.schemas();
        let mut completion = client
            .generate(history, (!schemas.is_empty()).then_some(schemas))
            .await?;

        if !completion.has_tool_calls() {
            return Ok(StepOutcome::Answer(completion.into_message()));
        }

        for call in &mut completion.tool_calls {
            if call.id.is_empty() {
                call.id = new_call_id();
            }
        }
        tracing::debug!(
            calls = ?completion.tool_calls.iter().map(|c| c.tool_name.as_str()).collect::<Vec<_>>(),
            "Model requested tool calls"
        );
        Ok(StepOutcome::ToolCalls(completion.into_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCallRequest;
    use crate::mock::MockLlmClient;
    use crate::provider::Completion;
    use crate::tool::Tool;

    fn registry() -> ToolRegistry {
        let ping = Tool::builder("ping").sync_function(|_| Ok("pong")).build().unwrap();
        ToolRegistry::from_tools([ping]).unwrap()
    }

    #[tokio::test]
    async fn test_sends_schemas_and_classifies() {
        let client = MockLlmClient::new(vec![
            Completion::with_tool_calls(vec![ToolCallRequest::new("", "ping", "{}")]),
            Completion::text("done"),
        ]);
        let tools = registry();
        let history = [Message::user("ping it")];

        let first = FunctionCallingProtocol.step(&client, &history, &tools).await.unwrap();
        let StepOutcome::ToolCalls(message) = first else {
            panic!("expected tool calls");
        };
        assert!(message.tool_calls()[0].id.starts_with("call_"));

        let second = FunctionCallingProtocol.step(&client, &history, &tools).await.unwrap();
        assert!(matches!(second, StepOutcome::Answer(m) if m.content() == "done"));

        let requests = client.requests().await;
        assert_eq!(requests[0].tools.as_ref().unwrap()[0].name, "ping");
    }

    #[tokio::test]
    async fn test_no_tools_sends_none() {
        let client = MockLlmClient::new(vec![Completion::text("hi")]);
        FunctionCallingProtocol
            .step(&client, &[Message::user("hi")], &ToolRegistry::new())
            .await
            .unwrap();
        assert!(client.requests().await[0].tools.is_none());
    }
}
