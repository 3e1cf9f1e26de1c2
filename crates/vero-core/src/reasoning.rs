//! Reasoning Loop
//!
//! The agent appends the user input to its history, then alternates between
//! one model call and the dispatch of whatever tools that call requested,
//! until the model answers or the turn bound runs out. How a reply is read
//! (inline directive, native tool calls or a ReAct step) is the protocol's
//! business; the loop itself is the same for every agent.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message, ToolCallRequest};
use crate::protocol::{
    FunctionCallingProtocol, ReActProtocol, ReasoningProtocol, StepOutcome, TextProtocol,
};
use crate::provider::LlmClient;
use crate::tool::{Tool, ToolRegistry};

/// Agent speaking the `TOOL_CALL:` text protocol
pub type SimpleAgent = Agent<TextProtocol>;

/// Agent using native function calling
pub type OpenAIFunctionAgent = Agent<FunctionCallingProtocol>;

/// Agent taking one Thought / Action / Action Input step per turn
pub type ReActAgent = Agent<ReActProtocol>;

/// Content of the tool message for a request skipped by an aborted run
const NOT_EXECUTED: &str = "Error: not executed; the run was aborted";

/// What to do when tools keep failing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolFailurePolicy {
    /// Every recoverable failure goes back to the model as a tool message
    #[default]
    FeedBack,

    /// Abort once the same tool fails with the same error this many times
    /// in a row
    EscalateAfterRepeats(usize),
}

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Overrides the protocol's default system prompt
    pub system_prompt: Option<String>,

    /// Model calls allowed per `run` before giving up. `None` uses the
    /// protocol's default.
    pub max_turns: Option<usize>,

    pub failure_policy: ToolFailurePolicy,

    /// Run the tool calls of one turn concurrently. Results are still
    /// recorded in request order.
    pub concurrent_tool_calls: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_turns: None,
            failure_policy: ToolFailurePolicy::default(),
            concurrent_tool_calls: false,
        }
    }
}

impl AgentConfig {
    fn validate(&self) -> Result<()> {
        if self.max_turns == Some(0) {
            return Err(AgentError::Config("max_turns must be at least 1".into()));
        }
        if self.failure_policy == ToolFailurePolicy::EscalateAfterRepeats(0) {
            return Err(AgentError::Config(
                "EscalateAfterRepeats needs a count of at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Where the agent is in its current run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentState {
    Init,
    AwaitingModel,
    ToolRequested,
    ToolExecuting,
    Done,
    Failed,
}

/// Counts consecutive identical tool failures
#[derive(Debug)]
struct FailureTracker {
    policy: ToolFailurePolicy,
    last: Option<(String, String)>,
    repeats: usize,
}

impl FailureTracker {
    fn new(policy: ToolFailurePolicy) -> Self {
        Self { policy, last: None, repeats: 0 }
    }

    /// Record one dispatch result; true when the run should abort
    fn observe(&mut self, tool: &str, result: &Result<String>) -> bool {
        let Err(err) = result else {
            self.last = None;
            self.repeats = 0;
            return false;
        };

        let key = (tool.to_string(), err.to_string());
        if self.last.as_ref() == Some(&key) {
            self.repeats += 1;
        } else {
            self.last = Some(key);
            self.repeats = 1;
        }

        match self.policy {
            ToolFailurePolicy::FeedBack => false,
            ToolFailurePolicy::EscalateAfterRepeats(limit) => self.repeats >= limit,
        }
    }
}

/// A tool-calling agent. The protocol decides how each model reply is read.
pub struct Agent<P> {
    name: String,
    client: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    protocol: P,
    config: AgentConfig,
    max_turns: usize,
    history: Conversation,
    state: AgentState,
}

impl<P: ReasoningProtocol> Agent<P> {
    /// Create a new agent. Fails if the configuration is unusable or the
    /// protocol rejects the tool set.
    pub fn new(
        name: impl Into<String>,
        client: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        protocol: P,
        config: AgentConfig,
    ) -> Result<Self> {
        config.validate()?;
        protocol.check_tools(&tools)?;
        let max_turns = config.max_turns.unwrap_or_else(|| protocol.default_max_turns());
        Ok(Self {
            name: name.into(),
            client,
            tools,
            protocol,
            config,
            max_turns,
            history: Conversation::new(),
            state: AgentState::Init,
        })
    }

    /// Append a message to the history. Nothing else happens.
    pub fn add_message(&mut self, message: Message) {
        self.history.push(message);
    }

    /// Forget the whole conversation, system prompt included. The prompt is
    /// seeded again by the next `run`; tools are kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.state = AgentState::Init;
    }

    /// Run the agent on one user input and return the final answer
    pub async fn run(&mut self, input: &str) -> Result<String> {
        self.transition(AgentState::Init);

        // Ensure system prompt is set
        if !self.history.starts_with_system() {
            let prompt = self
                .config
                .system_prompt
                .clone()
                .unwrap_or_else(|| self.protocol.default_system_prompt(&self.tools));
            self.history.prepend_system(prompt);
        }
        self.history.push(Message::user(input));

        let result = self.run_turns().await;
        match &result {
            Ok(_) => self.transition(AgentState::Done),
            Err(e) => {
                tracing::warn!(agent = %self.name, error = %e, "Run failed");
                self.transition(AgentState::Failed);
            }
        }
        result
    }

    async fn run_turns(&mut self) -> Result<String> {
        let mut failures = FailureTracker::new(self.config.failure_policy);

        for turn in 1..=self.max_turns {
            self.transition(AgentState::AwaitingModel);
            tracing::debug!(
                agent = %self.name,
                protocol = self.protocol.name(),
                turn,
                max_turns = self.max_turns,
                "Requesting model step"
            );

            let outcome = self
                .protocol
                .step(self.client.as_ref(), self.history.messages(), &self.tools)
                .await?;

            let message = match outcome {
                StepOutcome::Answer(message) => {
                    let answer = message.content().to_string();
                    self.history.push(message);
                    return Ok(answer);
                }
                StepOutcome::ToolCalls(message) => message,
                StepOutcome::Unreadable(message) => {
                    self.history.push(message);
                    continue;
                }
            };

            self.transition(AgentState::ToolRequested);
            let requests = message.tool_calls().to_vec();
            self.history.push(message);

            self.transition(AgentState::ToolExecuting);
            self.execute_requests(&requests, &mut failures).await?;
        }

        Err(AgentError::MaxIterations(self.max_turns))
    }

    /// Dispatch the requests of one turn and record one tool message each.
    /// Every request gets its tool message even when the run aborts.
    async fn execute_requests(
        &mut self,
        requests: &[ToolCallRequest],
        failures: &mut FailureTracker,
    ) -> Result<()> {
        let mut abort = None;
        if self.config.concurrent_tool_calls && requests.len() > 1 {
            let results = join_all(requests.iter().map(|r| self.tools.dispatch(r))).await;
            for (request, result) in requests.iter().zip(results) {
                let error = self.record_result(request, result, failures);
                abort = abort.or(error);
            }
        } else {
            for request in requests {
                let result = self.tools.dispatch(request).await;
                abort = self.record_result(request, result, failures);
                if abort.is_some() {
                    break;
                }
            }
        }

        let Some(error) = abort else {
            return Ok(());
        };
        for id in self.history.pending_tool_calls().to_vec() {
            self.history.push(Message::tool(NOT_EXECUTED, id));
        }
        Err(error)
    }

    /// Record the tool message for one result. Returns the error that
    /// aborts the run, if any.
    fn record_result(
        &mut self,
        request: &ToolCallRequest,
        result: Result<String>,
        failures: &mut FailureTracker,
    ) -> Option<AgentError> {
        let escalate = failures.observe(&request.tool_name, &result);

        let (content, abort) = match result {
            Ok(output) => (output, None),
            Err(e) => {
                if e.is_recoverable() {
                    tracing::warn!(
                        tool = %request.tool_name,
                        call_id = %request.id,
                        error = %e,
                        "Tool call failed; feeding error back to the model"
                    );
                }
                let content = format!("Error: {e}");
                (content, (escalate || !e.is_recoverable()).then_some(e))
            }
        };

        self.history.push(Message::tool(content, request.id.clone()));
        abort
    }

    fn transition(&mut self, next: AgentState) {
        if self.state != next {
            tracing::debug!(agent = %self.name, from = ?self.state, to = ?next, "State transition");
            self.state = next;
        }
    }

    /// One line per tool: `name(p: type, q: type = default) - description`
    pub fn tool_descriptions(&self) -> String {
        self.tools.descriptions()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub fn tool_by_name(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Model calls allowed per `run`
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}

impl<P> fmt::Display for Agent<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent<name={}>", self.name)
    }
}

/// Builder for agents
pub struct AgentBuilder {
    name: String,
    client: Option<Arc<dyn LlmClient>>,
    tools: Vec<Tool>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            name: "agent".into(),
            client: None,
            tools: Vec::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_turns(mut self, max: usize) -> Self {
        self.config.max_turns = Some(max);
        self
    }

    pub fn failure_policy(mut self, policy: ToolFailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn concurrent_tool_calls(mut self, enabled: bool) -> Self {
        self.config.concurrent_tool_calls = enabled;
        self
    }

    pub fn build<P: ReasoningProtocol>(self, protocol: P) -> Result<Agent<P>> {
        let client = self
            .client
            .ok_or_else(|| AgentError::Config("LLM client is required".into()))?;
        let tools = ToolRegistry::from_tools(self.tools)?;

        Agent::new(self.name, client, tools, protocol, self.config)
    }

    pub fn build_simple(self) -> Result<SimpleAgent> {
        self.build(TextProtocol)
    }

    pub fn build_function_calling(self) -> Result<OpenAIFunctionAgent> {
        self.build(FunctionCallingProtocol)
    }

    pub fn build_react(self) -> Result<ReActAgent> {
        self.build(ReActProtocol)
    }
}
