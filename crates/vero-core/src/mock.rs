//! Mock LLM Client
//!
//! For testing and demo purposes. Replays a scripted sequence of responses
//! and records every request it receives.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, CompletionStream, LlmClient};
use crate::tool::ToolSchema;

/// One request as seen by the mock
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolSchema>>,
}

#[derive(Clone, Debug)]
enum Fallback {
    Respond(Completion),
    Fail(String),
}

/// Scripted client: each `generate` call pops the next response.
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<Completion>>>,
    /// Returned once the script is exhausted
    fallback: Option<Fallback>,
    fragments: Vec<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MockLlmClient {
    pub fn new(responses: Vec<Completion>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            fallback: None,
            fragments: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the same response forever
    pub fn repeating(response: Completion) -> Self {
        Self {
            fallback: Some(Fallback::Respond(response)),
            ..Self::default()
        }
    }

    /// Fails every call with `LlmCall`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fallback: Some(Fallback::Fail(message.into())),
            ..Self::default()
        }
    }

    /// Fragments yielded by `generate_stream`
    pub fn with_stream(mut self, fragments: &[&str]) -> Self {
        self.fragments = fragments.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Requests received so far, oldest first
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Completion> {
        self.requests.lock().await.push(RecordedRequest {
            messages: messages.to_vec(),
            tools: tools.map(<[ToolSchema]>::to_vec),
        });

        match self.script.lock().await.pop_front() {
            Some(response) => response,
            None => match &self.fallback {
                Some(Fallback::Respond(response)) => Ok(response.clone()),
                Some(Fallback::Fail(message)) => Err(AgentError::LlmCall(message.clone())),
                None => Err(AgentError::LlmCall("mock script exhausted".into())),
            },
        }
    }

    async fn generate_stream(&self, messages: &[Message]) -> Result<CompletionStream> {
        self.requests.lock().await.push(RecordedRequest {
            messages: messages.to_vec(),
            tools: None,
        });
        let fragments = self.fragments.clone();
        Ok(Box::pin(futures::stream::iter(fragments.into_iter().map(Ok))))
    }
}
