//! OpenAI-compatible Chat Completions client
//!
//! Implementation of `LlmClient` over `POST {base_url}/chat/completions`.
//! Works with OpenAI itself and with compatible servers (vLLM, SGLang,
//! hosted Qwen endpoints) that speak the same wire format.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use vero_core::message::{Message, ToolCallRequest};
use vero_core::provider::{Completion, CompletionStream, FinishReason, LlmClient, TokenUsage};
use vero_core::tool::ToolSchema;
use vero_core::{AgentError, Result};

use crate::config::OpenAiConfig;
use crate::sse::{data_lines, SseBuffer, SseData};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let tool_calls = message.tool_calls();
        Self {
            role: message.role().as_str(),
            content: message.content(),
            tool_call_id: message.tool_call_id(),
            tool_calls: (!tool_calls.is_empty())
                .then(|| tool_calls.iter().map(WireToolCall::from).collect()),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    r#type: &'static str,
    function: &'a ToolSchema,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".into()
}

impl From<&ToolCallRequest> for WireToolCall {
    fn from(call: &ToolCallRequest) -> Self {
        Self {
            id: call.id.clone(),
            r#type: function_type(),
            function: WireFunction {
                name: call.tool_name.clone(),
                arguments: call.raw_arguments.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
    /// Separate thinking trace returned by Qwen/DeepSeek style servers
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Non-empty content fragment of one streamed chunk
fn chunk_text(data: &str) -> Option<String> {
    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping undecodable stream chunk");
            return None;
        }
    };
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty())
}

/// OpenAI-compatible LLM client
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create from configuration. Fails with `LlmConfig` if the key, base
    /// URL or model is blank.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::LlmConfig(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(model = %config.model, base_url = %config.base_url, "Initialized LLM client");
        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [Message],
        tools: Option<&'a [ToolSchema]>,
        stream: bool,
    ) -> ChatRequest<'a> {
        let tools = tools.filter(|t| !t.is_empty()).map(|schemas| {
            schemas
                .iter()
                .map(|function| WireTool { r#type: "function", function })
                .collect::<Vec<_>>()
        });
        ChatRequest {
            model: &self.config.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            tool_choice: tools.as_ref().map(|_| self.config.tool_choice.as_str()),
            tools,
            stream,
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(self.config.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::LlmCall(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, body = %body, "LLM endpoint returned an error");
        Err(AgentError::LlmCall(format!("HTTP {status}: {body}")))
    }

    fn completion_from(&self, response: ChatResponse) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::LlmCall("response contained no choices".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest::new(call.id, call.function.name, call.function.arguments))
            .collect();

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: response.model.unwrap_or_else(|| self.config.model.clone()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens.unwrap_or(u.prompt_tokens + u.completion_tokens),
            }),
            reasoning: choice.message.reasoning_content.filter(|r| !r.is_empty()),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_wire),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Completion> {
        let request = self.build_request(messages, tools, false);
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "Sending chat completion request"
        );

        let response = self.send(&request).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::LlmCall(format!("invalid response body: {e}")))?;

        let completion = self.completion_from(body)?;
        tracing::debug!(
            tool_calls = completion.tool_calls.len(),
            finish_reason = ?completion.finish_reason,
            "Received completion"
        );
        Ok(completion)
    }

    async fn generate_stream(&self, messages: &[Message]) -> Result<CompletionStream> {
        let request = self.build_request(messages, None, true);
        let response = self.send(&request).await?;
        let mut bytes = response.bytes_stream();

        let stream = async_stream::try_stream! {
            let mut buffer = SseBuffer::new();
            let mut done = false;

            while !done {
                let Some(chunk) = bytes.next().await else { break };
                let chunk = chunk
                    .map_err(|e| AgentError::LlmCall(format!("stream interrupted: {e}")))?;
                buffer.push_chunk(&chunk);

                while let Some(block) = buffer.next_event_block() {
                    for data in data_lines(&block) {
                        match data {
                            SseData::Done => done = true,
                            SseData::Json(json) if !done => {
                                if let Some(text) = chunk_text(json) {
                                    yield text;
                                }
                            }
                            SseData::Json(_) => {}
                        }
                    }
                }
            }

            if !done {
                if let Some(tail) = buffer.finish() {
                    for data in data_lines(&tail) {
                        if let SseData::Json(json) = data {
                            if let Some(text) = chunk_text(json) {
                                yield text;
                            }
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use vero_core::Tool;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> OpenAiClient {
        let config = OpenAiConfig::new("sk-test")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_model("test-model");
        OpenAiClient::new(config).unwrap()
    }

    fn add_schema() -> ToolSchema {
        Tool::builder("add")
            .description("Add two integers")
            .param("a", "int")
            .param_with_default("b", "int", 5)
            .sync_function(|args| Ok(args.get::<i64>("a")? + args.get::<i64>("b")?))
            .build()
            .unwrap()
            .schema()
            .clone()
    }

    async fn sent_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.unwrap();
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[tokio::test]
    async fn test_generate_with_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "test-model",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [
                            {"id": "call_1", "type": "function",
                             "function": {"name": "add", "arguments": "{\"a\": 1}"}},
                            {"id": "call_2", "type": "function",
                             "function": {"name": "add", "arguments": "{\"a\": 2}"}}
                        ]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let schemas = [add_schema()];
        let completion = client
            .generate(&[Message::system("sys"), Message::user("add 1")], Some(&schemas))
            .await
            .unwrap();

        assert_eq!(completion.content, "");
        let ids: Vec<&str> = completion.tool_calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["call_1", "call_2"]);
        assert_eq!(completion.tool_calls[0].raw_arguments, "{\"a\": 1}");
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert_eq!(completion.usage.unwrap().total_tokens, 20);

        let body = sent_body(&server).await;
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "add");
        assert_eq!(body["tools"][0]["function"]["parameters"]["required"], json!(["a"]));
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "add 1"}));
        assert!(body.get("stream").is_none());
    }

    #[tokio::test]
    async fn test_history_with_tool_results_is_serialized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "3"}, "finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let history = [
            Message::user("1 + 2?"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCallRequest::new("call_9", "add", "{\"a\": 1, \"b\": 2}")],
            ),
            Message::tool("3", "call_9"),
        ];
        let completion = client_for(&server).generate(&history, None).await.unwrap();
        assert_eq!(completion.content, "3");
        assert_eq!(completion.model, "test-model");

        let body = sent_body(&server).await;
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert_eq!(
            body["messages"][1]["tool_calls"][0],
            json!({
                "id": "call_9",
                "type": "function",
                "function": {"name": "add", "arguments": "{\"a\": 1, \"b\": 2}"}
            })
        );
        assert_eq!(
            body["messages"][2],
            json!({"role": "tool", "content": "3", "tool_call_id": "call_9"})
        );
    }

    #[tokio::test]
    async fn test_http_error_is_llm_call_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&[Message::user("hi")], None)
            .await
            .unwrap_err();
        match err {
            AgentError::LlmCall(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid api key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_llm_call_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&[Message::user("hi")], None).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmCall(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_llm_call_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&[Message::user("hi")], None).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmCall(msg) if msg.contains("no choices")));
    }

    #[tokio::test]
    async fn test_stream_fragments() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let stream = client.generate_stream(&[Message::user("hi")]).await.unwrap();
        let fragments: Vec<String> =
            stream.map(|f| f.unwrap()).collect::<Vec<_>>().await;
        assert_eq!(fragments, ["Hel", "lo"]);

        let body = sent_body(&server).await;
        assert_eq!(body["stream"], true);
    }

    #[tokio::test]
    async fn test_stream_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = client_for(&server).generate_stream(&[Message::user("hi")]).await;
        assert!(matches!(result, Err(AgentError::LlmCall(_))));
    }

    #[test]
    fn test_blank_model_rejected() {
        let err = OpenAiClient::new(OpenAiConfig::new("sk").with_model(" ")).err().unwrap();
        assert!(matches!(err, AgentError::LlmConfig(_)));
    }
}
