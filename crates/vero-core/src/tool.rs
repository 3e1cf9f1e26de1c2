//! Tool System
//!
//! A [`Tool`] is a named, described capability with a parameter schema and an
//! async body. Tools are assembled with [`ToolBuilder`]: each parameter is
//! declared with a primitive type and an optional default, and the JSON schema
//! handed to the model is derived from those declarations when the tool is
//! built. Registries are built once per agent and are read-only afterwards.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{AgentError, Result};
use crate::message::ToolCallRequest;

const DEFAULT_DESCRIPTION: &str = "No description provided.";

/// Primitive parameter types a tool schema can express
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Number,
    String,
    Boolean,
}

impl ParamType {
    /// Map a type annotation name to its schema type.
    pub fn from_annotation(annotation: &str) -> Option<Self> {
        match annotation.trim() {
            "int" | "integer" | "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64"
            | "isize" | "usize" => Some(ParamType::Integer),
            "float" | "number" | "f32" | "f64" => Some(ParamType::Number),
            "str" | "string" | "String" | "&str" => Some(ParamType::String),
            "bool" | "boolean" => Some(ParamType::Boolean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::String => value.is_string(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rust types usable as tool parameters
pub trait SchemaType {
    const PARAM_TYPE: ParamType;
}

macro_rules! schema_type {
    ($kind:ident => $($t:ty),+) => {
        $(impl SchemaType for $t {
            const PARAM_TYPE: ParamType = ParamType::$kind;
        })+
    };
}

schema_type!(Integer => i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);
schema_type!(Number => f32, f64);
schema_type!(String => String, &str);
schema_type!(Boolean => bool);

/// Parameter definition for tool schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: ParamType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters without a default are required
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Function schema handed to the model:
/// `{name, description, parameters: {type: "object", properties, required}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Validated arguments passed to a tool body, with defaults filled in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    /// Deserialize one argument
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .0
            .get(name)
            .with_context(|| format!("argument '{name}' was not provided"))?;
        serde_json::from_value(value.clone())
            .with_context(|| format!("argument '{name}' has an unexpected type"))
    }
}

/// Body of a tool. Implement this for tools that carry state; plain
/// functions go through [`ToolBuilder::function`] and
/// [`ToolBuilder::sync_function`].
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: ToolArgs) -> anyhow::Result<Value>;
}

type BoxedFn = Arc<dyn Fn(ToolArgs) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

struct FnHandler {
    f: BoxedFn,
}

#[async_trait]
impl ToolHandler for FnHandler {
    async fn call(&self, args: ToolArgs) -> anyhow::Result<Value> {
        (self.f)(args).await
    }
}

/// A named, schema-described, invocable capability
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    params: Vec<ParameterSchema>,
    schema: ToolSchema,
    handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Tool {
    pub fn builder(name: impl Into<String>) -> ToolBuilder {
        ToolBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.params
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    /// `name(a: integer, b: integer = 5)`
    pub fn signature(&self) -> String {
        let args: Vec<String> = self
            .params
            .iter()
            .map(|p| match &p.default {
                Some(default) if !p.required => {
                    format!("{}: {} = {}", p.name, p.param_type, default)
                }
                _ => format!("{}: {}", p.name, p.param_type),
            })
            .collect();
        format!("{}({})", self.name, args.join(", "))
    }

    /// One prompt line: `signature - description`
    pub fn summary(&self) -> String {
        format!("{} - {}", self.signature(), self.description)
    }

    /// Validate `arguments` against the declared parameters and run the body.
    ///
    /// Errors returned by the body, and panics raised inside it, come back as
    /// [`AgentError::ToolExecution`].
    pub async fn invoke(&self, arguments: Map<String, Value>) -> Result<String> {
        let args = self.bind(arguments)?;

        tracing::debug!(tool = %self.name, args = ?args, "Executing tool");
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.handler.call(args)).catch_unwind().await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(Ok(value)) => {
                tracing::info!(tool = %self.name, elapsed_ms, "Tool finished");
                Ok(render_output(value))
            }
            Ok(Err(e)) => Err(AgentError::ToolExecution {
                tool: self.name.clone(),
                message: format!("{e:#}"),
            }),
            Err(panic) => Err(AgentError::ToolExecution {
                tool: self.name.clone(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }

    fn bind(&self, mut supplied: Map<String, Value>) -> Result<ToolArgs> {
        if let Some(missing) = self
            .params
            .iter()
            .find(|p| p.required && !supplied.contains_key(&p.name))
        {
            return Err(AgentError::MissingArgument {
                tool: self.name.clone(),
                param: missing.name.clone(),
            });
        }

        let mut bound = Map::new();
        for param in &self.params {
            match supplied.remove(&param.name) {
                Some(value) if !param.param_type.accepts(&value) => {
                    return Err(AgentError::ArgumentParse {
                        tool: self.name.clone(),
                        message: format!(
                            "'{}' must be {}, got {}",
                            param.name, param.param_type, value
                        ),
                    });
                }
                Some(value) => {
                    bound.insert(param.name.clone(), value);
                }
                None => {
                    if let Some(default) = &param.default {
                        bound.insert(param.name.clone(), default.clone());
                    }
                }
            }
        }

        if !supplied.is_empty() {
            let ignored: Vec<&String> = supplied.keys().collect();
            tracing::debug!(tool = %self.name, ?ignored, "Ignoring undeclared arguments");
        }

        Ok(ToolArgs(bound))
    }
}

fn render_output(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".into()
    }
}

/// Builds a [`Tool`] from parameter declarations and a body.
///
/// Declaration problems are collected and reported by [`ToolBuilder::build`],
/// so a tool either comes out fully formed or not at all.
pub struct ToolBuilder {
    name: String,
    description: Option<String>,
    params: Vec<ParameterSchema>,
    handler: Option<Arc<dyn ToolHandler>>,
    error: Option<AgentError>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
            handler: None,
            error: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a required parameter by its type annotation
    pub fn param(self, name: impl Into<String>, annotation: &str) -> Self {
        self.declare(name.into(), annotation, None)
    }

    /// Declare an optional parameter by its type annotation
    pub fn param_with_default(
        self,
        name: impl Into<String>,
        annotation: &str,
        default: impl Into<Value>,
    ) -> Self {
        self.declare(name.into(), annotation, Some(default.into()))
    }

    pub fn required<T: SchemaType>(self, name: impl Into<String>) -> Self {
        self.push(name.into(), T::PARAM_TYPE, None)
    }

    pub fn optional<T: SchemaType + Serialize>(self, name: impl Into<String>, default: T) -> Self {
        let name = name.into();
        match serde_json::to_value(default) {
            Ok(default) => self.push(name, T::PARAM_TYPE, Some(default)),
            Err(e) => self.fail(AgentError::Config(format!(
                "default for parameter '{name}' is not serializable: {e}"
            ))),
        }
    }

    pub fn param_description(
        mut self,
        name: &str,
        description: impl Into<String>,
    ) -> Self {
        match self.params.iter().position(|p| p.name == name) {
            Some(i) => {
                self.params[i].description = Some(description.into());
                self
            }
            None => {
                let tool = self.name.clone();
                self.fail(AgentError::Config(format!(
                    "tool '{tool}' has no parameter '{name}' to describe"
                )))
            }
        }
    }

    pub fn handler(mut self, handler: impl ToolHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Use an async function as the body
    pub fn function<F, Fut, T>(self, f: F) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let f: BoxedFn = Arc::new(move |args| -> BoxFuture<'static, anyhow::Result<Value>> {
            let fut = f(args);
            Box::pin(async move {
                let output = fut.await?;
                Ok(serde_json::to_value(output)?)
            })
        });
        self.handler(FnHandler { f })
    }

    /// Use a synchronous function as the body
    pub fn sync_function<F, T>(self, f: F) -> Self
    where
        F: Fn(&ToolArgs) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize,
    {
        let f: BoxedFn = Arc::new(move |args| -> BoxFuture<'static, anyhow::Result<Value>> {
            let result = f(&args).and_then(|output| Ok(serde_json::to_value(output)?));
            Box::pin(future::ready(result))
        });
        self.handler(FnHandler { f })
    }

    pub fn build(self) -> Result<Tool> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.name.trim().is_empty() {
            return Err(AgentError::Config("tool name must not be empty".into()));
        }
        let handler = self
            .handler
            .ok_or_else(|| AgentError::Config(format!("tool '{}' has no body", self.name)))?;
        let description = self
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.into());

        let schema = ToolSchema {
            name: self.name.clone(),
            description: description.clone(),
            parameters: parameters_schema(&self.params),
        };

        Ok(Tool {
            name: self.name,
            description,
            params: self.params,
            schema,
            handler,
        })
    }

    fn declare(self, name: String, annotation: &str, default: Option<Value>) -> Self {
        match ParamType::from_annotation(annotation) {
            Some(param_type) => self.push(name, param_type, default),
            None => self.fail(AgentError::UnsupportedParameterType {
                param: name,
                annotation: annotation.to_string(),
            }),
        }
    }

    fn push(mut self, name: String, param_type: ParamType, default: Option<Value>) -> Self {
        if self.params.iter().any(|p| p.name == name) {
            let tool = self.name.clone();
            return self.fail(AgentError::Config(format!(
                "tool '{tool}' declares parameter '{name}' twice"
            )));
        }
        if let Some(default) = &default {
            if !default.is_null() && !param_type.accepts(default) {
                return self.fail(AgentError::Config(format!(
                    "default {default} for parameter '{name}' is not {param_type}"
                )));
            }
        }
        self.params.push(ParameterSchema {
            name,
            param_type,
            description: None,
            required: default.is_none(),
            default,
        });
        self
    }

    fn fail(mut self, err: AgentError) -> Self {
        self.error.get_or_insert(err);
        self
    }
}

fn parameters_schema(params: &[ParameterSchema]) -> Value {
    let mut properties = Map::new();
    for param in params {
        let mut property = json!({ "type": param.param_type.as_str() });
        if let Some(description) = &param.description {
            property["description"] = json!(description);
        }
        if let Some(default) = &param.default {
            property["default"] = default.clone();
        }
        properties.insert(param.name.clone(), property);
    }
    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Registry for available tools, in registration order
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<String, usize>,
    schemas: Vec<ToolSchema>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate names
    pub fn from_tools(tools: impl IntoIterator<Item = Tool>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a new tool
    pub fn register(&mut self, tool: Tool) -> Result<()> {
        if self.index.contains_key(tool.name()) {
            return Err(AgentError::DuplicateTool(tool.name().to_string()));
        }
        self.index.insert(tool.name().to_string(), self.tools.len());
        self.schemas.push(tool.schema().clone());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(Tool::name).collect()
    }

    /// Function schemas for every tool
    pub fn schemas(&self) -> &[ToolSchema] {
        &self.schemas
    }

    /// One `signature - description` line per tool
    pub fn descriptions(&self) -> String {
        self.tools
            .iter()
            .map(Tool::summary)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve and run one tool call request
    pub async fn dispatch(&self, request: &ToolCallRequest) -> Result<String> {
        let tool = self
            .get(&request.tool_name)
            .ok_or_else(|| AgentError::ToolNotFound(request.tool_name.clone()))?;
        let arguments = parse_arguments(&request.tool_name, &request.raw_arguments)?;
        tool.invoke(arguments).await
    }
}

/// Parse a raw argument payload into a JSON object. An empty payload means
/// no arguments.
pub fn parse_arguments(tool: &str, raw: &str) -> Result<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AgentError::ArgumentParse {
            tool: tool.to_string(),
            message: format!("arguments must be a JSON object, got {other}"),
        }),
        Err(e) => Err(AgentError::ArgumentParse {
            tool: tool.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_tool() -> Tool {
        Tool::builder("add")
            .description("Add two numbers")
            .param("a", "int")
            .param_with_default("b", "int", 5)
            .sync_function(|args| Ok(args.get::<i64>("a")? + args.get::<i64>("b")?))
            .build()
            .unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_schema_from_declarations() {
        let tool = add_tool();
        let params = &tool.schema().parameters;

        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["a"]["type"], "integer");
        assert_eq!(params["properties"]["b"]["type"], "integer");
        assert_eq!(params["properties"]["b"]["default"], 5);
        assert!(params["properties"]["a"].get("default").is_none());
        assert_eq!(params["required"], json!(["a"]));
        assert_eq!(tool.schema().name, "add");
        assert_eq!(tool.schema().description, "Add two numbers");
    }

    #[test]
    fn test_typed_shorthands_match_annotations() {
        let tool = Tool::builder("search")
            .required::<String>("query")
            .optional("top_k", 5_u32)
            .optional("exact", false)
            .optional("threshold", 0.5_f64)
            .sync_function(|_| Ok("ok"))
            .build()
            .unwrap();
        let props = &tool.schema().parameters["properties"];
        assert_eq!(props["query"]["type"], "string");
        assert_eq!(props["top_k"]["type"], "integer");
        assert_eq!(props["exact"]["type"], "boolean");
        assert_eq!(props["threshold"]["type"], "number");
        assert_eq!(tool.description(), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_unsupported_annotation_fails_build() {
        let err = Tool::builder("search")
            .param("query", "str")
            .param("filters", "Optional[Dict[str, str]]")
            .sync_function(|_| Ok(()))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::UnsupportedParameterType { param, .. } if param == "filters"
        ));
    }

    #[test]
    fn test_build_rejects_bad_declarations() {
        let no_body = Tool::builder("x").param("a", "int").build();
        assert!(matches!(no_body, Err(AgentError::Config(_))));

        let twice = Tool::builder("x")
            .param("a", "int")
            .param("a", "str")
            .sync_function(|_| Ok(()))
            .build();
        assert!(matches!(twice, Err(AgentError::Config(_))));

        let bad_default = Tool::builder("x")
            .param_with_default("a", "int", "five")
            .sync_function(|_| Ok(()))
            .build();
        assert!(matches!(bad_default, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_signature_and_summary() {
        let tool = add_tool();
        assert_eq!(tool.signature(), "add(a: integer, b: integer = 5)");
        assert_eq!(tool.summary(), "add(a: integer, b: integer = 5) - Add two numbers");
    }

    #[tokio::test]
    async fn test_invoke_fills_defaults() {
        let tool = add_tool();
        assert_eq!(tool.invoke(object(json!({"a": 1}))).await.unwrap(), "6");
        assert_eq!(tool.invoke(object(json!({"a": 1, "b": 2}))).await.unwrap(), "3");
    }

    #[tokio::test]
    async fn test_invoke_missing_argument() {
        let err = add_tool().invoke(object(json!({"b": 2}))).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::MissingArgument { tool, param } if tool == "add" && param == "a"
        ));
    }

    #[tokio::test]
    async fn test_invoke_type_mismatch() {
        let err = add_tool().invoke(object(json!({"a": "one"}))).await.unwrap_err();
        assert!(matches!(err, AgentError::ArgumentParse { .. }));
    }

    #[tokio::test]
    async fn test_body_error_becomes_execution_error() {
        let tool = Tool::builder("fail")
            .sync_function(|_| -> anyhow::Result<()> { anyhow::bail!("disk on fire") })
            .build()
            .unwrap();
        let err = tool.invoke(Map::new()).await.unwrap_err();
        match err {
            AgentError::ToolExecution { tool, message } => {
                assert_eq!(tool, "fail");
                assert!(message.contains("disk on fire"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_body_panic_becomes_execution_error() {
        let tool = Tool::builder("explode")
            .function(|_| async {
                let readings: Vec<u32> = Vec::new();
                Ok::<_, anyhow::Error>(readings[3])
            })
            .build()
            .unwrap();
        let err = tool.invoke(Map::new()).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::ToolExecution { message, .. } if message.contains("index out of bounds")
        ));
    }

    #[tokio::test]
    async fn test_async_function_body() {
        let tool = Tool::builder("echo")
            .required::<String>("text")
            .function(|args| async move {
                let text: String = args.get("text")?;
                Ok::<_, anyhow::Error>(json!({ "echo": text }))
            })
            .build()
            .unwrap();
        let out = tool.invoke(object(json!({"text": "hi", "extra": 1}))).await.unwrap();
        assert_eq!(out, r#"{"echo":"hi"}"#);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let err = ToolRegistry::from_tools([add_tool(), add_tool()]).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(name) if name == "add"));
    }

    #[test]
    fn test_registry_keeps_order() {
        let echo = Tool::builder("echo").sync_function(|_| Ok("")).build().unwrap();
        let registry = ToolRegistry::from_tools([echo, add_tool()]).unwrap();
        assert_eq!(registry.names(), ["echo", "add"]);
        assert_eq!(registry.schemas()[1].name, "add");
        assert!(registry.get("add").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(
            registry.descriptions(),
            "echo() - No description provided.\nadd(a: integer, b: integer = 5) - Add two numbers"
        );
    }

    #[tokio::test]
    async fn test_dispatch() {
        let registry = ToolRegistry::from_tools([add_tool()]).unwrap();

        let ok = ToolCallRequest::new("1", "add", r#"{"a": 2, "b": 3}"#);
        assert_eq!(registry.dispatch(&ok).await.unwrap(), "5");

        let unknown = ToolCallRequest::new("2", "mul", "{}");
        assert!(matches!(
            registry.dispatch(&unknown).await,
            Err(AgentError::ToolNotFound(name)) if name == "mul"
        ));

        let garbled = ToolCallRequest::new("3", "add", "{a: 2");
        assert!(matches!(
            registry.dispatch(&garbled).await,
            Err(AgentError::ArgumentParse { .. })
        ));

        let not_object = ToolCallRequest::new("4", "add", "[1, 2]");
        assert!(matches!(
            registry.dispatch(&not_object).await,
            Err(AgentError::ArgumentParse { .. })
        ));
    }

    #[test]
    fn test_empty_arguments_payload() {
        assert!(parse_arguments("x", "  ").unwrap().is_empty());
    }
}
