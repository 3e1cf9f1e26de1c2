//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// The remote model call failed (network, auth, provider error)
    #[error("LLM call failed: {0}")]
    LlmCall(String),

    /// The LLM client is missing required configuration
    #[error("LLM configuration error: {0}")]
    LlmConfig(String),

    /// Tool not found in registry
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// Tool arguments could not be parsed or do not fit the schema
    #[error("Invalid arguments for tool '{tool}': {message}")]
    ArgumentParse { tool: String, message: String },

    /// A required tool parameter was not supplied
    #[error("Missing required argument '{param}' for tool '{tool}'")]
    MissingArgument { tool: String, param: String },

    /// A parameter was declared with a type the schema cannot express
    #[error("Unsupported type '{annotation}' for parameter '{param}'")]
    UnsupportedParameterType { param: String, annotation: String },

    /// Two tools with the same name were registered
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    /// The tool body itself failed
    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// Maximum turns reached in the reasoning loop
    #[error("Reached max turns ({0}) without a final answer")]
    MaxIterations(usize),

    /// Role name outside system | user | assistant | tool
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Whether the model can plausibly correct this error if it is fed back
    /// as a tool message.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::ToolNotFound(_)
                | AgentError::ArgumentParse { .. }
                | AgentError::MissingArgument { .. }
                | AgentError::ToolExecution { .. }
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::LlmCall(msg) => format!("The AI service encountered an error: {msg}"),
            AgentError::LlmConfig(_) => {
                "The AI service is not configured. Check your API key and base URL.".into()
            }
            AgentError::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            AgentError::ArgumentParse { message, .. } => format!("Invalid tool input: {message}"),
            AgentError::MissingArgument { param, .. } => {
                format!("Invalid tool input: '{param}' is required")
            }
            AgentError::ToolExecution { message, .. } => format!("Tool error: {message}"),
            AgentError::MaxIterations(_) => {
                "The request took too many steps to answer. Please try a simpler query.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}
