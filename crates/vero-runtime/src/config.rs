//! Client configuration

use std::str::FromStr;

use vero_core::{AgentError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "Qwen/Qwen3-32B";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI-compatible endpoint configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,

    /// API root, without the `/chat/completions` suffix
    pub base_url: String,

    pub model: String,

    pub temperature: f32,

    /// Response length cap; `None` leaves it to the server
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sent as `tool_choice` whenever tool schemas are attached
    pub tool_choice: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tool_choice: "auto".into(),
        }
    }

    /// Read `OPENAI_API_KEY` (required), `OPENAI_BASE_URL`, `MODEL_NAME`,
    /// `TEMPERATURE`, `TIMEOUT` and `MAX_TOKENS` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var("OPENAI_API_KEY")
            .ok_or_else(|| AgentError::LlmConfig("OPENAI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = var("MODEL_NAME") {
            config.model = model;
        }
        if let Some(raw) = var("TEMPERATURE") {
            config.temperature = parse_var("TEMPERATURE", &raw)?;
        }
        if let Some(raw) = var("TIMEOUT") {
            config.timeout_secs = parse_var("TIMEOUT", &raw)?;
        }
        if let Some(raw) = var("MAX_TOKENS") {
            config.max_tokens = Some(parse_var("MAX_TOKENS", &raw)?);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: impl Into<String>) -> Self {
        self.tool_choice = tool_choice.into();
        self
    }

    /// Full chat completions endpoint
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let missing = [
            ("api_key", &self.api_key),
            ("base_url", &self.base_url),
            ("model", &self.model),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AgentError::LlmConfig(format!("missing {}", missing.join(", "))))
        }
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| AgentError::LlmConfig(format!("invalid {key} '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = OpenAiConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "Qwen/Qwen3-32B");
        assert_eq!(config.timeout_secs, 60);
        assert!(config.max_tokens.is_none());
        assert_eq!(config.chat_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_missing_key() {
        for vars in [&[][..], &[("OPENAI_API_KEY", "  ")][..]] {
            let err = OpenAiConfig::from_lookup(lookup(vars)).unwrap_err();
            assert!(matches!(err, AgentError::LlmConfig(_)));
        }
    }

    #[test]
    fn test_overrides() {
        let config = OpenAiConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8000/v1/"),
            ("MODEL_NAME", "gpt-4o-mini"),
            ("TEMPERATURE", "0.2"),
            ("TIMEOUT", "15"),
            ("MAX_TOKENS", "512"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(config.chat_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_bad_number() {
        let err = OpenAiConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("TIMEOUT", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("TIMEOUT"));
    }

    #[test]
    fn test_validate() {
        assert!(OpenAiConfig::new("sk").validate().is_ok());
        let err = OpenAiConfig::new("").with_model("").validate().unwrap_err();
        assert_eq!(err.to_string(), "LLM configuration error: missing api_key, model");
    }
}
