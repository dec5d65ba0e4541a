//! Main LLM struct.
//!
//! [`LLM`] wraps a language model with its provider and sampling settings.
//! Every supported provider speaks the Chat Completions protocol, so calls
//! go through [`OpenAICompletion`] configured with the provider's base URL
//! and API-key variable.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::llms::providers::openai::OpenAICompletion;
use crate::utilities::errors::LlmError;

/// Anthropic model name prefixes.
pub const ANTHROPIC_PREFIXES: &[&str] = &["anthropic/", "claude-", "claude/"];

/// Model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Ollama,
    Anthropic,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }

    /// Chat Completions base URL.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    /// Environment variable holding the API key; `None` for local servers.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Google => Some("GEMINI_API_KEY"),
        }
    }

    /// Infer the provider from a model name.
    pub fn infer(model: &str) -> Self {
        let lower = model.to_lowercase();
        if let Some((prefix, _)) = lower.split_once('/') {
            match prefix {
                "openai" => return Self::OpenAI,
                "anthropic" | "claude" => return Self::Anthropic,
                "google" | "gemini" => return Self::Google,
                "ollama" => return Self::Ollama,
                _ => {}
            }
        }
        if ANTHROPIC_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            Self::Anthropic
        } else if lower.starts_with("gemini") {
            Self::Google
        } else if ["gpt-", "o1", "o3", "o4"].iter().any(|p| lower.starts_with(p)) {
            Self::OpenAI
        } else {
            Self::Ollama
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            "google" | "gemini" => Ok(Self::Google),
            other => Err(LlmError::UnknownModel(format!("unsupported provider '{}'", other))),
        }
    }
}

/// A configured language model.
#[derive(Debug, Clone)]
pub struct LLM {
    pub model: String,
    pub provider: Provider,
    client: OpenAICompletion,
}

impl LLM {
    /// Create an LLM for `model`, inferring the provider from its name.
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        let provider = Provider::infer(&model);
        Self::with_provider(model, provider)
    }

    /// Create an LLM for `model` served by `provider`.
    pub fn with_provider(model: impl Into<String>, provider: Provider) -> Self {
        let model = model.into();
        let api_key = provider.api_key_env().and_then(|var| std::env::var(var).ok());
        let mut client = OpenAICompletion::new(model.clone(), None, Some(provider.base_url().to_string()));
        // Only the provider's own variable counts.
        client.api_key = api_key;
        client.provider = provider.as_str().to_string();
        client.api_key_env = provider.api_key_env().map(str::to_string);
        client.requires_api_key = provider.api_key_env().is_some();
        Self {
            model,
            provider,
            client,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.client.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.client.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.client.top_p = Some(top_p);
        self
    }

    pub fn with_penalties(mut self, frequency: f64, presence: f64) -> Self {
        self.client.frequency_penalty = Some(frequency);
        self.client.presence_penalty = Some(presence);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.client.max_retries = max_retries;
        self
    }

    /// The underlying Chat Completions client.
    pub fn client(&self) -> &OpenAICompletion {
        &self.client
    }
}

#[async_trait]
impl BaseLLM for LLM {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        self.provider.as_str()
    }

    fn temperature(&self) -> Option<f64> {
        self.client.temperature
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        self.client.acall(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_provider() {
        assert_eq!(Provider::infer("gpt-4o-mini"), Provider::OpenAI);
        assert_eq!(Provider::infer("claude-3-sonnet-20240229-v1:0"), Provider::Anthropic);
        assert_eq!(Provider::infer("gemini-1.5-pro-latest"), Provider::Google);
        assert_eq!(Provider::infer("llama3:70b"), Provider::Ollama);
        assert_eq!(Provider::infer("anthropic/claude-3"), Provider::Anthropic);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Google);
        assert!("bedrock".parse::<Provider>().is_err());
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let llm = LLM::with_provider("openhermes", Provider::Ollama);
        assert!(!llm.client().requires_api_key);
        assert!(llm.client().api_key.is_none());
        assert_eq!(llm.client().api_base_url(), "http://localhost:11434/v1");
    }

    #[test]
    fn test_builder_settings_reach_request_body() {
        let llm = LLM::with_provider("gpt-4", Provider::OpenAI)
            .with_temperature(0.7)
            .with_top_p(1.0)
            .with_penalties(0.1, 0.1);
        assert_eq!(llm.temperature(), Some(0.7));
        let body = llm.client().build_request_body(&[LLMMessage::user("x")]);
        assert_eq!(body["frequency_penalty"], 0.1);
        assert_eq!(body["presence_penalty"], 0.1);
    }
}
