//! Provider table of selectable models.

use serde::Serialize;

use crate::llm::{Provider, LLM};
use crate::llms::base_llm::DEFAULT_TEMPERATURE;
use crate::utilities::errors::LlmError;

/// One selectable model and its default sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LlmSpec {
    /// Key shown to the operator, e.g. `openai[gpt-4o-mini]`.
    pub name: &'static str,
    pub provider: Provider,
    pub model: &'static str,
    pub temperature: f64,
    pub top_p: f64,
    /// `(frequency, presence)` penalties, when the provider takes them.
    pub penalties: Option<(f64, f64)>,
}

const fn openai(name: &'static str, model: &'static str) -> LlmSpec {
    LlmSpec {
        name,
        provider: Provider::OpenAI,
        model,
        temperature: DEFAULT_TEMPERATURE,
        top_p: 1.0,
        penalties: Some((0.1, 0.1)),
    }
}

const fn plain(name: &'static str, provider: Provider, model: &'static str) -> LlmSpec {
    LlmSpec {
        name,
        provider,
        model,
        temperature: DEFAULT_TEMPERATURE,
        top_p: 1.0,
        penalties: None,
    }
}

const AVAILABLE_LLMS: &[LlmSpec] = &[
    openai("openai[gpt-4o-mini]", "gpt-4o-mini"),
    plain("ollama[llama3:70b]", Provider::Ollama, "llama3:70b"),
    plain("ollama[openhermes]", Provider::Ollama, "openhermes"),
    plain(
        "anthropic[claude-3-sonnet-20240229-v1:0]",
        Provider::Anthropic,
        "claude-3-sonnet-20240229-v1:0",
    ),
    plain("google[gemini-1.5-pro-latest]", Provider::Google, "gemini-1.5-pro-latest"),
    openai("openai[gpt-4]", "gpt-4"),
    openai("openai[gpt-3.5-turbo]", "gpt-3.5-turbo"),
];

/// The selectable models, in menu order.
pub fn available_llms() -> &'static [LlmSpec] {
    AVAILABLE_LLMS
}

pub fn find_llm(name: &str) -> Option<&'static LlmSpec> {
    AVAILABLE_LLMS.iter().find(|s| s.name == name)
}

impl LlmSpec {
    /// Build the configured client.
    pub fn build(&self) -> LLM {
        let llm = LLM::with_provider(self.model, self.provider)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p);
        match self.penalties {
            Some((frequency, presence)) => llm.with_penalties(frequency, presence),
            None => llm,
        }
    }
}

/// Build the model registered under `name`.
pub fn get_llm(name: &str) -> Result<LLM, LlmError> {
    let spec = find_llm(name).ok_or_else(|| LlmError::UnknownModel(name.to_string()))?;
    log::debug!("Creating LLM instance for: {}", name);
    Ok(spec.build())
}
