//! Base LLM trait.
//!
//! Defines the chat-message type and the interface every language model
//! client implements.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utilities::errors::LlmError;

/// Default sampling temperature of the provider table.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    /// Role of the message sender ("system", "user", "assistant").
    pub role: String,
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Interface of a chat language model.
///
/// Implementations should handle timeouts, authentication failures and
/// malformed responses by returning an [`LlmError`], never by panicking.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Get the model identifier/name.
    fn model(&self) -> &str;

    /// Get the provider name.
    fn provider(&self) -> &str {
        "openai"
    }

    fn temperature(&self) -> Option<f64>;

    /// Send `messages` and return the text of the reply.
    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let sys = LLMMessage::system("persona");
        assert_eq!(sys.role, "system");
        let user = LLMMessage::user("do it");
        assert_eq!(user.role, "user");
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({"role": "user", "content": "do it"})
        );
    }
}
