//! OpenAI-compatible chat completion provider.
//!
//! Talks to any endpoint implementing the Chat Completions API: OpenAI
//! itself, a local Ollama server, and the OpenAI-compatible gateways of
//! Anthropic and Google. Transient failures (transport errors, 429, 5xx)
//! are retried with exponential backoff; client errors are not.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::utilities::errors::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat Completions client.
#[derive(Debug, Clone)]
pub struct OpenAICompletion {
    pub model: String,
    /// Provider label used in logs and errors.
    pub provider: String,
    pub api_key: Option<String>,
    /// Environment variable the key is expected in, for error messages.
    pub api_key_env: Option<String>,
    /// Whether requests without a key are allowed (local servers).
    pub requires_api_key: bool,
    pub base_url: Option<String>,
    pub temperature: Option<f64>,
    /// Nucleus sampling parameter.
    pub top_p: Option<f64>,
    /// Frequency penalty (-2 to 2).
    pub frequency_penalty: Option<f64>,
    /// Presence penalty (-2 to 2).
    pub presence_penalty: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    pub timeout: Option<f64>,
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further attempt.
    pub retry_delay: Duration,
}

impl OpenAICompletion {
    /// Create a client for `model`, reading the key from `OPENAI_API_KEY`.
    pub fn new(model: impl Into<String>, api_key: Option<String>, base_url: Option<String>) -> Self {
        let api_key = api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());
        Self {
            model: model.into(),
            provider: "openai".to_string(),
            api_key,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            requires_api_key: true,
            base_url,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            max_tokens: None,
            timeout: None,
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base_url().trim_end_matches('/'))
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(top_p) = self.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }
        if let Some(freq_pen) = self.frequency_penalty {
            body["frequency_penalty"] = serde_json::json!(freq_pen);
        }
        if let Some(pres_pen) = self.presence_penalty {
            body["presence_penalty"] = serde_json::json!(pres_pen);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Parse a Chat Completions API response.
    pub fn parse_completions_response(&self, response: &Value) -> Result<String, LlmError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| LlmError::MalformedResponse("No message in response".to_string()))?;

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or("");

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "{} token usage: prompt={}, completion={}, total={}",
                self.provider,
                usage.get("prompt_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("completion_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("total_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
            );
        }

        Ok(content.to_string())
    }
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        log::debug!(
            "OpenAICompletion.acall: provider={}, model={}, messages={}",
            self.provider,
            self.model,
            messages.len(),
        );

        let api_key = match (&self.api_key, self.requires_api_key) {
            (Some(key), _) => Some(key.as_str()),
            (None, false) => None,
            (None, true) => {
                return Err(LlmError::MissingApiKey {
                    provider: self.provider.clone(),
                    env_var: self.api_key_env.clone().unwrap_or_default(),
                })
            }
        };

        let body = self.build_request_body(&messages);
        let endpoint = self.endpoint();

        let timeout_secs = self.timeout.unwrap_or(120.0);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(timeout_secs))
            .build()?;

        // Retry loop with exponential backoff
        let mut last_error = String::from("no attempt made");
        let mut retry_delay = self.retry_delay;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!(
                    "{} API retry attempt {} after {:?}",
                    self.provider,
                    attempt,
                    retry_delay
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let mut request = client
                .post(&endpoint)
                .header("Content-Type", "application/json");
            if let Some(key) = api_key {
                request = request.header("Authorization", format!("Bearer {}", key));
            }

            let response = match request.json(&body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = format!("Rate limited by {} API (429)", self.provider);
                continue;
            }

            if status.is_server_error() {
                last_error = format!("{} API server error: {}", self.provider, status);
                continue;
            }

            let response_text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            if status.is_client_error() {
                return Err(LlmError::Api {
                    provider: self.provider.clone(),
                    status: status.as_u16(),
                    body: response_text,
                });
            }

            let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
                let head: String = response_text.chars().take(500).collect();
                LlmError::MalformedResponse(format!("{} - Body: {}", e, head))
            })?;

            return self.parse_completions_response(&response_json);
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client(base_url: Option<String>) -> OpenAICompletion {
        let mut c = OpenAICompletion::new("gpt-4o-mini", Some("sk-test".into()), base_url);
        c.retry_delay = Duration::from_millis(5);
        c
    }

    /// Serve one canned HTTP response per incoming connection.
    async fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    let text = String::from_utf8_lossy(&request);
                    if let Some(end) = text.find("\r\n\r\n") {
                        let length = text[..end]
                            .lines()
                            .find_map(|l| {
                                let lower = l.to_ascii_lowercase();
                                lower
                                    .strip_prefix("content-length:")
                                    .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                            })
                            .unwrap_or(0);
                        if request.len() >= end + 4 + length {
                            break;
                        }
                    }
                }
                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });
        format!("http://{}/v1", addr)
    }

    const OK_BODY: &str =
        r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}],"usage":{"total_tokens":3}}"#;

    #[test]
    fn test_build_request_body() {
        let mut c = client(None);
        c.temperature = Some(0.7);
        c.top_p = Some(1.0);
        let body = c.build_request_body(&[LLMMessage::user("hi")]);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["top_p"], 1.0);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_completions_response() {
        let c = client(None);
        let json: Value = serde_json::from_str(OK_BODY).unwrap();
        assert_eq!(c.parse_completions_response(&json).unwrap(), "hello");
        assert!(matches!(
            c.parse_completions_response(&serde_json::json!({"choices": []})),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let c = client(Some("http://localhost:11434/v1/".into()));
        assert_eq!(c.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client(None).endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let mut c = client(None);
        c.api_key = None;
        let err = c.acall(vec![LLMMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey { env_var, .. } if env_var == "OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_retries_server_error_then_succeeds() {
        let base = serve(vec![(500, "{}"), (200, OK_BODY)]).await;
        let c = client(Some(base));
        assert_eq!(c.acall(vec![LLMMessage::user("hi")]).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let base = serve(vec![(401, r#"{"error":"bad key"}"#)]).await;
        let c = client(Some(base));
        let err = c.acall(vec![LLMMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let base = serve(vec![(503, "{}"), (503, "{}"), (503, "{}")]).await;
        let c = client(Some(base));
        let err = c.acall(vec![LLMMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::RetriesExhausted { attempts: 3, .. }));
    }
}
