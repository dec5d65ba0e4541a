//! Error types for the meta-crew generator.
//!
//! One enum per concern, plus the umbrella [`MetaCrewError`] used at the
//! flow and binary boundaries.

use std::time::Duration;

use thiserror::Error;

/// Errors from a language model invocation.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The requested model is not in the provider table.
    #[error("Invalid LLM choice: {0}")]
    UnknownModel(String),

    /// The provider requires an API key that is not configured.
    #[error("API key not set for provider '{provider}'. Set the {env_var} environment variable.")]
    MissingApiKey { provider: String, env_var: String },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-retryable error status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered with a body we could not interpret.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Every retry attempt failed.
    #[error("LLM call failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

/// Errors from capability construction, credential lookup, or execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A credential could not be read.
    #[error("Credential '{key}' could not be read: {message}")]
    Credential { key: String, message: String },

    /// Construction of a capability instance failed.
    #[error("Failed to construct tool '{name}': {message}")]
    Construction { name: String, message: String },

    /// The capability ran but failed.
    #[error("Tool '{name}' failed: {message}")]
    Execution { name: String, message: String },

    /// The capability is backed by an external service binding and cannot
    /// be invoked in-process.
    #[error("Tool '{0}' is provided by an external service binding and cannot run in-process")]
    Unbound(String),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors while loading a freshly generated capability module.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The generated source was empty.
    #[error("Generated tool source is empty")]
    EmptySource,

    /// The module does not declare its capability name.
    #[error("No tool name declaration found in {path}")]
    NoDeclaredName { path: String },

    /// Writing the scratch module failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors at the subprocess execution boundary.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The interpreter could not be started.
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The child did not exit within the configured limit.
    #[error("Execution timed out after {0:?}")]
    Timeout(Duration),

    /// Scratch file or pipe failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Umbrella error for the crate.
#[derive(Debug, Error)]
pub enum MetaCrewError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MetaCrewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_message_names_variable() {
        let err = LlmError::MissingApiKey {
            provider: "openai".to_string(),
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: MetaCrewError = LoadError::EmptySource.into();
        assert!(matches!(err, MetaCrewError::Load(LoadError::EmptySource)));
        assert_eq!(err.to_string(), "Generated tool source is empty");
    }
}
