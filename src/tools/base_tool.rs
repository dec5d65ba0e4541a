//! Base tool definitions.
//!
//! Provides the capability interface shared by catalog tools, the keyword
//! selector, and tools generated at runtime: `EnvVar` and the `BaseTool`
//! trait with its single `run(input) -> output` contract.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utilities::errors::ToolError;

// ---------------------------------------------------------------------------
// EnvVar
// ---------------------------------------------------------------------------

/// Environment variable definition used by a tool.
///
/// Describes a credential or connection parameter the tool requires or
/// optionally uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Name of the environment variable.
    pub name: String,
    /// Human-readable description of the environment variable.
    pub description: String,
    /// Whether the environment variable is required.
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl EnvVar {
    /// Create a new required environment variable.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }

    /// Create a new optional environment variable.
    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
        }
    }
}

// ---------------------------------------------------------------------------
// BaseTool trait
// ---------------------------------------------------------------------------

/// The capability interface.
///
/// Implementors provide a unique `name`, a `description` telling a model
/// how and when to use the tool, and `run`, which takes free-text input and
/// returns free-text output.
#[async_trait]
pub trait BaseTool: Send + Sync + fmt::Debug {
    /// The unique name of the tool that clearly communicates its purpose.
    fn name(&self) -> &str;

    /// Description used to tell the model how/when/why to use the tool.
    fn description(&self) -> &str;

    /// Environment variables used by the tool.
    fn env_vars(&self) -> &[EnvVar] {
        &[]
    }

    /// Execute the tool.
    async fn run(&self, input: &str) -> Result<String, ToolError>;
}

/// Shared handle to a materialised tool instance.
///
/// The registry hands out clones of the same `Arc`, so repeated lookups are
/// identity-equal (`Arc::ptr_eq`).
pub type ToolHandle = Arc<dyn BaseTool>;

/// Render a one-line summary per tool, as advertised to a model.
pub fn describe_tools(tools: &[ToolHandle]) -> String {
    tools
        .iter()
        .map(|t| format!("- {}: {}", t.name(), t.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl BaseTool for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn description(&self) -> &str {
            "Repeats its input."
        }

        async fn run(&self, input: &str) -> Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    #[test]
    fn test_env_var_constructors() {
        let required = EnvVar::new("SERPER_API_KEY", "Serper key");
        assert!(required.required);
        let optional = EnvVar::optional("DATABASE_URI", "Connection string");
        assert!(!optional.required);
    }

    #[test]
    fn test_env_var_deserialize_defaults_required() {
        let var: EnvVar =
            serde_json::from_str(r#"{"name":"EXA_API_KEY","description":"Exa"}"#).unwrap();
        assert!(var.required);
    }

    #[tokio::test]
    async fn test_default_env_vars_and_run() {
        let tool: ToolHandle = Arc::new(Echo);
        assert!(tool.env_vars().is_empty());
        assert_eq!(tool.run("hi").await.unwrap(), "hi");
        assert_eq!(describe_tools(&[tool]), "- Echo: Repeats its input.");
    }
}
