//! Capability implementations backing the catalog.
//!
//! Local file-system tools and the code interpreter run in-process (the
//! interpreter through the sandbox). Service-backed capabilities are
//! represented by [`ExternalTool`], a descriptor-backed handle that records
//! the capability and its credentials for generated crews; its behaviour
//! lives in the external service binding.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::base_tool::{BaseTool, EnvVar};
use crate::utilities::errors::ToolError;
use crate::utilities::sandbox::Sandbox;

// ---------------------------------------------------------------------------
// ExternalTool
// ---------------------------------------------------------------------------

/// A capability provided by an external service.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    name: String,
    description: String,
    env_vars: Vec<EnvVar>,
    /// Connection parameter for database-backed tools.
    connection: Option<String>,
}

impl ExternalTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, env_vars: Vec<EnvVar>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            env_vars,
            connection: None,
        }
    }

    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }
}

#[async_trait]
impl BaseTool for ExternalTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn env_vars(&self) -> &[EnvVar] {
        &self.env_vars
    }

    async fn run(&self, _input: &str) -> Result<String, ToolError> {
        Err(ToolError::Unbound(self.name.clone()))
    }
}

// ---------------------------------------------------------------------------
// FileReadTool
// ---------------------------------------------------------------------------

/// Reads a file; input is the path.
#[derive(Debug, Clone, Default)]
pub struct FileReadTool;

#[async_trait]
impl BaseTool for FileReadTool {
    fn name(&self) -> &str {
        "FileReadTool"
    }

    fn description(&self) -> &str {
        "Reads the full content of a file. Input: the file path."
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let path = PathBuf::from(input.trim());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::Execution {
                name: self.name().to_string(),
                message: format!("{}: {}", path.display(), e),
            })
    }
}

// ---------------------------------------------------------------------------
// DirectoryReadTool
// ---------------------------------------------------------------------------

/// Lists a directory; input is the path (defaults to `.`).
#[derive(Debug, Clone, Default)]
pub struct DirectoryReadTool;

#[async_trait]
impl BaseTool for DirectoryReadTool {
    fn name(&self) -> &str {
        "DirectoryReadTool"
    }

    fn description(&self) -> &str {
        "Lists the entries of a directory, one per line. Input: the directory path."
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let dir = match input.trim() {
            "" => PathBuf::from("."),
            p => PathBuf::from(p),
        };
        let mut reader = tokio::fs::read_dir(&dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();
        Ok(names.join("\n"))
    }
}

// ---------------------------------------------------------------------------
// CodeInterpreterTool
// ---------------------------------------------------------------------------

/// Runs a code snippet in the sandboxed interpreter; input is the source.
#[derive(Debug, Clone)]
pub struct CodeInterpreterTool {
    sandbox: Sandbox,
}

impl CodeInterpreterTool {
    pub fn new(sandbox: Sandbox) -> Self {
        Self { sandbox }
    }
}

impl Default for CodeInterpreterTool {
    fn default() -> Self {
        Self::new(Sandbox::new("python3", "py", Duration::from_secs(60)))
    }
}

#[async_trait]
impl BaseTool for CodeInterpreterTool {
    fn name(&self) -> &str {
        "CodeInterpreterTool"
    }

    fn description(&self) -> &str {
        "Executes code in an isolated subprocess and returns its output."
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let out = self
            .sandbox
            .run_source(input, "")
            .await
            .map_err(|e| ToolError::Execution {
                name: self.name().to_string(),
                message: e.to_string(),
            })?;
        if out.success() {
            Ok(out.stdout)
        } else {
            Err(ToolError::Execution {
                name: self.name().to_string(),
                message: format!("exit {:?}: {}", out.exit_code, out.stderr),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_external_tool_is_unbound() {
        let tool = ExternalTool::new(
            "SerperDevTool",
            "Google search",
            vec![EnvVar::new("SERPER_API_KEY", "key")],
        );
        assert_eq!(tool.env_vars().len(), 1);
        assert!(matches!(
            tool.run("rust").await,
            Err(ToolError::Unbound(name)) if name == "SerperDevTool"
        ));
    }

    #[tokio::test]
    async fn test_file_read_tool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello notes").unwrap();

        let out = FileReadTool.run(path.to_str().unwrap()).await.unwrap();
        assert_eq!(out, "hello notes");
        assert!(FileReadTool.run("/definitely/missing.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_directory_read_tool_sorted_with_dir_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();

        let out = DirectoryReadTool.run(dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(out, "a/\nb.txt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_code_interpreter_reports_failure() {
        let tool = CodeInterpreterTool::new(Sandbox::new("sh", "sh", Duration::from_secs(5)));
        assert_eq!(tool.run("echo 42").await.unwrap().trim(), "42");
        assert!(tool.run("exit 1").await.is_err());
    }
}
