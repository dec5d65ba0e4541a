//! Capabilities generated at runtime.
//!
//! A generated capability is a script that declares its name at top level
//! (`name = "..."` or `name: str = "..."`), reads its input from stdin and
//! prints its result. The loader writes the source to the scratch module
//! path and registers a [`ScriptTool`] that runs it through the sandbox.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::base_tool::{BaseTool, ToolHandle};
use super::registry::{ToolConstructor, ToolRegistry};
use crate::utilities::errors::{LoadError, ToolError};
use crate::utilities::sandbox::Sandbox;
use crate::utilities::string_utils::strip_code_fences;

static NAME_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*name\s*(?::\s*str\s*)?=\s*["']([^"']+)["']"#).unwrap()
});

static DESCRIPTION_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*description\s*(?::\s*str\s*)?=\s*["']([^"']+)["']"#).unwrap()
});

/// The capability name declared by `source`, if any.
pub fn declared_name(source: &str) -> Option<String> {
    NAME_DECL
        .captures(source)
        .map(|c| c[1].trim().to_string())
        .filter(|n| !n.is_empty())
}

fn declared_description(source: &str) -> Option<String> {
    DESCRIPTION_DECL.captures(source).map(|c| c[1].trim().to_string())
}

/// A generated capability backed by a script on disk.
#[derive(Debug, Clone)]
pub struct ScriptTool {
    name: String,
    description: String,
    path: PathBuf,
    sandbox: Sandbox,
}

impl ScriptTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, path: PathBuf, sandbox: Sandbox) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            path,
            sandbox,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BaseTool for ScriptTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let out = self
            .sandbox
            .run_file(&self.path, input)
            .await
            .map_err(|e| ToolError::Execution {
                name: self.name.clone(),
                message: e.to_string(),
            })?;
        if out.success() {
            Ok(out.stdout)
        } else {
            Err(ToolError::Execution {
                name: self.name.clone(),
                message: format!("exit {:?}: {}", out.exit_code, out.stderr.trim()),
            })
        }
    }
}

/// Loads generated capability source into a [`ToolRegistry`].
#[derive(Debug, Clone)]
pub struct ScriptToolLoader {
    scratch_path: PathBuf,
    sandbox: Sandbox,
}

impl ScriptToolLoader {
    pub fn new(scratch_path: impl Into<PathBuf>, sandbox: Sandbox) -> Self {
        Self {
            scratch_path: scratch_path.into(),
            sandbox,
        }
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch_path
    }

    /// Write `source` to the scratch path and build the capability.
    ///
    /// Markdown fences around the source are removed first.
    pub fn load(&self, source: &str) -> Result<ScriptTool, LoadError> {
        let source = strip_code_fences(source);
        if source.trim().is_empty() {
            return Err(LoadError::EmptySource);
        }

        if let Some(parent) = self.scratch_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.scratch_path, &source)?;
        log::debug!("Generated tool written to {}", self.scratch_path.display());

        let name = declared_name(&source).ok_or_else(|| LoadError::NoDeclaredName {
            path: self.scratch_path.display().to_string(),
        })?;
        let description =
            declared_description(&source).unwrap_or_else(|| format!("Generated tool '{}'", name));

        Ok(ScriptTool::new(
            name,
            description,
            self.scratch_path.clone(),
            self.sandbox.clone(),
        ))
    }

    /// Load `source` and register it under its declared name.
    ///
    /// Returns the registered name.
    pub fn load_into(&self, source: &str, registry: &ToolRegistry) -> Result<String, LoadError> {
        let tool = self.load(source)?;
        let name = tool.name().to_string();
        let template = tool.clone();
        let constructor: ToolConstructor =
            Arc::new(move || Ok(Arc::new(template.clone()) as ToolHandle));
        registry.register(name.clone(), constructor, Arc::new(tool));
        Ok(name)
    }
}
