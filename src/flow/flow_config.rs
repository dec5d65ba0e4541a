//! Flow configuration.
//!
//! Output locations, the interpreter used for generated code, the subprocess
//! time limit, and the default-classification policy. Loadable from YAML;
//! every field has a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::state::RequestType;
use crate::utilities::errors::MetaCrewError;
use crate::utilities::sandbox::Sandbox;

/// Configuration for one crew-creation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Pipeline for requests mentioning neither "crew" nor "tool".
    pub default_request_type: RequestType,
    /// Directory the generated files are written to.
    pub output_dir: PathBuf,
    pub crew_filename: String,
    pub tool_filename: String,
    /// Where a generated tool is written before loading, relative to
    /// `output_dir`.
    pub scratch_tool_path: PathBuf,
    /// Interpreter command for generated code.
    pub runtime: String,
    /// Extension of generated source files, without the dot.
    pub source_extension: String,
    /// Wall-clock limit for one generated-code run.
    pub run_timeout_secs: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            default_request_type: RequestType::Code,
            output_dir: PathBuf::from("."),
            crew_filename: "generated_crew.py".to_string(),
            tool_filename: "generated_tool.py".to_string(),
            scratch_tool_path: PathBuf::from("tools").join("temp_tool.py"),
            runtime: "python3".to_string(),
            source_extension: "py".to_string(),
            run_timeout_secs: 300,
        }
    }
}

impl FlowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The simplified variant: unclassified requests build a crew.
    pub fn simple() -> Self {
        Self {
            default_request_type: RequestType::Crew,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, MetaCrewError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, MetaCrewError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        log::info!("Loaded flow configuration from {}", path.display());
        Ok(config)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.output_dir.join(&self.scratch_tool_path)
    }

    /// Sandbox configured for generated code.
    pub fn sandbox(&self) -> Sandbox {
        Sandbox::new(&self.runtime, &self.source_extension, self.run_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FlowConfig::default();
        assert_eq!(config.default_request_type, RequestType::Code);
        assert_eq!(config.crew_filename, "generated_crew.py");
        assert_eq!(config.tool_filename, "generated_tool.py");
        assert_eq!(config.run_timeout(), Duration::from_secs(300));
        assert_eq!(config.scratch_path(), PathBuf::from("./tools/temp_tool.py"));
    }

    #[test]
    fn test_simple_variant_only_changes_default() {
        let simple = FlowConfig::simple();
        assert_eq!(simple.default_request_type, RequestType::Crew);
        assert_eq!(
            FlowConfig {
                default_request_type: RequestType::Code,
                ..simple
            },
            FlowConfig::default()
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = FlowConfig::from_yaml_str("default_request_type: crew\nrun_timeout_secs: 30\n").unwrap();
        assert_eq!(config.default_request_type, RequestType::Crew);
        assert_eq!(config.run_timeout_secs, 30);
        assert_eq!(config.runtime, "python3");
    }

    #[test]
    fn test_yaml_file_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.yaml");
        std::fs::write(&path, "output_dir: out\nruntime: python\n").unwrap();
        let config = FlowConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.sandbox().runtime(), "python");

        assert!(FlowConfig::from_yaml_str("default_request_type: agent").is_err());
        assert!(FlowConfig::from_yaml_file(&dir.path().join("missing.yaml")).is_err());
    }
}
