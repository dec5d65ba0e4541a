//! A unit of delegated generation work.
//!
//! A `GenerationTask` pairs a worker role with a free-text description and
//! a description of the expected output. Executing it (see
//! [`crate::executor`]) yields opaque text.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::WorkerRole;

/// Description of one piece of delegated work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTask {
    pub id: Uuid,
    /// Stage name, e.g. `analyze_requirements`.
    pub name: String,
    /// Descriptive text detailing the task's purpose.
    pub description: String,
    /// Clear definition of expected task outcome.
    pub expected_output: String,
    /// Persona the work is delegated to.
    pub agent: WorkerRole,
    /// Names of capabilities advertised to the worker.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl GenerationTask {
    pub fn new(
        name: impl Into<String>,
        agent: WorkerRole,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    /// The user-turn prompt for this task.
    pub fn prompt(&self) -> String {
        let mut slices = vec![self.description.clone()];
        if !self.tools.is_empty() {
            slices.push(format!("Tools available to you: {}", self.tools.join(", ")));
        }
        slices.push(format!(
            "Expected Output: {}\nYou MUST return the actual complete content as the final answer, not a summary.",
            self.expected_output
        ));
        slices.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_expected_output() {
        let task = GenerationTask::new(
            "analyze_requirements",
            WorkerRole::RequirementAnalyst,
            "Analyze this.",
            "A summary.",
        );
        let prompt = task.prompt();
        assert!(prompt.starts_with("Analyze this."));
        assert!(prompt.contains("Expected Output: A summary."));
        assert!(!prompt.contains("Tools available"));
    }

    #[test]
    fn test_prompt_lists_tools() {
        let task = GenerationTask::new("select_tools", WorkerRole::ToolSelector, "Pick.", "A list.")
            .with_tools(vec!["Dynamic Tool Selector".into()]);
        assert!(task.prompt().contains("Tools available to you: Dynamic Tool Selector"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = GenerationTask::new("x", WorkerRole::Supervisor, "d", "e");
        let b = GenerationTask::new("x", WorkerRole::Supervisor, "d", "e");
        assert_ne!(a.id, b.id);
    }
}
