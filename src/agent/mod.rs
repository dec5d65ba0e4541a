//! Worker roles of the meta-crew.
//!
//! Each generation stage is bound to one fixed persona. A persona carries a
//! role, a goal, and a backstory, rendered into the system prompt of every
//! model call made on its behalf.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fixed persona bound to one or more pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
    RequirementAnalyst,
    AgentCreator,
    TaskCreator,
    ToolSelector,
    CodeGenerator,
    /// Reviews the proposal; runs on the supervisor model.
    Supervisor,
}

impl WorkerRole {
    pub const ALL: [WorkerRole; 6] = [
        WorkerRole::RequirementAnalyst,
        WorkerRole::AgentCreator,
        WorkerRole::TaskCreator,
        WorkerRole::ToolSelector,
        WorkerRole::CodeGenerator,
        WorkerRole::Supervisor,
    ];

    /// Short title of the persona.
    pub fn role(&self) -> &'static str {
        match self {
            Self::RequirementAnalyst => "Requirement Analyst",
            Self::AgentCreator => "Agent Creator",
            Self::TaskCreator => "Task Creator",
            Self::ToolSelector => "Tool Selector",
            Self::CodeGenerator => "Code Generator",
            Self::Supervisor => "Crew Supervisor",
        }
    }

    pub fn goal(&self) -> &'static str {
        match self {
            Self::RequirementAnalyst => {
                "Understand and extract key information from the user's problem description."
            }
            Self::AgentCreator => "Create agent definitions based on the analyzed requirements.",
            Self::TaskCreator => "Define tasks for the generated agents based on the requirements.",
            Self::ToolSelector => {
                "Select necessary tools for the agents and tasks from the available tools."
            }
            Self::CodeGenerator => {
                "Generate Python code for the new crew based on agent and task definitions."
            }
            Self::Supervisor => "Oversee the entire crew creation process and ensure quality.",
        }
    }

    pub fn backstory(&self) -> &'static str {
        match self {
            Self::RequirementAnalyst => {
                "An expert analyst skilled in breaking down complex problems into actionable \
                 requirements for AI agents. You focus on extracting the core needs, data \
                 sources, and desired outcomes."
            }
            Self::AgentCreator => {
                "A specialist in defining AI agents. You take requirements and translate them \
                 into clear, concise agent roles, goals, and backstories. You are also good at \
                 identifying necessary tools."
            }
            Self::TaskCreator => {
                "An expert in breaking down complex objectives into smaller, manageable tasks \
                 for AI agents. You ensure tasks are specific, measurable, achievable, relevant, \
                 and time-bound (SMART)."
            }
            Self::ToolSelector => {
                "A specialist in identifying the best tools for a given task. You have a \
                 comprehensive knowledge of available tools and their capabilities."
            }
            Self::CodeGenerator => {
                "An expert Python programmer skilled in generating clean, efficient, and \
                 well-documented code. You take agent and task definitions and output a \
                 complete, runnable CrewAI crew."
            }
            Self::Supervisor => {
                "A highly experienced AI project manager, responsible for guiding the \
                 meta-crew, making critical decisions, and ensuring the final output meets \
                 the user's needs."
            }
        }
    }

    pub fn is_supervisor(&self) -> bool {
        matches!(self, Self::Supervisor)
    }

    /// Role-playing system prompt for this persona.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role(),
            self.backstory(),
            self.goal()
        )
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_supervisor_is_supervisor() {
        let supervisors: Vec<_> = WorkerRole::ALL.iter().filter(|r| r.is_supervisor()).collect();
        assert_eq!(supervisors, vec![&WorkerRole::Supervisor]);
    }

    #[test]
    fn test_system_prompt_contains_persona() {
        let prompt = WorkerRole::ToolSelector.system_prompt();
        assert!(prompt.starts_with("You are Tool Selector."));
        assert!(prompt.contains("Your personal goal is: Select necessary tools"));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&WorkerRole::CodeGenerator).unwrap();
        assert_eq!(json, "\"code_generator\"");
        assert_eq!(WorkerRole::Supervisor.to_string(), "Crew Supervisor");
    }
}
