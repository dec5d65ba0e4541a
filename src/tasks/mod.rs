//! Generation task factory.
//!
//! One pure constructor per pipeline stage. Each binds its work to a fixed
//! [`WorkerRole`] and interpolates the artifacts produced so far.

pub mod prompts;

use crate::agent::WorkerRole;
use crate::task::GenerationTask;

use self::prompts::{AGENT_PROMPT, TASK_PROMPT};

pub fn analyze_requirements(user_input: &str) -> GenerationTask {
    GenerationTask::new(
        "analyze_requirements",
        WorkerRole::RequirementAnalyst,
        format!(
            "Analyze the following user request:\n{}\n\
             Identify the overall goal, the specific actions needed, any required data sources, \
             and the expected output format.",
            user_input
        ),
        "A clear and concise summary of the user's requirements.",
    )
}

pub fn create_agents(requirements: &str) -> GenerationTask {
    GenerationTask::new(
        "create_agents",
        WorkerRole::AgentCreator,
        format!(
            "Based on the requirements:\n{}\n\
             Create the necessary agent definitions. Use the following prompt for each agent:\n{}",
            requirements, AGENT_PROMPT
        ),
        "A list of agent definitions, including role, goal, backstory, and tools.",
    )
}

pub fn create_tasks(requirements: &str, agents: &str) -> GenerationTask {
    GenerationTask::new(
        "create_tasks",
        WorkerRole::TaskCreator,
        format!(
            "Based on the requirements:\n{}\nand the agent definitions:\n{}\n\
             Create the necessary tasks for the agents. Use the following prompt for each task:\n{}",
            requirements, agents, TASK_PROMPT
        ),
        "A list of task definitions, including description and expected output.",
    )
}

/// `suggestion` is the keyword selector's pick; `available` the names whose
/// credentials are currently satisfied.
pub fn select_tools(
    requirements: &str,
    agents: &str,
    tasks: &str,
    suggestion: &str,
    available: &[String],
) -> GenerationTask {
    GenerationTask::new(
        "select_tools",
        WorkerRole::ToolSelector,
        format!(
            "Based on the requirements: {},\nagent definitions: {}, and task definitions: {},\n\
             select the necessary tools from the available tools list. \
             Return a comma-separated list of tool names.\n\
             Available tools: {}\n\
             Dynamic Tool Selector suggestion: {}",
            requirements,
            agents,
            tasks,
            available.join(", "),
            suggestion
        ),
        "A comma-separated list of tool names.",
    )
    .with_tools(vec!["Dynamic Tool Selector".to_string()])
}

pub fn generate_code(agents: &str, tasks: &str, tools: &str) -> GenerationTask {
    GenerationTask::new(
        "generate_code",
        WorkerRole::CodeGenerator,
        format!(
            "Generate a complete Python script that defines and executes the CrewAI crew \
             based on the following:\n\
             Agent Definitions: {}\nTask Definitions: {}\nTool Definitions: {}",
            agents, tasks, tools
        ),
        "A complete, runnable Python script for the new crew.",
    )
}

pub fn review_and_approve(
    requirements: &str,
    agents: &str,
    tasks: &str,
    tools: &str,
    code: &str,
) -> GenerationTask {
    GenerationTask::new(
        "review_and_approve",
        WorkerRole::Supervisor,
        format!(
            "Review the proposed CrewAI crew and provide feedback.\n\
             User Requirements: {}\nProposed Agents: {}\nProposed Tasks: {}\n\
             Proposed Tools: {}\nGenerated Code: {}\n\n\
             Provide a concise summary of the proposed crew, including the overall goal, \
             the agents and their roles, the tasks, and the selected tools. Also state whether \
             the user approves the crew for execution ('yes'), wants to save the code ('save'), \
             or rejects it ('no'). If 'no', provide specific feedback for improvement.",
            requirements, agents, tasks, tools, code
        ),
        "A summary of the crew and a 'yes', 'save', or 'no' decision.",
    )
}

pub fn create_custom_tool(tool_description: &str) -> GenerationTask {
    GenerationTask::new(
        "create_custom_tool",
        WorkerRole::CodeGenerator,
        format!(
            "Create a custom tool based on the following description:\n{}\n\
             Output the complete Python code for the tool as a standalone script. \
             It must declare the tool's name at top level as `name = \"...\"` and its purpose \
             as `description = \"...\"`, read its input from standard input, \
             and print its result to standard output.",
            tool_description
        ),
        "Python code for a custom tool.",
    )
}

pub fn generate_user_code(user_request: &str) -> GenerationTask {
    GenerationTask::new(
        "generate_user_code",
        WorkerRole::CodeGenerator,
        format!("Generate Python code based on the user's request:\n{}", user_request),
        "Python code that fulfills the user's request.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_bound_per_stage() {
        assert_eq!(analyze_requirements("x").agent, WorkerRole::RequirementAnalyst);
        assert_eq!(create_agents("x").agent, WorkerRole::AgentCreator);
        assert_eq!(create_tasks("x", "y").agent, WorkerRole::TaskCreator);
        assert_eq!(select_tools("x", "y", "z", "", &[]).agent, WorkerRole::ToolSelector);
        assert_eq!(generate_code("x", "y", "z").agent, WorkerRole::CodeGenerator);
        assert_eq!(review_and_approve("a", "b", "c", "d", "e").agent, WorkerRole::Supervisor);
        assert_eq!(create_custom_tool("x").agent, WorkerRole::CodeGenerator);
        assert_eq!(generate_user_code("x").agent, WorkerRole::CodeGenerator);
    }

    #[test]
    fn test_inputs_are_interpolated() {
        let task = analyze_requirements("Build a crew to track EV news");
        assert!(task.description.contains("Build a crew to track EV news"));

        let task = create_tasks("REQ", "AGENTS");
        assert!(task.description.contains("REQ"));
        assert!(task.description.contains("AGENTS"));
        assert!(task.description.contains(TASK_PROMPT));
    }

    #[test]
    fn test_agent_prompt_embedded() {
        let task = create_agents("summary");
        assert!(task.description.contains("Role: Market Research Analyst"));
    }

    #[test]
    fn test_select_tools_carries_suggestion_and_catalog() {
        let available = vec!["SerperDevTool".to_string(), "PDFSearchTool".to_string()];
        let task = select_tools("r", "a", "t", "PDFSearchTool", &available);
        assert!(task.description.contains("Available tools: SerperDevTool, PDFSearchTool"));
        assert!(task.description.contains("suggestion: PDFSearchTool"));
        assert_eq!(task.tools, vec!["Dynamic Tool Selector"]);
    }

    #[test]
    fn test_custom_tool_asks_for_declared_name() {
        let task = create_custom_tool("weather lookup");
        assert!(task.description.contains("name = \"...\""));
    }

    #[test]
    fn test_factories_are_pure() {
        let a = review_and_approve("r", "a", "t", "x", "c");
        let b = review_and_approve("r", "a", "t", "x", "c");
        assert_eq!(a.description, b.description);
        assert_eq!(a.expected_output, b.expected_output);
    }
}
