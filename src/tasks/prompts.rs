//! Few-shot prompts embedded in the agent- and task-creation stages.

/// How to define one agent of the generated crew.
pub const AGENT_PROMPT: &str = "\
You are creating an agent for a CrewAI crew. Based on the user's problem description, define the following:
* Role: A short, descriptive title for the agent (e.g., \"Market Researcher\", \"Data Analyst\").
* Goal: The agent's objective in a single, clear sentence.
* Backstory: A brief paragraph providing context and personality for the agent.
* Tools: Comma separated list of tools needed.

Example:
User Input: I need a crew to research market trends for a new product launch.
Role: Market Research Analyst
Goal: Identify and analyze current market trends relevant to the new product.
Backstory: A seasoned market analyst with expertise in identifying emerging trends and consumer behavior.
Tools: serper_dev_tool, website_search_tool
";

/// How to define one task of the generated crew.
pub const TASK_PROMPT: &str = "\
You are creating a task for a CrewAI agent. Based on the user's problem and the agent's definition, define the following:
* Description: A clear, concise description of the task. Be specific!
* Expected Output: Describe what the successful completion of the task looks like.

Example:
User Input: Research market trends for a new product launch.
Agent Role: Market Research Analyst
Agent Goal: Identify and analyze current market trends relevant to the new product.
Description: \"Conduct thorough research on current market trends related to {product_category}. Identify key competitors, consumer preferences, and emerging technologies. Focus on the last 6 months.\"
Expected Output: \"A report summarizing the key market trends, major competitors, and potential opportunities for the new product.\"
";
