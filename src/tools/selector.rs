//! Keyword tool selector.
//!
//! Maps free-text requirements to a comma-joined, order-preserving,
//! de-duplicated list of capability names, drawn only from capabilities
//! whose credentials are currently satisfied.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::base_tool::BaseTool;
use super::registry::ToolRegistry;
use crate::utilities::errors::ToolError;

/// Returned when selection itself fails.
pub const FALLBACK_TOOL: &str = "SerperDevTool";

/// Used when no keyword matched.
pub const DEFAULT_TOOLS: [&str; 2] = ["SerperDevTool", "WebsiteSearchTool"];

/// Keyword phrase to candidate capabilities, scanned in this order.
pub const KEYWORD_TOOLS: &[(&str, &[&str])] = &[
    ("web", &["SerperDevTool", "WebsiteSearchTool", "BrowserbaseLoadTool"]),
    ("search", &["SerperDevTool", "WebsiteSearchTool", "EXASearchTool"]),
    ("article", &["WebsiteSearchTool", "SerperDevTool"]),
    ("news", &["WebsiteSearchTool", "SerperDevTool"]),
    ("scrape", &["WebsiteSearchTool", "ScrapeElementFromWebsiteTool", "SeleniumScrapingTool"]),
    ("image", &["DallETool", "VisionTool"]),
    ("code", &["CodeDocsSearchTool", "CodeInterpreterTool"]),
    ("data", &["CSVSearchTool", "JSONSearchTool"]),
    ("file", &["FileReadTool", "DirectoryReadTool"]),
    ("read", &["FileReadTool", "DirectoryReadTool", "PDFSearchTool", "DOCXSearchTool"]),
    ("database", &["NL2SQLTool", "PGSearchTool"]),
    ("linkedin", &["linkedin_profile_search_tool"]),
    ("youtube", &["YoutubeChannelSearchTool", "YoutubeVideoSearchTool"]),
    ("github", &["GithubSearchTool"]),
    ("pdf", &["PDFSearchTool"]),
    ("document", &["DOCXSearchTool", "PDFSearchTool", "TXTSearchTool"]),
    ("directory", &["DirectorySearchTool", "DirectoryReadTool"]),
    ("trend", &["SerperDevTool"]),
    ("summary", &["SerperDevTool"]),
    ("electric vehicle", &["SerperDevTool", "WebsiteSearchTool"]),
    ("summarize", &["SerperDevTool", "WebsiteSearchTool"]),
    ("analysis", &["CodeInterpreterTool", "CSVSearchTool"]),
];

/// Select capability names for `requirements`.
///
/// Never fails: an internal error is logged and [`FALLBACK_TOOL`] returned.
pub fn select_tools(requirements: &str, registry: &ToolRegistry) -> String {
    match try_select_tools(requirements, registry) {
        Ok(selected) => {
            let joined = selected.join(",");
            log::info!("Keyword selector picked tools: {}", joined);
            joined
        }
        Err(e) => {
            log::error!("Error in tool selection: {}", e);
            FALLBACK_TOOL.to_string()
        }
    }
}

/// Fallible core of [`select_tools`].
pub fn try_select_tools(requirements: &str, registry: &ToolRegistry) -> Result<Vec<String>, ToolError> {
    let available: HashSet<String> = registry.available_names()?.into_iter().collect();
    let requirements = requirements.to_lowercase();

    let mut selected: Vec<String> = Vec::new();
    for (keyword, tools) in KEYWORD_TOOLS {
        if requirements.contains(keyword) {
            for tool in *tools {
                push_available(&available, &mut selected, tool);
            }
        }
    }

    if selected.is_empty() {
        for tool in DEFAULT_TOOLS {
            push_available(&available, &mut selected, tool);
        }
    }

    Ok(selected)
}

/// Append `tool` unless it is unavailable or already selected.
fn push_available(available: &HashSet<String>, selected: &mut Vec<String>, tool: &str) {
    if available.contains(tool) && !selected.iter().any(|s| s == tool) {
        selected.push(tool.to_string());
    }
}

/// The keyword selector exposed as a capability.
///
/// Bound to the tool-selector role so its suggestion is part of the
/// tool-selection prompt.
#[derive(Debug, Clone)]
pub struct DynamicToolSelector {
    registry: Arc<ToolRegistry>,
}

impl DynamicToolSelector {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl BaseTool for DynamicToolSelector {
    fn name(&self) -> &str {
        "Dynamic Tool Selector"
    }

    fn description(&self) -> &str {
        "Selects the most appropriate tools for a given task from a predefined library."
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        log::debug!("DynamicToolSelector received requirements: {}", input);
        Ok(select_tools(input, &self.registry))
    }
}
