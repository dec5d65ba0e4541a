//! Static descriptor list that seeds the [`ToolRegistry`].
//!
//! Each descriptor names a capability, describes it for the models, and lists
//! the credentials that must all be present before it can be instantiated.

use std::sync::Arc;

use super::base_tool::{EnvVar, ToolHandle};
use super::builtin::{CodeInterpreterTool, DirectoryReadTool, ExternalTool, FileReadTool};
use super::credentials::CredentialSource;
use super::registry::{ToolConstructor, ToolEntry, ToolFactory, ToolRegistry};
use crate::utilities::errors::ToolError;

/// Connection parameter read by the database-backed factories.
pub const DATABASE_URI_KEY: &str = "DATABASE_URI";

/// How a descriptor is materialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Service-backed; see [`ExternalTool`].
    External,
    /// Service-backed and built through the database-URI factory.
    Database,
    FileRead,
    DirectoryRead,
    CodeInterpreter,
}

/// One catalog row.
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub required_keys: &'static [&'static str],
    pub kind: ToolKind,
}

const fn external(
    name: &'static str,
    description: &'static str,
    required_keys: &'static [&'static str],
) -> ToolDescriptor {
    ToolDescriptor {
        name,
        description,
        required_keys,
        kind: ToolKind::External,
    }
}

const fn database(name: &'static str, description: &'static str) -> ToolDescriptor {
    ToolDescriptor {
        name,
        description,
        required_keys: &[],
        kind: ToolKind::Database,
    }
}

/// The built-in catalog, in declaration order.
pub const CATALOG: &[ToolDescriptor] = &[
    external("SerperDevTool", "Searches the web through the Serper.dev Google Search API.", &["SERPER_API_KEY"]),
    external("BrowserbaseLoadTool", "Loads web pages through a Browserbase headless browser session.", &["BROWSERBASE_API_KEY", "BROWSERBASE_PROJECT_ID"]),
    external("CodeDocsSearchTool", "Semantic search over code documentation sites.", &[]),
    ToolDescriptor {
        name: "CodeInterpreterTool",
        description: "Executes code in an isolated subprocess and returns its output.",
        required_keys: &[],
        kind: ToolKind::CodeInterpreter,
    },
    external("CSVSearchTool", "Semantic search within CSV files.", &[]),
    external("DallETool", "Generates images with DALL-E.", &["OPENAI_API_KEY"]),
    external("DirectorySearchTool", "Semantic search over the files of a directory.", &[]),
    external("DOCXSearchTool", "Semantic search within DOCX documents.", &[]),
    ToolDescriptor {
        name: "DirectoryReadTool",
        description: "Lists the entries of a directory.",
        required_keys: &[],
        kind: ToolKind::DirectoryRead,
    },
    external("EXASearchTool", "Semantic web search through the Exa API.", &["EXA_API_KEY"]),
    ToolDescriptor {
        name: "FileReadTool",
        description: "Reads the full content of a file.",
        required_keys: &[],
        kind: ToolKind::FileRead,
    },
    external("FirecrawlSearchTool", "Searches the web through Firecrawl.", &["FIRECRAWL_API_KEY"]),
    external("FirecrawlCrawlWebsiteTool", "Crawls a website through Firecrawl.", &["FIRECRAWL_API_KEY"]),
    external("FirecrawlScrapeWebsiteTool", "Scrapes a single page through Firecrawl.", &["FIRECRAWL_API_KEY"]),
    external("GithubSearchTool", "Semantic search over a GitHub repository.", &["GITHUB_TOKEN"]),
    external("JSONSearchTool", "Semantic search within JSON files.", &[]),
    external("LlamaIndexTool", "Wraps a LlamaIndex query engine.", &[]),
    external("MultiOnTool", "Drives a browser through MultiOn natural-language commands.", &["MULTION_API_KEY"]),
    database("NL2SQLTool", "Answers questions by translating them to SQL against a database."),
    external("PDFSearchTool", "Semantic search within PDF documents.", &[]),
    database("PGSearchTool", "Semantic search over PostgreSQL tables."),
    external("QdrantVectorSearchTool", "Vector similarity search in a Qdrant collection.", &["QDRANT_URL", "QDRANT_API_KEY"]),
    external("RagTool", "General retrieval-augmented question answering over a knowledge base.", &[]),
    external("ScrapeElementFromWebsiteTool", "Extracts specific elements from a web page.", &[]),
    external("ScrapegraphScrapeTool", "Scrapes structured data through ScrapeGraph AI.", &["SCRAPEGRAPH_API_KEY"]),
    external("SeleniumScrapingTool", "Scrapes dynamic pages with a Selenium browser.", &[]),
    database("SnowflakeSearchTool", "Runs queries against a Snowflake warehouse."),
    external("TXTSearchTool", "Semantic search within text files.", &[]),
    external("VisionTool", "Describes and extracts text from images.", &["OPENAI_API_KEY"]),
    external("WebsiteSearchTool", "Semantic search over the content of a website.", &[]),
    external("WeaviateVectorSearchTool", "Vector similarity search in a Weaviate cluster.", &["WEAVIATE_CLUSTER_URL", "WEAVIATE_API_KEY"]),
    external("YoutubeChannelSearchTool", "Semantic search over a YouTube channel's videos.", &[]),
    external("YoutubeVideoSearchTool", "Semantic search over a YouTube video's transcript.", &[]),
    external("linkedin_profile_search_tool", "Searches for LinkedIn profiles based on keywords.", &["LINKEDIN_USERNAME", "LINKEDIN_PASSWORD"]),
    external("S3ReaderTool", "Reads objects from Amazon S3.", &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"]),
    external("S3WriterTool", "Writes objects to Amazon S3.", &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"]),
];

impl ToolDescriptor {
    fn env_vars(&self) -> Vec<EnvVar> {
        self.required_keys
            .iter()
            .map(|k| EnvVar::new(*k, format!("Credential for {}", self.name)))
            .collect()
    }

    /// Bare constructor for this descriptor.
    pub fn constructor(&self) -> ToolConstructor {
        let desc = *self;
        Arc::new(move || {
            let tool: ToolHandle = match desc.kind {
                ToolKind::FileRead => Arc::new(FileReadTool),
                ToolKind::DirectoryRead => Arc::new(DirectoryReadTool),
                ToolKind::CodeInterpreter => Arc::new(CodeInterpreterTool::default()),
                ToolKind::External | ToolKind::Database => {
                    Arc::new(ExternalTool::new(desc.name, desc.description, desc.env_vars()))
                }
            };
            Ok(tool)
        })
    }

    /// Connection-parameter factory, for database-backed descriptors.
    pub fn factory(&self) -> Option<ToolFactory> {
        if self.kind != ToolKind::Database {
            return None;
        }
        let desc = *self;
        Some(Arc::new(
            move |credentials: &dyn CredentialSource| -> Result<ToolHandle, ToolError> {
                let uri = credentials
                    .get(DATABASE_URI_KEY)?
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| ToolError::Construction {
                        name: desc.name.to_string(),
                        message: format!("{} is not set", DATABASE_URI_KEY),
                    })?;
                let tool = ExternalTool::new(desc.name, desc.description, desc.env_vars())
                    .with_connection(uri);
                Ok(Arc::new(tool) as ToolHandle)
            },
        ))
    }

    fn entry(&self) -> ToolEntry {
        let keys = self.required_keys.iter().map(|k| k.to_string()).collect();
        let entry = ToolEntry::new(self.constructor(), keys);
        match self.factory() {
            Some(factory) => entry.with_factory(factory),
            None => entry,
        }
    }
}

/// Look up a catalog row by name.
pub fn descriptor(name: &str) -> Option<&'static ToolDescriptor> {
    CATALOG.iter().find(|d| d.name == name)
}

/// Seed `registry` with every catalog row.
pub fn populate(registry: &ToolRegistry) {
    for desc in CATALOG {
        registry.insert(desc.name, desc.entry());
    }
    log::debug!("Tool catalog loaded: {} tools", CATALOG.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::credentials::StaticCredentials;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_unique() {
        let names: HashSet<_> = CATALOG.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_populate_preserves_order() {
        let registry = ToolRegistry::with_catalog(Arc::new(StaticCredentials::new()));
        let names = registry.names();
        assert_eq!(names.len(), CATALOG.len());
        assert_eq!(names[0], "SerperDevTool");
        assert_eq!(names.last().unwrap(), "S3WriterTool");
    }

    #[test]
    fn test_credential_gated_descriptor() {
        let creds = Arc::new(StaticCredentials::new());
        let registry = ToolRegistry::with_catalog(creds.clone());
        assert!(registry.get_instance("BrowserbaseLoadTool").is_none());

        creds.set("BROWSERBASE_API_KEY", "k");
        assert!(registry.get_instance("BrowserbaseLoadTool").is_none());

        creds.set("BROWSERBASE_PROJECT_ID", "p");
        let tool = registry.get_instance("BrowserbaseLoadTool").unwrap();
        assert_eq!(tool.env_vars().len(), 2);
    }

    #[test]
    fn test_database_factory_reads_uri() {
        let creds = Arc::new(StaticCredentials::new());
        let registry = ToolRegistry::with_catalog(creds.clone());

        assert!(registry.is_available("PGSearchTool").unwrap());
        assert!(registry.get_instance("PGSearchTool").is_none());

        creds.set(DATABASE_URI_KEY, "postgresql://localhost/crm");
        let tool = registry.get_instance("PGSearchTool").unwrap();
        assert_eq!(tool.name(), "PGSearchTool");
    }

    #[test]
    fn test_local_tools_have_concrete_implementations() {
        let registry = ToolRegistry::with_catalog(Arc::new(StaticCredentials::new()));
        let tool = registry.get_instance("FileReadTool").unwrap();
        assert_eq!(tool.name(), "FileReadTool");
        assert!(descriptor("DirectoryReadTool").is_some());
        assert!(descriptor("NotATool").is_none());
    }
}
