//! Capabilities available to generated crews.
//!
//! This module provides the capability interface, the credential-gated
//! registry seeded from the built-in catalog, the keyword selector, and the
//! loader for capabilities generated at runtime.

pub mod base_tool;
pub mod builtin;
pub mod catalog;
pub mod credentials;
pub mod registry;
pub mod script_tool;
pub mod selector;

// Re-exports for convenience
pub use base_tool::{describe_tools, BaseTool, EnvVar, ToolHandle};
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use registry::{ToolConstructor, ToolEntry, ToolFactory, ToolRegistry};
pub use script_tool::{declared_name, ScriptTool, ScriptToolLoader};
pub use selector::{select_tools, DynamicToolSelector};
