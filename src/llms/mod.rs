//! LLM system.
//!
//! This module provides the LLM infrastructure including:
//!
//! - [`base_llm`] - The base trait for all LLM implementations
//! - [`providers`] - The Chat Completions provider
//! - [`catalog`] - The table of selectable models

pub mod base_llm;
pub mod catalog;
pub mod providers;

// Re-exports for convenience
pub use base_llm::{BaseLLM, LLMMessage};
pub use catalog::{available_llms, get_llm, LlmSpec};
