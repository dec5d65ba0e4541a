//! LLM provider implementations.
//!
//! Every supported provider is reached through its Chat Completions
//! compatible endpoint, so a single client implementation serves them all.

pub mod openai;
