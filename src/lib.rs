//! # metacrew
//!
//! A meta-orchestrator that turns a free-text problem description into one
//! of three artifacts: a multi-agent crew program, a reusable tool, or a
//! standalone program.
//!
//! A [`CrewCreationFlow`] classifies the request, delegates each generation
//! stage to a role-specialised model through a [`TaskExecutor`], has a
//! supervisor review the result, and then executes, saves or rejects it.
//! Capabilities come from a credential-gated [`ToolRegistry`].

pub mod agent;
pub mod cli;
pub mod executor;
pub mod flow;
pub mod llm;
pub mod llms;
pub mod task;
pub mod tasks;
pub mod tools;
pub mod utilities;

pub use agent::WorkerRole;
pub use executor::{LlmTaskExecutor, TaskExecutor};
pub use flow::{CrewCreationFlow, FlowConfig, Outcome, SessionState};
pub use llm::LLM;
pub use llms::base_llm::BaseLLM;
pub use task::GenerationTask;
pub use tools::registry::ToolRegistry;
pub use utilities::errors::{MetaCrewError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
