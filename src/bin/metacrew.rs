//! metacrew binary.
//!
//! Asks for a problem description and a worker and supervisor model (any
//! of which can be given as flags), then runs one crew-creation flow.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GEMINI_API_KEY`: model credentials
//! - `SERPER_API_KEY`, `EXA_API_KEY`, ...: enable the matching tools
//! - `RUST_LOG`: tracing filter (default: "info,metacrew=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin metacrew -- --worker-llm 'openai[gpt-4o-mini]' --supervisor-llm 'openai[gpt-4]'
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use metacrew::cli::{prompt_problem, select_model};
use metacrew::executor::LlmTaskExecutor;
use metacrew::flow::{CrewCreationFlow, FlowConfig, Outcome, RequestType};
use metacrew::llms::catalog::{available_llms, get_llm};
use metacrew::tools::credentials::EnvCredentials;
use metacrew::tools::registry::ToolRegistry;

#[derive(Parser)]
#[command(name = "metacrew", about = "Generate a crew, a tool, or runnable code from a problem description")]
struct Args {
    /// Problem to solve; prompted for when omitted
    #[arg(long)]
    problem: Option<String>,

    /// Model for the worker roles, e.g. "openai[gpt-4o-mini]"
    #[arg(long, env = "METACREW_WORKER_LLM")]
    worker_llm: Option<String>,

    /// Model for the supervisor role
    #[arg(long, env = "METACREW_SUPERVISOR_LLM")]
    supervisor_llm: Option<String>,

    /// YAML flow configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory generated files are written to (overrides the config)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Build a crew for requests that mention neither "crew" nor "tool"
    #[arg(long)]
    simple: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,metacrew=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FlowConfig::from_yaml_file(path)
            .with_context(|| format!("loading flow configuration {}", path.display()))?,
        None => FlowConfig::default(),
    };
    if args.simple {
        config.default_request_type = RequestType::Crew;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    println!("Welcome to the CrewAI Meta-Crew Generator!");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let problem = match args.problem {
        Some(p) => p,
        None => prompt_problem(&mut input, &mut output)?,
    };
    let worker_name = match args.worker_llm {
        Some(name) => name,
        None => select_model(&mut input, &mut output, "worker agents", available_llms())?
            .name
            .to_string(),
    };
    let supervisor_name = match args.supervisor_llm {
        Some(name) => name,
        None => select_model(&mut input, &mut output, "the supervisor agent", available_llms())?
            .name
            .to_string(),
    };

    let worker = get_llm(&worker_name)?;
    let supervisor = get_llm(&supervisor_name)?;
    tracing::info!(worker = %worker_name, supervisor = %supervisor_name, "models selected");

    let executor = Arc::new(LlmTaskExecutor::new(Arc::new(worker), Arc::new(supervisor)));
    let registry = Arc::new(ToolRegistry::with_catalog(Arc::new(EnvCredentials)));

    let mut flow = CrewCreationFlow::new(problem, config, executor, registry);
    let outcome = flow.kickoff().await;

    match &outcome {
        Outcome::Saved { path } => println!("Flow finished: saved to {}", path.display()),
        Outcome::Executed { report } if report.success() => println!("Flow finished: executed"),
        Outcome::Executed { report } => println!(
            "Flow finished: executed with errors{}",
            report
                .error
                .as_deref()
                .map(|e| format!(" ({})", e))
                .unwrap_or_default()
        ),
        Outcome::Rejected { .. } => println!("Flow finished: rejected"),
    }
    tracing::debug!(outcome = %serde_json::to_string(&outcome)?, "final outcome");

    Ok(())
}
