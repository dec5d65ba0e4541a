//! The crew-creation flow.
//!
//! Drives one user request from raw text to a terminal outcome:
//!
//! ```text
//! start -> analyze
//! analyze -> create_agents | create_custom_tool | generate_user_code | rejected
//! create_agents -> create_tasks -> select_tools -> generate_code -> review
//! create_custom_tool -> review | rejected
//! generate_user_code -> review
//! review -> execute_crew | run_user_code | save_code | rejected
//! ```
//!
//! Steps run one at a time. Every model call is contained: a failure is
//! logged with the failing step, stored as the session's `failure`, and
//! routes to `rejected`, so `kickoff` always returns a labelled [`Outcome`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::flow_config::FlowConfig;
use super::flow_events::{
    FlowEvent, FlowFinishedEvent, FlowStartedEvent, MethodExecutionFailedEvent,
    MethodExecutionFinishedEvent, MethodExecutionStartedEvent,
};
use super::state::{Approval, RequestType, SessionState};
use crate::executor::TaskExecutor;
use crate::task::GenerationTask;
use crate::tasks;
use crate::tools::base_tool::BaseTool;
use crate::tools::registry::ToolRegistry;
use crate::tools::script_tool::ScriptToolLoader;
use crate::tools::selector::DynamicToolSelector;
use crate::utilities::errors::SandboxError;
use crate::utilities::file_handler::FileHandler;
use crate::utilities::printer::{Printer, PrinterColor};
use crate::utilities::sandbox::{RunOutput, Sandbox};
use crate::utilities::string_utils::{contains_ignore_case, strip_code_fences};

const FLOW_NAME: &str = "CrewCreationFlow";

/// Named stages of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    Analyze,
    CreateAgents,
    CreateTasks,
    SelectTools,
    GenerateCode,
    CreateCustomTool,
    GenerateUserCode,
    Review,
    ExecuteCrew,
    RunUserCode,
    SaveCode,
    Rejected,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Analyze => "analyze",
            Self::CreateAgents => "create_agents",
            Self::CreateTasks => "create_tasks",
            Self::SelectTools => "select_tools",
            Self::GenerateCode => "generate_code",
            Self::CreateCustomTool => "create_custom_tool",
            Self::GenerateUserCode => "generate_user_code",
            Self::Review => "review",
            Self::ExecuteCrew => "execute_crew",
            Self::RunUserCode => "run_user_code",
            Self::SaveCode => "save_code",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened when generated code was run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// The file that was run, when it could be persisted first. Holds the
    /// source exactly as executed, with any Markdown fences removed.
    pub path: Option<PathBuf>,
    /// Captured output, when the child ran at all.
    pub output: Option<RunOutput>,
    /// Spawn, timeout or persistence failure.
    pub error: Option<String>,
}

impl ExecutionReport {
    /// Whether the child ran and exited successfully.
    pub fn success(&self) -> bool {
        self.error.is_none() && self.output.as_ref().is_some_and(RunOutput::success)
    }
}

/// Terminal outcome of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Saved { path: PathBuf },
    Executed { report: ExecutionReport },
    Rejected {
        feedback: Option<String>,
        failure: Option<String>,
    },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Saved { .. } => "saved",
            Self::Executed { .. } => "executed",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// Classify a request by substring: "crew" before "tool", else `default`.
///
/// A heuristic over the raw text, not a semantic classifier.
pub fn classify_request(user_input: &str, default: RequestType) -> RequestType {
    let lower = user_input.to_lowercase();
    if lower.contains("crew") {
        RequestType::Crew
    } else if lower.contains("tool") {
        RequestType::Tool
    } else {
        default
    }
}

/// Read the reviewer's decision: "yes" before "save", else no.
pub fn parse_review(review: &str) -> Approval {
    if contains_ignore_case(review, "yes") {
        Approval::Yes
    } else if contains_ignore_case(review, "save") {
        Approval::Save
    } else {
        Approval::No
    }
}

enum Transition {
    To(Step),
    Finish(Outcome),
}

/// One crew-creation session.
pub struct CrewCreationFlow {
    state: SessionState,
    config: FlowConfig,
    executor: Arc<dyn TaskExecutor>,
    registry: Arc<ToolRegistry>,
    selector: DynamicToolSelector,
    loader: ScriptToolLoader,
    sandbox: Sandbox,
    files: FileHandler,
    printer: Printer,
    history: Vec<Step>,
    events: Vec<FlowEvent>,
    outcome: Option<Outcome>,
}

impl fmt::Debug for CrewCreationFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrewCreationFlow")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("history", &self.history)
            .finish()
    }
}

impl CrewCreationFlow {
    pub fn new(
        user_input: impl Into<String>,
        config: FlowConfig,
        executor: Arc<dyn TaskExecutor>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        let sandbox = config.sandbox();
        Self {
            state: SessionState::new(user_input),
            selector: DynamicToolSelector::new(registry.clone()),
            loader: ScriptToolLoader::new(config.scratch_path(), sandbox.clone()),
            files: FileHandler::new(config.output_dir.clone()),
            sandbox,
            config,
            executor,
            registry,
            printer: Printer::new(),
            history: Vec::new(),
            events: Vec::new(),
            outcome: None,
        }
    }

    pub fn with_printer(mut self, printer: Printer) -> Self {
        self.printer = printer;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Steps run so far, in order.
    pub fn history(&self) -> &[Step] {
        &self.history
    }

    pub fn events(&self) -> &[FlowEvent] {
        &self.events
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Run the session to its terminal outcome.
    ///
    /// A session runs once; later calls return the recorded outcome.
    pub async fn kickoff(&mut self) -> Outcome {
        if let Some(outcome) = &self.outcome {
            log::warn!("Flow {} already finished; returning its outcome", self.state.id);
            return outcome.clone();
        }

        self.emit(FlowEvent::FlowStarted(FlowStartedEvent {
            timestamp: Utc::now(),
            flow_name: FLOW_NAME.to_string(),
            flow_id: self.state.id.to_string(),
            user_input: self.state.user_input().to_string(),
        }));

        let mut step = Step::Start;
        let outcome = loop {
            self.history.push(step);
            self.emit(FlowEvent::MethodExecutionStarted(MethodExecutionStartedEvent {
                timestamp: Utc::now(),
                flow_name: FLOW_NAME.to_string(),
                method_name: step.name().to_string(),
            }));

            match self.run_step(step).await {
                Transition::To(next) => {
                    self.emit(FlowEvent::MethodExecutionFinished(MethodExecutionFinishedEvent {
                        timestamp: Utc::now(),
                        flow_name: FLOW_NAME.to_string(),
                        method_name: step.name().to_string(),
                        next: next.name().to_string(),
                    }));
                    step = next;
                }
                Transition::Finish(outcome) => {
                    self.emit(FlowEvent::MethodExecutionFinished(MethodExecutionFinishedEvent {
                        timestamp: Utc::now(),
                        flow_name: FLOW_NAME.to_string(),
                        method_name: step.name().to_string(),
                        next: "end".to_string(),
                    }));
                    break outcome;
                }
            }
        };

        self.emit(FlowEvent::FlowFinished(FlowFinishedEvent {
            timestamp: Utc::now(),
            flow_name: FLOW_NAME.to_string(),
            flow_id: self.state.id.to_string(),
            outcome: outcome.label().to_string(),
        }));
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn emit(&mut self, event: FlowEvent) {
        event.log();
        self.events.push(event);
    }

    async fn run_step(&mut self, step: Step) -> Transition {
        match step {
            Step::Start => {
                self.printer.print("Starting Crew Creation Flow...", PrinterColor::BoldPurple);
                Transition::To(Step::Analyze)
            }
            Step::Analyze => self.analyze().await,
            Step::CreateAgents => self.create_agents().await,
            Step::CreateTasks => self.create_tasks().await,
            Step::SelectTools => self.select_tools().await,
            Step::GenerateCode => self.generate_code().await,
            Step::CreateCustomTool => self.create_custom_tool().await,
            Step::GenerateUserCode => self.generate_user_code().await,
            Step::Review => self.review().await,
            Step::ExecuteCrew => self.execute_crew().await,
            Step::RunUserCode => self.run_user_code().await,
            Step::SaveCode => self.save_code(),
            Step::Rejected => self.rejected(),
        }
    }

    /// Record a step failure and route to `rejected`.
    fn fail(&mut self, step: Step, error: String) -> Transition {
        self.printer
            .print(&format!("Error in step '{}': {}", step, error), PrinterColor::Red);
        self.emit(FlowEvent::MethodExecutionFailed(MethodExecutionFailedEvent {
            timestamp: Utc::now(),
            flow_name: FLOW_NAME.to_string(),
            method_name: step.name().to_string(),
            error: error.clone(),
        }));
        self.state.set_failure(format!("{}: {}", step, error));
        Transition::To(Step::Rejected)
    }

    /// Run `task` on the executor, or fail `step`.
    async fn delegate(&mut self, step: Step, task: GenerationTask) -> Result<String, Transition> {
        match self.executor.execute(&task).await {
            Ok(output) => Ok(output),
            Err(e) => Err(self.fail(step, e.to_string())),
        }
    }

    async fn analyze(&mut self) -> Transition {
        let user_input = self.state.user_input().to_string();
        if user_input.trim().is_empty() {
            return self.fail(Step::Analyze, "No user input provided".to_string());
        }

        let result = match self
            .delegate(Step::Analyze, tasks::analyze_requirements(&user_input))
            .await
        {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer
            .print_section("Requirements Analysis:", &result, PrinterColor::Cyan);
        self.state.requirements = result;

        let request_type = classify_request(&user_input, self.config.default_request_type);
        self.state.set_request_type(request_type);
        log::info!("Request classified as '{}'", request_type);

        Transition::To(match request_type {
            RequestType::Crew => Step::CreateAgents,
            RequestType::Tool => Step::CreateCustomTool,
            RequestType::Code => Step::GenerateUserCode,
        })
    }

    async fn create_agents(&mut self) -> Transition {
        let task = tasks::create_agents(&self.state.requirements);
        let result = match self.delegate(Step::CreateAgents, task).await {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer.print_section("Agents Created:", &result, PrinterColor::Cyan);
        self.state.agents = result;
        Transition::To(Step::CreateTasks)
    }

    async fn create_tasks(&mut self) -> Transition {
        let task = tasks::create_tasks(&self.state.requirements, &self.state.agents);
        let result = match self.delegate(Step::CreateTasks, task).await {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer.print_section("Tasks Created:", &result, PrinterColor::Cyan);
        self.state.tasks = result;
        Transition::To(Step::SelectTools)
    }

    async fn select_tools(&mut self) -> Transition {
        let query = format!("{}\n{}\n{}", self.state.requirements, self.state.agents, self.state.tasks);
        let suggestion = match self.selector.run(&query).await {
            Ok(s) => s,
            Err(e) => return self.fail(Step::SelectTools, e.to_string()),
        };
        let available = match self.registry.available_names() {
            Ok(names) => names,
            Err(e) => {
                log::warn!("Could not list available tools: {}", e);
                Vec::new()
            }
        };

        let task = tasks::select_tools(
            &self.state.requirements,
            &self.state.agents,
            &self.state.tasks,
            &suggestion,
            &available,
        );
        let result = match self.delegate(Step::SelectTools, task).await {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer.print_section("Tools Selected:", &result, PrinterColor::Cyan);
        self.state.tools = result;
        Transition::To(Step::GenerateCode)
    }

    async fn generate_code(&mut self) -> Transition {
        let task = tasks::generate_code(&self.state.agents, &self.state.tasks, &self.state.tools);
        let result = match self.delegate(Step::GenerateCode, task).await {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer.print_section("Code Generated:", &result, PrinterColor::Green);
        self.state.code = result;
        Transition::To(Step::Review)
    }

    async fn create_custom_tool(&mut self) -> Transition {
        let task = tasks::create_custom_tool(&self.state.requirements);
        let result = match self.delegate(Step::CreateCustomTool, task).await {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer
            .print_section("Custom Tool Code Generated:", &result, PrinterColor::Green);

        match self.loader.load_into(&result, &self.registry) {
            Ok(name) => {
                self.printer.print(
                    &format!("New tool '{}' added to available tools.", name),
                    PrinterColor::BoldGreen,
                );
                self.state.tools = name;
                self.state.code = result;
                Transition::To(Step::Review)
            }
            Err(e) => self.fail(Step::CreateCustomTool, format!("Error creating custom tool: {}", e)),
        }
    }

    async fn generate_user_code(&mut self) -> Transition {
        let task = tasks::generate_user_code(self.state.user_input());
        let result = match self.delegate(Step::GenerateUserCode, task).await {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer
            .print_section("User Code Generated:", &result, PrinterColor::Green);
        self.state.user_code = result;
        Transition::To(Step::Review)
    }

    async fn review(&mut self) -> Transition {
        let request_type = self.state.request_type().unwrap_or(self.config.default_request_type);
        let s = &self.state;
        let task = match request_type {
            RequestType::Crew => {
                tasks::review_and_approve(&s.requirements, &s.agents, &s.tasks, &s.tools, &s.code)
            }
            RequestType::Tool => tasks::review_and_approve(&s.requirements, "", "", &s.tools, &s.code),
            RequestType::Code => {
                tasks::review_and_approve(s.user_input(), "", "", "", &s.user_code)
            }
        };
        let result = match self.delegate(Step::Review, task).await {
            Ok(r) => r,
            Err(t) => return t,
        };
        self.printer
            .print_section("Review and Approve:", &result, PrinterColor::Yellow);

        let approval = parse_review(&result);
        self.state.record_approval(approval, &result);
        log::info!("Review decision: {}", approval);

        Transition::To(match (approval, request_type) {
            (Approval::Yes, RequestType::Crew) => Step::ExecuteCrew,
            (Approval::Yes, RequestType::Code) => Step::RunUserCode,
            (Approval::Yes, RequestType::Tool) | (Approval::Save, _) => Step::SaveCode,
            (Approval::No, _) => Step::Rejected,
        })
    }

    async fn execute_crew(&mut self) -> Transition {
        self.printer
            .print("Crew Approved! Executing directly...", PrinterColor::BoldGreen);
        self.printer.print(
            "!!! WARNING: Executing dynamically generated code. Use with extreme caution !!!",
            PrinterColor::BoldRed,
        );

        let mut report = ExecutionReport::default();
        let source = strip_code_fences(&self.state.code);
        let result = match self.files.save(&self.config.crew_filename, &source) {
            Ok(path) => {
                let result = self.sandbox.run_file(&path, "").await;
                report.path = Some(path);
                result
            }
            Err(e) => {
                log::error!("Failed to persist generated crew: {}", e);
                report.error = Some(format!("Failed to save {}: {}", self.config.crew_filename, e));
                self.sandbox.run_source(&source, "").await
            }
        };
        self.record_run(result, &mut report, "Generated Crew");
        Transition::Finish(Outcome::Executed { report })
    }

    async fn run_user_code(&mut self) -> Transition {
        self.printer
            .print("User Code Approved! Executing directly...", PrinterColor::BoldGreen);
        self.printer.print(
            "!!! WARNING: Executing dynamically generated code. EXTREME CAUTION ADVISED !!!",
            PrinterColor::BoldRed,
        );

        let mut report = ExecutionReport::default();
        let source = strip_code_fences(&self.state.user_code);
        let result = self.sandbox.run_source(&source, "").await;
        self.record_run(result, &mut report, "User Code");
        Transition::Finish(Outcome::Executed { report })
    }

    /// Fold a sandbox run into `report` and show its output.
    fn record_run(
        &self,
        result: Result<RunOutput, SandboxError>,
        report: &mut ExecutionReport,
        label: &str,
    ) {
        match result {
            Ok(output) => {
                self.printer
                    .print_section(&format!("{} Output:", label), &output.stdout, PrinterColor::Cyan);
                if !output.stderr.is_empty() {
                    self.printer
                        .print_section(&format!("{} Errors:", label), &output.stderr, PrinterColor::Red);
                }
                if !output.success() {
                    log::warn!("{} exited with {:?}", label, output.exit_code);
                }
                report.output = Some(output);
            }
            Err(e) => {
                self.printer
                    .print(&format!("Error executing {}: {}", label, e), PrinterColor::Red);
                log::error!("Error executing {}: {}", label, e);
                report.error = Some(e.to_string());
            }
        }
    }

    fn save_code(&mut self) -> Transition {
        let filename = match self.state.request_type() {
            Some(RequestType::Tool) => self.config.tool_filename.clone(),
            _ => self.config.crew_filename.clone(),
        };
        self.printer
            .print(&format!("Approved! Saving code to {}", filename), PrinterColor::BoldGreen);

        let content = self.state.generated_source().to_string();
        match self.files.save(&filename, &content) {
            Ok(path) => {
                self.printer.print(
                    &format!(
                        "Code saved to {}. You can run it with: {} {}",
                        path.display(),
                        self.config.runtime,
                        path.display()
                    ),
                    PrinterColor::Green,
                );
                Transition::Finish(Outcome::Saved { path })
            }
            Err(e) => self.fail(Step::SaveCode, format!("Failed to save {}: {}", filename, e)),
        }
    }

    fn rejected(&mut self) -> Transition {
        let feedback = self.state.feedback().map(str::to_string);
        let failure = self.state.failure().map(str::to_string);
        let shown = feedback
            .as_deref()
            .or(failure.as_deref())
            .unwrap_or("No feedback provided");
        self.printer
            .print(&format!("Crew Rejected. Feedback: {}", shown), PrinterColor::BoldYellow);
        Transition::Finish(Outcome::Rejected { feedback, failure })
    }
}
