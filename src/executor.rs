//! Executes generation tasks against language models.
//!
//! [`TaskExecutor`] is the boundary between the flow and the models: the
//! flow hands over a [`GenerationTask`] and receives opaque text back.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::task::GenerationTask;
use crate::utilities::errors::LlmError;

/// Runs one unit of delegated work to completion.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &GenerationTask) -> Result<String, LlmError>;
}

/// Routes the supervisor role to the supervisor model and every other role
/// to the worker model.
#[derive(Debug, Clone)]
pub struct LlmTaskExecutor {
    worker: Arc<dyn BaseLLM>,
    supervisor: Arc<dyn BaseLLM>,
}

impl LlmTaskExecutor {
    pub fn new(worker: Arc<dyn BaseLLM>, supervisor: Arc<dyn BaseLLM>) -> Self {
        Self { worker, supervisor }
    }

    /// Use one model for every role.
    pub fn single(llm: Arc<dyn BaseLLM>) -> Self {
        Self::new(llm.clone(), llm)
    }

    fn llm_for(&self, task: &GenerationTask) -> &Arc<dyn BaseLLM> {
        if task.agent.is_supervisor() {
            &self.supervisor
        } else {
            &self.worker
        }
    }

    /// Messages sent for `task`.
    pub fn messages(task: &GenerationTask) -> Vec<LLMMessage> {
        vec![
            LLMMessage::system(task.agent.system_prompt()),
            LLMMessage::user(task.prompt()),
        ]
    }
}

#[async_trait]
impl TaskExecutor for LlmTaskExecutor {
    async fn execute(&self, task: &GenerationTask) -> Result<String, LlmError> {
        let llm = self.llm_for(task);
        log::info!(
            "Executing task '{}' as {} on {}/{}",
            task.name,
            task.agent,
            llm.provider(),
            llm.model()
        );
        let output = llm.acall(Self::messages(task)).await?;
        log::debug!("Task '{}' produced {} bytes", task.name, output.len());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::WorkerRole;
    use parking_lot::Mutex;

    #[derive(Debug)]
    struct Recording {
        name: &'static str,
        calls: Mutex<Vec<Vec<LLMMessage>>>,
    }

    impl Recording {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl BaseLLM for Recording {
        fn model(&self) -> &str {
            self.name
        }

        fn temperature(&self) -> Option<f64> {
            None
        }

        async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
            self.calls.lock().push(messages);
            Ok(format!("from {}", self.name))
        }
    }

    #[tokio::test]
    async fn test_supervisor_routed_to_supervisor_model() {
        let worker = Recording::new("worker");
        let supervisor = Recording::new("supervisor");
        let executor = LlmTaskExecutor::new(worker.clone(), supervisor.clone());

        let review = GenerationTask::new("review", WorkerRole::Supervisor, "Review.", "Decision.");
        let analyze = GenerationTask::new("analyze", WorkerRole::RequirementAnalyst, "Analyze.", "Summary.");

        assert_eq!(executor.execute(&review).await.unwrap(), "from supervisor");
        assert_eq!(executor.execute(&analyze).await.unwrap(), "from worker");
        assert_eq!(worker.calls.lock().len(), 1);
        assert_eq!(supervisor.calls.lock().len(), 1);
    }

    #[test]
    fn test_messages_carry_persona_and_task() {
        let task = GenerationTask::new("analyze", WorkerRole::RequirementAnalyst, "Analyze X.", "Summary.");
        let messages = LlmTaskExecutor::messages(&task);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.starts_with("You are Requirement Analyst."));
        assert!(messages[1].content.starts_with("Analyze X."));
    }
}
