//! Flow lifecycle events.
//!
//! Emitted when a flow starts and finishes and around every step. Events
//! are logged as they are emitted and kept on the flow for inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event emitted when a flow starts executing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStartedEvent {
    pub timestamp: DateTime<Utc>,
    pub flow_name: String,
    pub flow_id: String,
    pub user_input: String,
}

/// Event emitted when a flow reaches its terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowFinishedEvent {
    pub timestamp: DateTime<Utc>,
    pub flow_name: String,
    pub flow_id: String,
    /// `saved`, `executed` or `rejected`.
    pub outcome: String,
}

/// Event emitted when a step starts executing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodExecutionStartedEvent {
    pub timestamp: DateTime<Utc>,
    pub flow_name: String,
    pub method_name: String,
}

/// Event emitted when a step finishes and routes onward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodExecutionFinishedEvent {
    pub timestamp: DateTime<Utc>,
    pub flow_name: String,
    pub method_name: String,
    pub next: String,
}

/// Event emitted when a step fails and the session is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodExecutionFailedEvent {
    pub timestamp: DateTime<Utc>,
    pub flow_name: String,
    pub method_name: String,
    pub error: String,
}

/// Enum covering all flow events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FlowEvent {
    #[serde(rename = "flow_started")]
    FlowStarted(FlowStartedEvent),
    #[serde(rename = "flow_finished")]
    FlowFinished(FlowFinishedEvent),
    #[serde(rename = "method_execution_started")]
    MethodExecutionStarted(MethodExecutionStartedEvent),
    #[serde(rename = "method_execution_finished")]
    MethodExecutionFinished(MethodExecutionFinishedEvent),
    #[serde(rename = "method_execution_failed")]
    MethodExecutionFailed(MethodExecutionFailedEvent),
}

impl FlowEvent {
    /// Write the event to the log.
    pub fn log(&self) {
        match self {
            FlowEvent::FlowStarted(e) => {
                log::info!("Flow '{}' ({}) started", e.flow_name, e.flow_id)
            }
            FlowEvent::FlowFinished(e) => {
                log::info!("Flow '{}' ({}) finished: {}", e.flow_name, e.flow_id, e.outcome)
            }
            FlowEvent::MethodExecutionStarted(e) => {
                log::debug!("Step '{}' started", e.method_name)
            }
            FlowEvent::MethodExecutionFinished(e) => {
                log::debug!("Step '{}' finished -> {}", e.method_name, e.next)
            }
            FlowEvent::MethodExecutionFailed(e) => {
                log::error!("Step '{}' failed: {}", e.method_name, e.error)
            }
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            FlowEvent::FlowStarted(e) => e.timestamp,
            FlowEvent::FlowFinished(e) => e.timestamp,
            FlowEvent::MethodExecutionStarted(e) => e.timestamp,
            FlowEvent::MethodExecutionFinished(e) => e.timestamp,
            FlowEvent::MethodExecutionFailed(e) => e.timestamp,
        }
    }

    /// The step name, for step-level events.
    pub fn method_name(&self) -> Option<&str> {
        match self {
            FlowEvent::MethodExecutionStarted(e) => Some(&e.method_name),
            FlowEvent::MethodExecutionFinished(e) => Some(&e.method_name),
            FlowEvent::MethodExecutionFailed(e) => Some(&e.method_name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_tagged() {
        let event = FlowEvent::MethodExecutionFailed(MethodExecutionFailedEvent {
            timestamp: Utc::now(),
            flow_name: "CrewCreationFlow".into(),
            method_name: "analyze".into(),
            error: "boom".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "method_execution_failed");
        assert_eq!(json["method_name"], "analyze");
        assert_eq!(event.method_name(), Some("analyze"));
        assert!(json["timestamp"].is_string());
    }
}
