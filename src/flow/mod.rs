//! The crew-creation flow and its supporting types.
//!
//! [`CrewCreationFlow`] routes a request through analysis, one of three
//! generation pipelines, review, and a terminal execute, save or reject step.

pub mod crew_creation;
pub mod flow_config;
pub mod flow_events;
pub mod state;

pub use self::crew_creation::{classify_request, parse_review, CrewCreationFlow, ExecutionReport, Outcome, Step};
pub use self::flow_config::FlowConfig;
pub use self::flow_events::FlowEvent;
pub use self::state::{Approval, RequestType, SessionState};
