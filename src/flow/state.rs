//! Session state threaded through the crew-creation flow.
//!
//! One record per user request. Each field has a single owning step; the
//! once-only fields (`request_type`, `approval`) are written through guarded
//! setters so a second write is refused rather than silently applied.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which generation pipeline a request follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Crew,
    Tool,
    Code,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crew => "crew",
            Self::Tool => "tool",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crew" => Ok(Self::Crew),
            "tool" => Ok(Self::Tool),
            "code" => Ok(Self::Code),
            other => Err(format!("unknown request type '{}'", other)),
        }
    }
}

/// The reviewer's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approval {
    Yes,
    Save,
    No,
}

impl fmt::Display for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "yes",
            Self::Save => "save",
            Self::No => "no",
        })
    }
}

/// The mutable record carrying every artifact of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    user_input: String,
    request_type: Option<RequestType>,
    pub requirements: String,
    pub agents: String,
    pub tasks: String,
    /// Comma-separated capability names, or the single name of a
    /// generated tool.
    pub tools: String,
    /// Generated source for a crew or tool.
    pub code: String,
    /// Generated source for a direct code request.
    pub user_code: String,
    approval: Option<Approval>,
    /// Full review text; present iff `approval` is `No`.
    feedback: Option<String>,
    /// Why the session was rejected without a review (model or load failure,
    /// missing input).
    failure: Option<String>,
}

impl SessionState {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_input: user_input.into(),
            request_type: None,
            requirements: String::new(),
            agents: String::new(),
            tasks: String::new(),
            tools: String::new(),
            code: String::new(),
            user_code: String::new(),
            approval: None,
            feedback: None,
            failure: None,
        }
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    pub fn request_type(&self) -> Option<RequestType> {
        self.request_type
    }

    pub fn approval(&self) -> Option<Approval> {
        self.approval
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Set the request type. Returns `false`, leaving the state untouched,
    /// if it was already set.
    pub fn set_request_type(&mut self, request_type: RequestType) -> bool {
        if let Some(existing) = self.request_type {
            log::warn!(
                "Request type already set to '{}'; ignoring '{}'",
                existing,
                request_type
            );
            return false;
        }
        self.request_type = Some(request_type);
        true
    }

    /// Record the review decision. The full review text becomes the
    /// feedback when the decision is `No`.
    ///
    /// Returns `false`, leaving the state untouched, if a decision was
    /// already recorded.
    pub fn record_approval(&mut self, approval: Approval, review: &str) -> bool {
        if let Some(existing) = self.approval {
            log::warn!("Approval already recorded as '{}'; ignoring '{}'", existing, approval);
            return false;
        }
        self.approval = Some(approval);
        if approval == Approval::No {
            self.feedback = Some(review.to_string());
        }
        true
    }

    pub fn set_failure(&mut self, failure: impl Into<String>) {
        self.failure = Some(failure.into());
    }

    /// The generated source the session would save or run.
    pub fn generated_source(&self) -> &str {
        match self.request_type {
            Some(RequestType::Code) => &self.user_code,
            _ => &self.code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_type_set_once() {
        let mut state = SessionState::new("build a crew");
        assert!(state.set_request_type(RequestType::Crew));
        assert!(!state.set_request_type(RequestType::Code));
        assert_eq!(state.request_type(), Some(RequestType::Crew));
    }

    #[test]
    fn test_feedback_only_on_no() {
        let mut state = SessionState::new("x");
        state.record_approval(Approval::Save, "save it");
        assert_eq!(state.feedback(), None);

        let mut state = SessionState::new("x");
        state.record_approval(Approval::No, "No, revise the tasks");
        assert_eq!(state.feedback(), Some("No, revise the tasks"));
        assert!(!state.record_approval(Approval::Yes, "yes"));
        assert_eq!(state.approval(), Some(Approval::No));
    }

    #[test]
    fn test_generated_source_follows_request_type() {
        let mut state = SessionState::new("x");
        state.code = "crew".into();
        state.user_code = "user".into();
        state.set_request_type(RequestType::Code);
        assert_eq!(state.generated_source(), "user");
    }

    #[test]
    fn test_request_type_parse_and_serde() {
        assert_eq!(" Tool ".parse::<RequestType>().unwrap(), RequestType::Tool);
        assert!("agent".parse::<RequestType>().is_err());
        let json = serde_json::to_value(SessionState::new("hi")).unwrap();
        assert_eq!(json["user_input"], "hi");
        assert!(json["request_type"].is_null());
    }
}
