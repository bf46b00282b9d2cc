//! SessionStatus enum for tracking the lifecycle of interview sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of an interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Created,
    InProgress,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Returns true if the session can still accept interview work.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Created | SessionStatus::InProgress)
    }
}

impl StateMachine for SessionStatus {
    /// Valid transitions:
    /// - Created -> InProgress
    /// - Created -> Failed
    /// - InProgress -> Completed
    /// - InProgress -> Failed
    fn can_transition_to(&self, target: &SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Created, InProgress) | (Created, Failed) | (InProgress, Completed) | (InProgress, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Created => vec![InProgress, Failed],
            InProgress => vec![Completed, Failed],
            Completed => vec![],
            Failed => vec![],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Created => "Created",
            SessionStatus::InProgress => "InProgress",
            SessionStatus::Completed => "Completed",
            SessionStatus::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_created() {
        assert_eq!(SessionStatus::default(), SessionStatus::Created);
    }

    #[test]
    fn is_active_works_correctly() {
        assert!(SessionStatus::Created.is_active());
        assert!(SessionStatus::InProgress.is_active());
        assert!(!SessionStatus::Completed.is_active());
        assert!(!SessionStatus::Failed.is_active());
    }

    #[test]
    fn created_can_start() {
        assert!(SessionStatus::Created.can_transition_to(&SessionStatus::InProgress));
    }

    #[test]
    fn in_progress_can_complete_or_fail() {
        assert!(SessionStatus::InProgress.can_transition_to(&SessionStatus::Completed));
        assert!(SessionStatus::InProgress.can_transition_to(&SessionStatus::Failed));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(!SessionStatus::Completed.can_transition_to(&SessionStatus::InProgress));
        assert!(!SessionStatus::Completed.can_transition_to(&SessionStatus::Failed));
    }

    #[test]
    fn created_cannot_skip_to_completed() {
        assert!(!SessionStatus::Created.can_transition_to(&SessionStatus::Completed));
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn deserializes_from_snake_case_json() {
        let status: SessionStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, SessionStatus::InProgress);
    }
}
