use crate::domain::SemanticVersion;
use crate::error::RollError;
use std::fmt;

/// Result of one roll invocation, used to pick the process exit code
#[derive(Debug)]
pub enum RollOutcome {
    /// The requested commit already carries a version tag
    AlreadyReleased { version: SemanticVersion },
    /// The operator declined the confirmation prompt
    Aborted { tag: String },
    /// Only the next version was computed and printed
    Printed { version: SemanticVersion },
    Published { tag: String, commit: String },
    Failed(RollError),
}

impl RollOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RollOutcome::Failed(_) => 1,
            _ => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RollOutcome::Failed(_))
    }
}

/// States of the release gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Init,
    Verified,
    TaggedLocally,
    Confirmed,
    Published,
    PushedTag,
    PushedBranch,
    Done,
    AlreadyReleased,
    Aborted,
    Failed,
}

impl GateState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GateState::Done | GateState::AlreadyReleased | GateState::Aborted | GateState::Failed
        )
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateState::Init => "init",
            GateState::Verified => "verified",
            GateState::TaggedLocally => "tagged-locally",
            GateState::Confirmed => "confirmed",
            GateState::Published => "published",
            GateState::PushedTag => "pushed-tag",
            GateState::PushedBranch => "pushed-branch",
            GateState::Done => "done",
            GateState::AlreadyReleased => "already-released",
            GateState::Aborted => "aborted",
            GateState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let benign = vec![
            RollOutcome::AlreadyReleased {
                version: SemanticVersion::new(1, 4, 2),
            },
            RollOutcome::Aborted {
                tag: "v1.5.0".to_string(),
            },
            RollOutcome::Printed {
                version: SemanticVersion::new(1, 5, 0),
            },
            RollOutcome::Published {
                tag: "v1.5.0".to_string(),
                commit: "abc1234".to_string(),
            },
        ];
        for outcome in benign {
            assert_eq!(outcome.exit_code(), 0, "{:?}", outcome);
            assert!(!outcome.is_failure());
        }

        let failed = RollOutcome::Failed(RollError::push("rejected"));
        assert_eq!(failed.exit_code(), 1);
        assert!(failed.is_failure());
    }

    #[test]
    fn test_terminal_states() {
        assert!(GateState::Done.is_terminal());
        assert!(GateState::Aborted.is_terminal());
        assert!(!GateState::TaggedLocally.is_terminal());
        assert!(!GateState::Init.is_terminal());
    }
}
