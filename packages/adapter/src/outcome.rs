use serde::{Deserialize, Serialize};

/// How a single create, update or delete settled.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The backend accepted the write and the store now holds its response.
    Succeeded,

    /// The backend rejected the write with per-field errors. The body is
    /// forwarded verbatim.
    ValidationRejected(serde_json::Value),

    /// Any other failure. `status` is `None` when no response arrived.
    Failed { status: Option<u16> },

    /// A newer write for the same record was issued before this one settled;
    /// its response was discarded without touching the store.
    Superseded,
}

impl CommitOutcome {
    pub fn state(&self) -> CommitState {
        match self {
            CommitOutcome::Succeeded => CommitState::Succeeded,
            CommitOutcome::ValidationRejected(_) => CommitState::ValidationRejected,
            CommitOutcome::Failed { .. } => CommitState::Failed,
            CommitOutcome::Superseded => CommitState::Superseded,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommitOutcome::Succeeded)
    }
}

/// The state of a write for one record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    /// A request is in flight
    Pending,
    Succeeded,
    ValidationRejected,
    Failed,
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_states() {
        assert_eq!(CommitOutcome::Succeeded.state(), CommitState::Succeeded);
        assert_eq!(
            CommitOutcome::ValidationRejected(serde_json::json!({})).state(),
            CommitState::ValidationRejected
        );
        assert_eq!(
            CommitOutcome::Failed { status: Some(500) }.state(),
            CommitState::Failed
        );
        assert!(!CommitOutcome::Superseded.is_success());
    }

    #[test]
    fn state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CommitState::ValidationRejected).unwrap(),
            "\"validation_rejected\""
        );
    }
}
