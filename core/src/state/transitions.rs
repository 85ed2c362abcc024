//! Session states and the rules that move between them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where an open session stands relative to its baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirtyState {
    /// Live content matches a baseline, or nothing was reported yet
    Clean,
    /// Live content differs from both the saved and the imported baseline
    Dirty,
    /// An import happened and its echo has not been observed yet
    JustImported,
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Open,
    Closed,
}

/// What disposal does with a session's live content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposeAction {
    /// Commit a recovery snapshot before releasing the session
    Record,
    /// Release without a snapshot
    Skip,
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Cannot transition from terminal phase {phase:?}")]
    FromTerminalPhase { phase: SessionPhase },
}

pub struct StateTransition;

impl StateTransition {
    /// Sessions only ever move Open -> Closed.
    pub fn validate(from: SessionPhase, to: SessionPhase) -> Result<(), TransitionError> {
        match (from, to) {
            (SessionPhase::Closed, _) => Err(TransitionError::FromTerminalPhase { phase: from }),
            (SessionPhase::Open, _) => Ok(()),
        }
    }

    /// Disposal records a snapshot only for dirty sessions. A session still
    /// waiting for its import echo holds exactly the imported content.
    pub fn on_dispose(state: DirtyState) -> DisposeAction {
        match state {
            DirtyState::Dirty => DisposeAction::Record,
            DirtyState::Clean | DirtyState::JustImported => DisposeAction::Skip,
        }
    }

    pub fn describe(state: DirtyState) -> &'static str {
        match state {
            DirtyState::Clean => "no unsaved changes",
            DirtyState::Dirty => "unsaved changes",
            DirtyState::JustImported => "imported, awaiting echo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_is_terminal() {
        assert!(StateTransition::validate(SessionPhase::Open, SessionPhase::Closed).is_ok());
        assert!(StateTransition::validate(SessionPhase::Closed, SessionPhase::Closed).is_err());
    }

    #[test]
    fn test_only_dirty_sessions_record() {
        assert_eq!(
            StateTransition::on_dispose(DirtyState::Dirty),
            DisposeAction::Record
        );
        assert_eq!(
            StateTransition::on_dispose(DirtyState::Clean),
            DisposeAction::Skip
        );
        assert_eq!(
            StateTransition::on_dispose(DirtyState::JustImported),
            DisposeAction::Skip
        );
    }
}
