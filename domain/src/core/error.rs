//! Domain error types

use crate::session::entities::SessionState;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No participants configured for the roundtable")]
    EmptyPanel,

    #[error("Duplicate participant id: {0}")]
    DuplicateParticipant(String),

    #[error("Invalid participant: {0}")]
    InvalidParticipant(String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    #[error("Kickoff message cannot be empty")]
    EmptyKickoff,

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: SessionState, to: SessionState },
}

impl DomainError {
    /// Check if this error means the configured panel can never run a session
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyPanel
                | DomainError::DuplicateParticipant(_)
                | DomainError::InvalidParticipant(_)
                | DomainError::UnknownPersonality(_)
        )
    }
}
