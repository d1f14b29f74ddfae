//! Kickoff value object

use crate::core::error::DomainError;
use crate::persona::entities::ParticipantId;
use serde::{Deserialize, Serialize};

/// The user's opening message for a roundtable (Value Object)
///
/// Carries the topic text and, optionally, the participant who should
/// answer first. When no recipient is given the configured kickoff
/// participant (or registry order) decides who opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kickoff {
    text: String,
    recipient: Option<ParticipantId>,
}

impl Kickoff {
    /// Try to create a kickoff, rejecting empty or whitespace-only text
    pub fn try_new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyKickoff);
        }
        Ok(Self {
            text,
            recipient: None,
        })
    }

    /// Address the kickoff to a specific participant
    pub fn with_recipient(mut self, recipient: impl Into<ParticipantId>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn recipient(&self) -> Option<&ParticipantId> {
        self.recipient.as_ref()
    }
}

impl std::fmt::Display for Kickoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
