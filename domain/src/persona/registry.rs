//! Persona registry: the immutable, process-wide participant set.

use super::entities::{Participant, ParticipantId, Personality};
use crate::core::error::DomainError;
use crate::prompt::TurnBuilder;
use std::collections::HashSet;

/// Ordered, validated set of roundtable participants.
///
/// Built once at startup. Construction fails fast on an empty panel or
/// duplicate ids so that no session can ever be created against a broken
/// configuration.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    participants: Vec<Participant>,
}

impl PersonaRegistry {
    pub fn new(participants: Vec<Participant>) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::EmptyPanel);
        }

        let mut seen = HashSet::new();
        for participant in &participants {
            let id = participant.id().as_str();
            if id.trim().is_empty() {
                return Err(DomainError::InvalidParticipant(
                    "participant id cannot be empty".to_string(),
                ));
            }
            if id == crate::turn::USER_SPEAKER {
                return Err(DomainError::InvalidParticipant(format!(
                    "'{}' is reserved for the kickoff speaker",
                    id
                )));
            }
            if !seen.insert(id) {
                return Err(DomainError::DuplicateParticipant(id.to_string()));
            }
            if let Some(template) = participant.prompt_template() {
                let missing = TurnBuilder::missing_placeholders(template);
                if !missing.is_empty() {
                    return Err(DomainError::InvalidParticipant(format!(
                        "prompt template for '{}' is missing {}",
                        id,
                        missing.join(", ")
                    )));
                }
            }
        }

        Ok(Self { participants })
    }

    /// The built-in five-role advisory panel.
    pub fn default_panel() -> Self {
        Self {
            participants: default_participants(),
        }
    }

    /// All participants, in registration order.
    pub fn list_participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id().as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Always false for a constructed registry; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Speaking order for a new session.
    ///
    /// Registration order, with `first` (if any) moved to the front.
    pub fn speaking_order(
        &self,
        first: Option<&ParticipantId>,
    ) -> Result<Vec<ParticipantId>, DomainError> {
        let mut order: Vec<ParticipantId> =
            self.participants.iter().map(|p| p.id().clone()).collect();

        if let Some(first) = first {
            let pos = order
                .iter()
                .position(|id| id == first)
                .ok_or_else(|| DomainError::UnknownParticipant(first.to_string()))?;
            let head = order.remove(pos);
            order.insert(0, head);
        }

        Ok(order)
    }
}

fn default_participants() -> Vec<Participant> {
    vec![
        Participant::new(
            "PM",
            "Product Manager",
            Personality::Neutral,
            "Coordinates the team, ensures product-market fit, manages priorities.",
        ),
        Participant::new(
            "CTO",
            "Chief Technology Officer",
            Personality::Cautious,
            "Oversees technical direction, architecture, and feasibility.",
        ),
        Participant::new(
            "Investor",
            "Investor",
            Personality::Skeptical,
            "Evaluates business viability, risk, and ROI.",
        ),
        Participant::new(
            "Marketer",
            "Marketer",
            Personality::Optimistic,
            "Focuses on go-to-market, messaging, and user acquisition.",
        ),
        Participant::new(
            "CEO",
            "Chief Executive Officer",
            Personality::Supportive,
            "Sets vision, aligns team, makes final decisions.",
        ),
    ]
}
