//! Domain layer for roundtable
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Roundtable
//!
//! A fixed panel of personas (Product Manager, CTO, Investor, ...) discusses a
//! kickoff topic one turn at a time. Each participant answers the previous
//! participant's output, so a round is a chain rather than a broadcast.
//!
//! - **Participant**: one persona, immutable for the life of the process
//! - **Turn**: one participant's contribution and its outcome
//! - **Session**: one roundtable run and its lifecycle state

pub mod core;
pub mod persona;
pub mod prompt;
pub mod session;
pub mod turn;
pub mod util;

// Re-export commonly used types
pub use core::{error::DomainError, kickoff::Kickoff};
pub use persona::{
    entities::{Participant, ParticipantId, Personality},
    registry::PersonaRegistry,
};
pub use prompt::{DEFAULT_TURN_TEMPLATE, RoundConstraints, TurnBuilder};
pub use session::entities::{NextStep, Session, SessionId, SessionState};
pub use turn::{
    USER_SPEAKER,
    entities::{FailureReason, Turn, TurnOutcome},
};
