//! Turn domain.
//!
//! - [`entities::Turn`] — one participant's contribution within a session
//! - [`entities::TurnOutcome`] — `ok` or `error(reason)`
//! - [`entities::FailureReason`] — typed cause of a failed turn

pub mod entities;

/// Speaker recorded for the kickoff step.
pub const USER_SPEAKER: &str = "User";
