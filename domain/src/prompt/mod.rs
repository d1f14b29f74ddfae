//! Prompt domain
//!
//! Builds the per-turn instruction each participant receives.

mod turn_builder;

pub use turn_builder::{DEFAULT_TURN_TEMPLATE, RoundConstraints, TurnBuilder};
