//! Persona domain.
//!
//! - [`entities::Participant`] — one named persona at the roundtable
//! - [`entities::Personality`] — the temperament a participant speaks with
//! - [`registry::PersonaRegistry`] — the validated, immutable participant set

pub mod entities;
pub mod registry;
