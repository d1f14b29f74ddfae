//! Output formatter trait

use roundtable_domain::{Session, Turn};

/// Trait for rendering a finished (or cancelled) round
pub trait TranscriptFormatter: Send + Sync {
    /// Render the session summary followed by its turns in order
    fn format(&self, session: &Session, turns: &[Turn]) -> String;
}
