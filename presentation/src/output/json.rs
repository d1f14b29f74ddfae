//! JSON output formatter

use crate::output::formatter::TranscriptFormatter;
use roundtable_domain::{Session, Turn};
use serde::Serialize;

#[derive(Serialize)]
struct Transcript<'a> {
    session: &'a Session,
    turns: &'a [Turn],
}

/// Formats the session and its turns as pretty-printed JSON
pub struct JsonFormatter;

impl TranscriptFormatter for JsonFormatter {
    fn format(&self, session: &Session, turns: &[Turn]) -> String {
        serde_json::to_string_pretty(&Transcript { session, turns })
            .unwrap_or_else(|_| "{}".to_string())
    }
}
