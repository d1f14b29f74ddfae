//! Output formatting for round transcripts

pub mod console;
pub mod formatter;
pub mod json;
