//! Port for mirroring the feed to a durable transcript.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures every turn
//! in a machine-readable format (JSONL). It is an audit trail, not session
//! persistence; nothing is ever read back.

use roundtable_domain::Turn;

/// Port for recording appended turns.
///
/// The `record` method is synchronous and non-fallible so that a broken
/// transcript never disturbs a running round.
pub trait TranscriptSink: Send + Sync {
    fn record(&self, turn: &Turn);
}

/// No-op implementation for tests and when the transcript is disabled.
pub struct NoTranscriptSink;

impl TranscriptSink for NoTranscriptSink {
    fn record(&self, _turn: &Turn) {}
}
