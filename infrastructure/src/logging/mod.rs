//! Logging infrastructure: durable turn transcripts.
//!
//! Provides [`JsonlTranscriptSink`], a JSONL file writer that implements
//! the [`TranscriptSink`](roundtable_application::TranscriptSink) port.

mod jsonl_transcript;

pub use jsonl_transcript::JsonlTranscriptSink;
