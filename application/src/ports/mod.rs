//! Ports (interfaces) implemented by outer layers.
//!
//! - [`completion::CompletionClient`] — the external text-completion provider
//! - [`turn_observer::TurnObserver`] — live progress callbacks
//! - [`transcript_sink::TranscriptSink`] — durable mirror of the feed

pub mod completion;
pub mod transcript_sink;
pub mod turn_observer;
