//! Application layer for roundtable
//!
//! This crate contains the scheduler, the session registry, the observation
//! feed, port definitions and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod feed;
pub mod ports;
pub mod registry;
pub mod use_cases;

// Re-export commonly used types
pub use config::RoundtableConfig;
pub use feed::ObservationFeed;
pub use ports::{
    completion::{CompletionClient, CompletionError, CompletionOptions},
    transcript_sink::{NoTranscriptSink, TranscriptSink},
    turn_observer::{NoTurnObserver, TurnObserver},
};
pub use registry::{RegistryError, SessionRegistry};
pub use use_cases::run_roundtable::{RunRoundtableError, RunRoundtableUseCase};
pub use use_cases::session_handle::SessionHandle;
