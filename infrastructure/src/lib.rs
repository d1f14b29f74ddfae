//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, DEFAULT_API_KEY_ENV, FileConfig, FileParticipantConfig,
    FileProviderConfig, FileRoundtableConfig, FileTranscriptConfig,
};
pub use logging::JsonlTranscriptSink;
pub use providers::{ChatCompletionsClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
