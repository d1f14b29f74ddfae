//! Completion provider adapters.

mod chat_completions;

pub use chat_completions::{ChatCompletionsClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
