//! Completion client port
//!
//! Defines the interface for the external text-completion provider.
//! One call per turn; no retries happen behind this interface.

use async_trait::async_trait;
use roundtable_domain::FailureReason;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a completion provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Convert into the reason recorded on the failed turn
    pub fn to_failure_reason(&self) -> FailureReason {
        match self {
            CompletionError::Timeout => FailureReason::Timeout,
            CompletionError::RateLimited { retry_after } => FailureReason::RateLimited {
                retry_after_secs: retry_after.map(|d| d.as_secs()),
            },
            CompletionError::Upstream { status, body } => FailureReason::Upstream {
                status: *status,
                body: body.clone(),
            },
            CompletionError::Transport(message) => FailureReason::Transport {
                message: message.clone(),
            },
            CompletionError::MalformedResponse(message) => FailureReason::Malformed {
                message: message.clone(),
            },
        }
    }
}

/// Per-call generation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Hard upper bound on a single call; the provider can stall indefinitely
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CompletionOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for a text-completion provider
///
/// Implementations (adapters) live in the infrastructure layer. They must
/// honour `options.timeout` and must not retry; retry policy belongs to the
/// scheduler, which currently never retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the generated text
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_mapping() {
        assert_eq!(
            CompletionError::Timeout.to_failure_reason(),
            FailureReason::Timeout
        );
        assert_eq!(
            CompletionError::RateLimited {
                retry_after: Some(Duration::from_secs(12))
            }
            .to_failure_reason(),
            FailureReason::RateLimited {
                retry_after_secs: Some(12)
            }
        );
        assert_eq!(
            CompletionError::Upstream {
                status: 503,
                body: "unavailable".to_string()
            }
            .to_failure_reason(),
            FailureReason::Upstream {
                status: 503,
                body: "unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_default_options() {
        let options = CompletionOptions::default();
        assert_eq!(options.max_tokens, 100);
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert!((options.temperature - 0.7).abs() < f32::EPSILON);
    }
}
