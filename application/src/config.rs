//! Application-level configuration.
//!
//! [`RoundtableConfig`] groups the parameters that control how rounds are
//! scheduled: generation options for each completion call, the formatting
//! constraints embedded in every prompt, the kickoff participant, and the
//! concurrency bound on running sessions.

use crate::ports::completion::CompletionOptions;
use roundtable_domain::{ParticipantId, RoundConstraints};
use std::time::Duration;

/// Roundtable scheduling configuration.
#[derive(Debug, Clone)]
pub struct RoundtableConfig {
    /// Options passed to every completion call
    pub completion: CompletionOptions,
    /// Rules embedded in every turn prompt
    pub constraints: RoundConstraints,
    /// Participant who always opens a round, unless a kickoff names one
    pub kickoff_participant: Option<ParticipantId>,
    /// Maximum number of sessions in `Running` at the same time
    pub max_concurrent_sessions: usize,
}

impl Default for RoundtableConfig {
    fn default() -> Self {
        Self {
            completion: CompletionOptions::default(),
            constraints: RoundConstraints::default(),
            kickoff_participant: None,
            max_concurrent_sessions: 4,
        }
    }
}

impl RoundtableConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.completion.timeout = timeout;
        self
    }

    /// Creates a config with the completion timeout given in seconds.
    pub fn with_timeout_seconds(self, seconds: u64) -> Self {
        self.with_timeout(Duration::from_secs(seconds))
    }

    pub fn with_completion(mut self, completion: CompletionOptions) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_constraints(mut self, constraints: RoundConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_kickoff_participant(mut self, id: impl Into<ParticipantId>) -> Self {
        self.kickoff_participant = Some(id.into());
        self
    }

    /// Values below 1 are clamped to 1.
    pub fn with_max_concurrent_sessions(mut self, max: usize) -> Self {
        self.max_concurrent_sessions = max.max(1);
        self
    }
}
