//! Turn entities: one participant's contribution and its outcome.

use crate::persona::entities::ParticipantId;
use crate::session::entities::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a turn failed.
///
/// Mirrors the completion provider's error taxonomy so the feed can show
/// the cause without depending on the application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The provider did not answer within the configured timeout
    Timeout,
    /// The provider rejected the request with a rate limit
    RateLimited { retry_after_secs: Option<u64> },
    /// The provider answered with a non-success status
    Upstream { status: u16, body: String },
    /// The request never reached the provider (DNS, connection reset, ...)
    Transport { message: String },
    /// The provider answered 2xx but the body was unusable
    Malformed { message: String },
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::RateLimited { .. } => "rate_limited",
            FailureReason::Upstream { .. } => "upstream",
            FailureReason::Transport { .. } => "transport",
            FailureReason::Malformed { .. } => "malformed",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Timeout => write!(f, "Timeout"),
            FailureReason::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "RateLimited (retry after {}s)", secs),
            FailureReason::RateLimited {
                retry_after_secs: None,
            } => write!(f, "RateLimited"),
            FailureReason::Upstream { status, body } => write!(f, "Upstream({}): {}", status, body),
            FailureReason::Transport { message } => write!(f, "Transport: {}", message),
            FailureReason::Malformed { message } => write!(f, "Malformed response: {}", message),
        }
    }
}

/// Outcome of a single turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TurnOutcome {
    Ok,
    Error(FailureReason),
}

impl TurnOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, TurnOutcome::Ok)
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            TurnOutcome::Ok => None,
            TurnOutcome::Error(reason) => Some(reason),
        }
    }
}

/// One scheduler step, recorded exactly once (Entity)
///
/// `speaker_id` is whoever produced `input_text` (the literal `"User"` for
/// the kickoff); `recipient_id` is the participant who answered it.
/// Fields are private: a turn is never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    session_id: SessionId,
    speaker_id: String,
    recipient_id: ParticipantId,
    input_text: String,
    output_text: String,
    sequence_number: u64,
    timestamp: DateTime<Utc>,
    outcome: TurnOutcome,
}

impl Turn {
    /// Record a turn from the result of a completion call.
    ///
    /// On failure the output text is empty and the reason becomes the outcome.
    pub fn record(
        session_id: SessionId,
        sequence_number: u64,
        speaker_id: impl Into<String>,
        recipient_id: ParticipantId,
        input_text: impl Into<String>,
        result: Result<String, FailureReason>,
    ) -> Self {
        let (output_text, outcome) = match result {
            Ok(text) => (text, TurnOutcome::Ok),
            Err(reason) => (String::new(), TurnOutcome::Error(reason)),
        };

        Self {
            session_id,
            speaker_id: speaker_id.into(),
            recipient_id,
            input_text: input_text.into(),
            output_text,
            sequence_number,
            timestamp: Utc::now(),
            outcome,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn speaker_id(&self) -> &str {
        &self.speaker_id
    }

    pub fn recipient_id(&self) -> &ParticipantId {
        &self.recipient_id
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn outcome(&self) -> &TurnOutcome {
        &self.outcome
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionId {
        SessionId::new("s-1")
    }

    #[test]
    fn test_record_success() {
        let turn = Turn::record(
            session(),
            0,
            "User",
            ParticipantId::new("PM"),
            "build a scheduling app",
            Ok("Focus on reliability.".to_string()),
        );
        assert!(turn.is_ok());
        assert_eq!(turn.speaker_id(), "User");
        assert_eq!(turn.recipient_id().as_str(), "PM");
        assert_eq!(turn.output_text(), "Focus on reliability.");
        assert_eq!(turn.sequence_number(), 0);
    }

    #[test]
    fn test_record_failure_has_empty_output() {
        let turn = Turn::record(
            session(),
            1,
            "PM",
            ParticipantId::new("CTO"),
            "Focus on reliability.",
            Err(FailureReason::Timeout),
        );
        assert!(!turn.is_ok());
        assert_eq!(turn.output_text(), "");
        assert_eq!(turn.outcome().failure(), Some(&FailureReason::Timeout));
    }

    #[test]
    fn test_outcome_serialization() {
        let ok = serde_json::to_value(TurnOutcome::Ok).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "ok"}));

        let err = serde_json::to_value(TurnOutcome::Error(FailureReason::Upstream {
            status: 502,
            body: "bad gateway".to_string(),
        }))
        .unwrap();
        assert_eq!(err["status"], "error");
        assert_eq!(err["reason"]["kind"], "upstream");
        assert_eq!(err["reason"]["status"], 502);
    }

    #[test]
    fn test_failure_reason_display() {
        assert_eq!(FailureReason::Timeout.to_string(), "Timeout");
        assert_eq!(
            FailureReason::RateLimited {
                retry_after_secs: Some(30)
            }
            .to_string(),
            "RateLimited (retry after 30s)"
        );
        assert_eq!(
            FailureReason::Upstream {
                status: 500,
                body: "boom".to_string()
            }
            .to_string(),
            "Upstream(500): boom"
        );
    }
}
