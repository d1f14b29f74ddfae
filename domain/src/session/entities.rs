//! Session domain entities

use crate::core::error::DomainError;
use crate::core::kickoff::Kickoff;
use crate::persona::entities::ParticipantId;
use crate::turn::USER_SPEAKER;
use crate::turn::entities::{FailureReason, Turn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a roundtable session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a process-unique id: creation time plus a monotonic counter.
    pub fn generate() -> Self {
        let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis();
        Self(format!("rt-{:x}-{:04}", millis, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a session
///
/// ```text
/// Created ──> Running ──> Completed
///    │           ├──────> Failed
///    │           └──────> Cancelled
///    └──────────────────> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Created, SessionState::Running)
                | (SessionState::Created, SessionState::Cancelled)
                | (SessionState::Running, SessionState::Completed)
                | (SessionState::Running, SessionState::Failed)
                | (SessionState::Running, SessionState::Cancelled)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the scheduler should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Ask `recipient` to answer `message`, which `speaker` said
    Speak {
        sequence_number: u64,
        speaker: String,
        recipient: ParticipantId,
        message: String,
    },
    /// Every participant has spoken (or the next one would address itself)
    RoundComplete,
}

/// One roundtable instance (Entity)
///
/// Owned by the session registry; mutated only by the scheduler task that
/// runs it. `participant_order` never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    kickoff: Kickoff,
    participant_order: Vec<ParticipantId>,
    state: SessionState,
    current_sequence_number: u64,
    last_speaker: String,
    last_message: String,
    failure: Option<FailureReason>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(id: SessionId, kickoff: Kickoff, participant_order: Vec<ParticipantId>) -> Self {
        let last_message = kickoff.text().to_string();
        Self {
            id,
            kickoff,
            participant_order,
            state: SessionState::Created,
            current_sequence_number: 0,
            last_speaker: USER_SPEAKER.to_string(),
            last_message,
            failure: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn kickoff(&self) -> &Kickoff {
        &self.kickoff
    }

    pub fn participant_order(&self) -> &[ParticipantId] {
        &self.participant_order
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Sequence number the next turn will carry.
    pub fn current_sequence_number(&self) -> u64 {
        self.current_sequence_number
    }

    pub fn last_speaker(&self) -> &str {
        &self.last_speaker
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        self.failure.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Decide the next step of the round.
    pub fn next_step(&self) -> NextStep {
        let Some(recipient) = self
            .participant_order
            .get(self.current_sequence_number as usize)
        else {
            return NextStep::RoundComplete;
        };

        // Anti-loop: never ask a participant to answer itself
        if recipient.as_str() == self.last_speaker {
            return NextStep::RoundComplete;
        }

        NextStep::Speak {
            sequence_number: self.current_sequence_number,
            speaker: self.last_speaker.clone(),
            recipient: recipient.clone(),
            message: self.last_message.clone(),
        }
    }

    /// Advance past a recorded turn.
    ///
    /// A successful turn's output becomes the next participant's input.
    pub fn record_turn(&mut self, turn: &Turn) {
        debug_assert_eq!(turn.session_id(), &self.id);
        debug_assert_eq!(turn.sequence_number(), self.current_sequence_number);

        self.current_sequence_number += 1;
        if turn.is_ok() {
            self.last_speaker = turn.recipient_id().to_string();
            self.last_message = turn.output_text().to_string();
        }
    }

    pub fn start(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Running)
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Completed)
    }

    pub fn fail(&mut self, reason: FailureReason) -> Result<(), DomainError> {
        self.transition(SessionState::Failed)?;
        self.failure = Some(reason);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Cancelled)
    }

    fn transition(&mut self, next: SessionState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(order: &[&str]) -> Session {
        Session::new(
            SessionId::new("s-1"),
            Kickoff::try_new("build a scheduling app").unwrap(),
            order.iter().map(|id| ParticipantId::new(*id)).collect(),
        )
    }

    fn ok_turn(session: &Session, output: &str) -> Turn {
        let NextStep::Speak {
            sequence_number,
            speaker,
            recipient,
            message,
        } = session.next_step()
        else {
            panic!("expected a step");
        };
        Turn::record(
            session.id().clone(),
            sequence_number,
            speaker,
            recipient,
            message,
            Ok(output.to_string()),
        )
    }

    #[test]
    fn test_new_session_is_created() {
        let s = session(&["PM", "CTO"]);
        assert_eq!(s.state(), SessionState::Created);
        assert_eq!(s.current_sequence_number(), 0);
        assert_eq!(s.last_speaker(), "User");
        assert_eq!(s.last_message(), "build a scheduling app");
        assert!(s.finished_at().is_none());
    }

    #[test]
    fn test_first_step_is_from_user() {
        let s = session(&["PM", "CTO"]);
        assert_eq!(
            s.next_step(),
            NextStep::Speak {
                sequence_number: 0,
                speaker: "User".to_string(),
                recipient: ParticipantId::new("PM"),
                message: "build a scheduling app".to_string(),
            }
        );
    }

    #[test]
    fn test_output_chains_to_next_participant() {
        let mut s = session(&["PM", "CTO"]);
        s.start().unwrap();
        let turn = ok_turn(&s, "Focus on reliability.");
        s.record_turn(&turn);

        match s.next_step() {
            NextStep::Speak {
                sequence_number,
                speaker,
                recipient,
                message,
            } => {
                assert_eq!(sequence_number, 1);
                assert_eq!(speaker, "PM");
                assert_eq!(recipient.as_str(), "CTO");
                assert_eq!(message, "Focus on reliability.");
            }
            NextStep::RoundComplete => panic!("round should continue"),
        }
    }

    #[test]
    fn test_round_completes_after_all_participants() {
        let mut s = session(&["PM", "CTO"]);
        s.start().unwrap();
        for text in ["a", "b"] {
            let turn = ok_turn(&s, text);
            s.record_turn(&turn);
        }
        assert_eq!(s.next_step(), NextStep::RoundComplete);
    }

    #[test]
    fn test_single_participant_never_addresses_itself() {
        let mut s = session(&["PM"]);
        s.start().unwrap();
        let turn = ok_turn(&s, "Ship it.");
        s.record_turn(&turn);
        assert_eq!(s.next_step(), NextStep::RoundComplete);
    }

    #[test]
    fn test_valid_transitions() {
        let mut s = session(&["PM"]);
        s.start().unwrap();
        assert_eq!(s.state(), SessionState::Running);
        s.complete().unwrap();
        assert_eq!(s.state(), SessionState::Completed);
        assert!(s.finished_at().is_some());
    }

    #[test]
    fn test_cancel_before_start() {
        let mut s = session(&["PM"]);
        s.cancel().unwrap();
        assert_eq!(s.state(), SessionState::Cancelled);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut s = session(&["PM"]);
        s.start().unwrap();
        s.fail(FailureReason::Timeout).unwrap();
        assert_eq!(s.failure(), Some(&FailureReason::Timeout));

        assert_eq!(
            s.start().unwrap_err(),
            DomainError::InvalidTransition {
                from: SessionState::Failed,
                to: SessionState::Running,
            }
        );
        assert!(s.cancel().is_err());
        assert!(s.complete().is_err());
        assert_eq!(s.state(), SessionState::Failed);
    }

    #[test]
    fn test_cannot_complete_without_running() {
        let mut s = session(&["PM"]);
        assert!(s.complete().is_err());
        assert!(s.fail(FailureReason::Timeout).is_err());
        assert!(s.failure().is_none());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("rt-"));
    }
}
