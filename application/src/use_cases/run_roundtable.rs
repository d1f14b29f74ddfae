//! Run Roundtable use case
//!
//! Drives one round of a session: each participant in `participant_order`
//! answers the previous participant's output, one completion call at a
//! time. The first failure stops the round (no retries). Cancellation is
//! checked before every step and again when a result is committed. A call
//! already in flight is never aborted: it finishes (or times out) and its
//! result is discarded if the session was cancelled meanwhile.

use super::session_handle::SessionHandle;
use crate::config::RoundtableConfig;
use crate::feed::ObservationFeed;
use crate::ports::completion::{CompletionClient, CompletionError};
use crate::ports::turn_observer::{NoTurnObserver, TurnObserver};
use roundtable_domain::util::log_preview;
use roundtable_domain::{
    NextStep, Participant, PersonaRegistry, SessionId, SessionState, Turn, TurnBuilder,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that prevent a round from being driven at all
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RunRoundtableError {
    #[error("Session {0} is already being driven by another scheduler")]
    AlreadyClaimed(SessionId),

    #[error("Session {session} references unknown participant {participant}")]
    UnknownParticipant {
        session: SessionId,
        participant: String,
    },
}

/// Use case for running a roundtable round
pub struct RunRoundtableUseCase<C: CompletionClient + 'static> {
    client: Arc<C>,
    personas: Arc<PersonaRegistry>,
    feed: Arc<ObservationFeed>,
    config: RoundtableConfig,
    observer: Arc<dyn TurnObserver>,
}

impl<C: CompletionClient + 'static> RunRoundtableUseCase<C> {
    pub fn new(
        client: Arc<C>,
        personas: Arc<PersonaRegistry>,
        feed: Arc<ObservationFeed>,
        config: RoundtableConfig,
    ) -> Self {
        Self {
            client,
            personas,
            feed,
            config,
            observer: Arc::new(NoTurnObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn personas(&self) -> &Arc<PersonaRegistry> {
        &self.personas
    }

    pub fn feed(&self) -> &Arc<ObservationFeed> {
        &self.feed
    }

    pub fn config(&self) -> &RoundtableConfig {
        &self.config
    }

    /// Drive the session to a terminal state.
    ///
    /// Provider failures are not errors here: they end the round with
    /// `SessionState::Failed`. The returned state is the one the session
    /// was left in.
    pub async fn execute(&self, handle: &SessionHandle) -> Result<SessionState, RunRoundtableError> {
        if !handle.try_claim() {
            return Err(RunRoundtableError::AlreadyClaimed(handle.id().clone()));
        }

        let session_id = handle.id().clone();
        let order = handle.read(|s| s.participant_order().to_vec());

        // Resolve every participant before the first call so that a bad
        // order never leaves a half-run session behind
        if let Some(missing) = order.iter().find(|id| !self.personas.contains(id.as_str())) {
            warn!(
                "Session {} references unknown participant {}",
                session_id, missing
            );
            let _ = handle.cancel();
            return Err(RunRoundtableError::UnknownParticipant {
                session: session_id,
                participant: missing.to_string(),
            });
        }

        if let Err(e) = handle.update(|s| s.start()) {
            // Cancelled while waiting for a slot
            debug!("Session {} not started: {}", session_id, e);
            return Ok(handle.state());
        }

        info!(
            "Starting roundtable {} with {} participants",
            session_id,
            order.len()
        );
        self.observer.on_round_start(&session_id, &order);

        loop {
            // Top-of-step cancellation check
            let step = handle.read(|s| (s.state() == SessionState::Running).then(|| s.next_step()));
            let Some(step) = step else {
                info!("Roundtable {} cancelled", session_id);
                break;
            };

            let NextStep::Speak {
                sequence_number,
                speaker,
                recipient,
                message,
            } = step
            else {
                let _ = handle.update(|s| s.complete());
                info!("Roundtable {} completed", session_id);
                break;
            };

            let Some(participant) = self.personas.get(recipient.as_str()) else {
                // Checked above; the registry is immutable
                break;
            };

            self.observer
                .on_turn_start(&session_id, sequence_number, &speaker, &recipient);

            // Runs to completion even if the session is cancelled meanwhile;
            // the commit below drops the result in that case
            let result = self.take_turn(participant, &speaker, &message).await;
            if let Err(e) = &result {
                warn!(
                    "Participant {} failed on turn {} of {}: {}",
                    recipient, sequence_number, session_id, e
                );
            }

            let turn = Turn::record(
                session_id.clone(),
                sequence_number,
                speaker,
                recipient,
                message,
                result.map_err(|e| e.to_failure_reason()),
            );

            // Commit under the session lock so cancel() and append are ordered
            let committed = handle.update(|s| {
                if s.state() != SessionState::Running {
                    return false;
                }
                self.feed.insert(&turn);
                s.record_turn(&turn);
                if let Some(reason) = turn.outcome().failure() {
                    let _ = s.fail(reason.clone());
                }
                true
            });

            if !committed {
                info!(
                    "Roundtable {} cancelled during turn {}; result discarded",
                    session_id, sequence_number
                );
                break;
            }
            self.feed.publish(turn.clone());

            debug!(
                "Turn {} of {}: {} -> {}: {}",
                sequence_number,
                session_id,
                turn.speaker_id(),
                turn.recipient_id(),
                log_preview(turn.output_text(), 80)
            );
            self.observer.on_turn_complete(&turn);

            if !turn.is_ok() {
                break;
            }
        }

        let state = handle.state();
        self.observer.on_round_complete(&session_id, state);
        Ok(state)
    }

    /// One completion call, bounded by the configured timeout.
    ///
    /// No lock is held here; this is the only suspension point of a round.
    async fn take_turn(
        &self,
        participant: &Participant,
        speaker: &str,
        message: &str,
    ) -> Result<String, CompletionError> {
        let prompt =
            TurnBuilder::build_prompt(participant, speaker, message, &self.config.constraints);
        let options = &self.config.completion;

        match tokio::time::timeout(options.timeout, self.client.complete(&prompt, options)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout),
        }
    }
}
