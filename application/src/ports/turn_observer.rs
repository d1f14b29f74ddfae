//! Turn observer port
//!
//! Defines the interface for reporting round progress as it happens.

use roundtable_domain::{ParticipantId, SessionId, SessionState, Turn};

/// Callback for progress updates during a roundtable round
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.). Callbacks are invoked
/// from the scheduler task and never while a session lock is held.
pub trait TurnObserver: Send + Sync {
    /// Called once the session enters `Running`
    fn on_round_start(&self, session_id: &SessionId, order: &[ParticipantId]);

    /// Called right before the completion call for a turn
    fn on_turn_start(
        &self,
        _session_id: &SessionId,
        _sequence_number: u64,
        _speaker: &str,
        _recipient: &ParticipantId,
    ) {
    }

    /// Called after a turn has been appended to the feed
    fn on_turn_complete(&self, turn: &Turn);

    /// Called when the scheduler stops driving the session
    fn on_round_complete(&self, session_id: &SessionId, state: SessionState);
}

/// No-op observer for when progress reporting is not needed
pub struct NoTurnObserver;

impl TurnObserver for NoTurnObserver {
    fn on_round_start(&self, _session_id: &SessionId, _order: &[ParticipantId]) {}
    fn on_turn_complete(&self, _turn: &Turn) {}
    fn on_round_complete(&self, _session_id: &SessionId, _state: SessionState) {}
}
