//! Shared handle to one live session.
//!
//! The scheduler task that drives the session and every external caller
//! (`get`, `cancel`, `wait`) go through the same handle. The session itself
//! sits behind a `std::sync::RwLock` that is only ever held for short,
//! non-async sections; nothing holds it across a completion call.

use roundtable_domain::{DomainError, Session, SessionId, SessionState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub struct SessionHandle {
    id: SessionId,
    session: RwLock<Session>,
    cancel: CancellationToken,
    state_tx: watch::Sender<SessionState>,
    claimed: AtomicBool,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        let (state_tx, _) = watch::channel(session.state());
        Self {
            id: session.id().clone(),
            session: RwLock::new(session),
            cancel: CancellationToken::new(),
            state_tx,
            claimed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Clone of the current session state
    pub fn snapshot(&self) -> Session {
        self.read(Session::clone)
    }

    pub fn state(&self) -> SessionState {
        self.read(Session::state)
    }

    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        f(&*session)
    }

    /// Mutate the session under the write lock and publish the new state.
    pub fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut *session);
        self.state_tx.send_if_modified(|state| {
            if *state != session.state() {
                *state = session.state();
                true
            } else {
                false
            }
        });
        result
    }

    /// Claim the right to drive this session.
    ///
    /// Returns `true` exactly once; later callers get `false`.
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Cancel the session.
    ///
    /// The state flips to `Cancelled` immediately, under the same lock the
    /// scheduler uses to commit turns, so no turn can be appended after this
    /// returns. An in-flight completion call is left to finish and its
    /// result is discarded.
    pub fn cancel(&self) -> Result<(), DomainError> {
        self.update(Session::cancel)?;
        self.cancel.cancel();
        Ok(())
    }

    /// Token fired by [`cancel`](Self::cancel)
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Resolve once the session reaches a terminal state
    pub async fn wait_terminal(&self) -> Session {
        let mut rx = self.state_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|state| state.is_terminal()).await;
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{Kickoff, ParticipantId};
    use std::sync::Arc;
    use std::time::Duration;

    fn handle() -> SessionHandle {
        SessionHandle::new(Session::new(
            SessionId::new("s-1"),
            Kickoff::try_new("topic").unwrap(),
            vec![ParticipantId::new("PM")],
        ))
    }

    #[test]
    fn test_claim_only_once() {
        let h = handle();
        assert!(h.try_claim());
        assert!(!h.try_claim());
    }

    #[test]
    fn test_cancel_created_session() {
        let h = handle();
        h.cancel().unwrap();
        assert_eq!(h.state(), SessionState::Cancelled);
        assert!(h.cancellation_token().is_cancelled());
    }

    #[test]
    fn test_cancel_terminal_session_fails() {
        let h = handle();
        h.update(|s| {
            s.start().unwrap();
            s.complete().unwrap();
        });
        assert!(matches!(
            h.cancel(),
            Err(DomainError::InvalidTransition {
                from: SessionState::Completed,
                ..
            })
        ));
        assert!(!h.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_terminal_resolves_on_completion() {
        let h = Arc::new(handle());
        let waiter = {
            let h = Arc::clone(&h);
            tokio::spawn(async move { h.wait_terminal().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        h.update(|s| {
            s.start().unwrap();
            s.complete().unwrap();
        });

        let session = waiter.await.unwrap();
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[tokio::test]
    async fn test_wait_terminal_returns_immediately_when_done() {
        let h = handle();
        h.cancel().unwrap();
        let session = h.wait_terminal().await;
        assert_eq!(session.state(), SessionState::Cancelled);
    }
}
