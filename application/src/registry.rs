//! Session registry: the front door for starting and controlling rounds.
//!
//! Every `create` gets its own session and its own scheduler task. A
//! semaphore bounds how many sessions are `Running` at once; sessions
//! beyond the bound stay `Created` until a slot frees up (or they are
//! cancelled while waiting).

use crate::feed::ObservationFeed;
use crate::use_cases::run_roundtable::RunRoundtableUseCase;
use crate::use_cases::session_handle::SessionHandle;
use crate::ports::completion::CompletionClient;
use roundtable_domain::{DomainError, Kickoff, Session, SessionId, SessionState};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Errors returned synchronously by the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session {id} is already {state}")]
    AlreadyTerminal { id: SessionId, state: SessionState },

    #[error("Kickoff text cannot be empty")]
    EmptyKickoff,

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Cannot build a speaking order: {0}")]
    Panel(DomainError),
}

/// Tracks live and finished sessions by id.
///
/// Finished sessions are kept until [`prune_finished`](Self::prune_finished)
/// drops them; their turns stay in the append-only feed regardless.
pub struct SessionRegistry<C: CompletionClient + 'static> {
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
    slots: Arc<Semaphore>,
    runner: Arc<RunRoundtableUseCase<C>>,
}

impl<C: CompletionClient + 'static> SessionRegistry<C> {
    pub fn new(runner: RunRoundtableUseCase<C>) -> Self {
        let slots = Arc::new(Semaphore::new(runner.config().max_concurrent_sessions.max(1)));
        Self {
            sessions: RwLock::new(HashMap::new()),
            slots,
            runner: Arc::new(runner),
        }
    }

    /// Feed shared by every session in this registry
    pub fn feed(&self) -> &Arc<ObservationFeed> {
        self.runner.feed()
    }

    /// Create a session from raw kickoff text and start its round.
    pub fn create_text(&self, text: &str) -> Result<SessionId, RegistryError> {
        let kickoff = Kickoff::try_new(text).map_err(|_| RegistryError::EmptyKickoff)?;
        self.create(kickoff)
    }

    /// Create a session and spawn its round; returns without waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create(&self, kickoff: Kickoff) -> Result<SessionId, RegistryError> {
        if kickoff.text().trim().is_empty() {
            return Err(RegistryError::EmptyKickoff);
        }

        let first = kickoff
            .recipient()
            .or(self.runner.config().kickoff_participant.as_ref());
        let order = self
            .runner
            .personas()
            .speaking_order(first)
            .map_err(order_error)?;

        let id = SessionId::generate();
        let handle = Arc::new(SessionHandle::new(Session::new(id.clone(), kickoff, order)));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::clone(&handle));
        info!("Created session {}", id);

        let slots = Arc::clone(&self.slots);
        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            let token = handle.cancellation_token().clone();
            let permit = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                permit = slots.acquire_owned() => permit.ok(),
            };
            let Some(_permit) = permit else {
                debug!("Session {} cancelled before it got a slot", handle.id());
                return;
            };

            if let Err(e) = runner.execute(&handle).await {
                warn!("Session {} did not run: {}", handle.id(), e);
            }
        });

        Ok(id)
    }

    fn handle(&self, id: &SessionId) -> Result<Arc<SessionHandle>, RegistryError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Snapshot of one session
    pub fn get(&self, id: &SessionId) -> Result<Session, RegistryError> {
        Ok(self.handle(id)?.snapshot())
    }

    /// Cancel a session that has not yet reached a terminal state.
    ///
    /// Once this returns `Ok`, no further turn of the session is appended
    /// to the feed.
    pub fn cancel(&self, id: &SessionId) -> Result<(), RegistryError> {
        let handle = self.handle(id)?;
        handle.cancel().map_err(|_| RegistryError::AlreadyTerminal {
            id: id.clone(),
            state: handle.state(),
        })?;
        info!("Cancelled session {}", id);
        Ok(())
    }

    /// Snapshots of every known session, oldest first
    pub fn list(&self) -> Vec<Session> {
        let handles: Vec<_> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        let mut sessions: Vec<_> = handles.iter().map(|h| h.snapshot()).collect();
        sessions.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        sessions
    }

    /// Resolve once the session is `Completed`, `Failed` or `Cancelled`
    pub async fn wait(&self, id: &SessionId) -> Result<Session, RegistryError> {
        let handle = self.handle(id)?;
        Ok(handle.wait_terminal().await)
    }

    /// Forget every session in a terminal state; returns how many were
    /// dropped. Later lookups of those ids report `NotFound`.
    pub fn prune_finished(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, handle| !handle.state().is_terminal());
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} finished sessions", pruned);
        }
        pruned
    }
}

/// Only an unknown participant is a caller error; anything else from
/// `speaking_order` is reported as a panel problem, not relabelled.
fn order_error(e: DomainError) -> RegistryError {
    match e {
        DomainError::UnknownParticipant(id) => RegistryError::UnknownParticipant(id),
        other => RegistryError::Panel(other),
    }
}
