//! Roundtable session domain.
//!
//! - [`entities::Session`] — one roundtable instance and its state machine
//! - [`entities::SessionState`] — `Created → Running → {Completed, Failed, Cancelled}`
//! - [`entities::NextStep`] — the scheduler's next move

pub mod entities;
