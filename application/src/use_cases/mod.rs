//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_roundtable;
pub mod session_handle;
