//! Core domain concepts shared across all subdomains.
//!
//! - [`kickoff::Kickoff`] — the opening message that starts a roundtable
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod kickoff;
