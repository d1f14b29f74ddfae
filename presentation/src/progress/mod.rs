//! Live progress reporting while a round runs

pub mod reporter;
