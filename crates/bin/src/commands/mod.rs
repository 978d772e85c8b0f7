//! Subcommand implementations.

pub mod data;
pub mod session;
pub mod sync;
