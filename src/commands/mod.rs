//! Top-level subcommand orchestration.
pub mod generate;
pub mod list;
