//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Default location of the JSON state document exported by the
/// administrative service.
pub const DEFAULT_STATE_PATH: &str = "/var/db/etcgen/state.json";

/// Top-level CLI entry point for the configuration materialization engine.
#[derive(Parser, Debug)]
#[command(
    name = "etcgen",
    about = "System configuration materialization engine",
    version
)]
pub struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Path to the JSON state document
    #[arg(long, global = true, default_value = DEFAULT_STATE_PATH)]
    pub state: std::path::PathBuf,

    /// Output root directory (target paths are relative to this)
    #[arg(long, global = true, default_value = "/")]
    pub root: std::path::PathBuf,

    /// Preview outcomes without touching the filesystem
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one render pass over all templates
    Generate(GenerateOpts),
    /// List registered templates and their targets
    List,
    /// Print version information
    Version,
}

/// Options for the `generate` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct GenerateOpts {
    /// Render only specific templates
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip specific templates
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}
