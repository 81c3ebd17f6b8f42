//! Binary entry point for the etcgen CLI.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod directory;
mod error;
mod generator;
mod logging;
mod state;
mod templates;
mod writer;

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);

    match args.command {
        cli::Command::Generate(opts) => commands::generate::run(&args.global, &opts),
        cli::Command::List => commands::list::run(),
        cli::Command::Version => {
            let version = option_env!("ETCGEN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("etcgen {version}");
            Ok(())
        }
    }
}
