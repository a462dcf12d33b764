//! fmtbridge CLI
//!
//! Resolves the project-local engine, config and ignore rules for files and
//! formats them, or serves the same logic to editors over LSP.

mod cli;
mod commands;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::format::run_format;
use commands::init::run_init;
use commands::lsp::run_lsp;
use commands::resolve::run_resolve;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Commands::Format {
            files,
            write,
            check,
        } => run_format(&cli, files, *write, *check),
        Commands::Resolve { file } => run_resolve(&cli, file).map(|_| false),
        Commands::Init { force } => run_init(*force).map(|_| false),
        Commands::Lsp => run_lsp().map(|_| false),
    }
}
