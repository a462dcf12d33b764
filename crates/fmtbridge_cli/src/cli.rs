//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fmtbridge - Format files with the project's own prettier
#[derive(Parser)]
#[command(name = "fmtbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (JSONC, same keys as the editor settings)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Engine installation to use instead of resolving one
    #[arg(long, global = true)]
    pub engine_path: Option<PathBuf>,

    /// Installation directory of the bundled engine
    #[arg(long, global = true)]
    pub bundled_engine_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Format files
    Format {
        /// Files to format
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,

        /// Only report files that would change
        #[arg(long, conflicts_with = "write")]
        check: bool,
    },

    /// Show the engine, config and ignore state for a file
    Resolve {
        /// File to inspect
        file: PathBuf,
    },

    /// Create a default config file in the current directory
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Start the LSP server
    Lsp,
}
