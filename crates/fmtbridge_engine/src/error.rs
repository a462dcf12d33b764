//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while an engine formats text.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the document content.
    #[error("{message}")]
    Syntax { message: String },

    /// The engine process failed for a reason other than the document.
    #[error("Engine process failed: {0}")]
    Process(String),

    /// The engine produced output that could not be used.
    #[error("Invalid engine output: {0}")]
    InvalidOutput(String),

    /// I/O error while talking to the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Creates a process error.
    pub fn process(message: impl Into<String>) -> Self {
        Self::Process(message.into())
    }

    /// Returns whether the error was caused by the document content.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// Errors raised while loading an engine installation.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing loadable exists at the path.
    #[error("No engine installation at {}", .0.display())]
    NotFound(PathBuf),

    /// The installation's package manifest could not be read.
    #[error("Invalid package manifest {}: {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    /// The installation is some other package.
    #[error("Package at {} is `{found}`, expected `{expected}`", path.display())]
    WrongPackage {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// The installation has no runnable entry point.
    #[error("Engine at {} has no executable entry point", .0.display())]
    MissingEntryPoint(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
