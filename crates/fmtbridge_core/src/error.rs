//! Core error types.

use std::path::PathBuf;

use fmtbridge_engine::EngineVersion;
use semver::Version;
use thiserror::Error;

/// Errors raised while resolving the engine for a file.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The project's engine is older than the supported minimum.
    #[error("Engine {found} at {} is older than the minimum supported version {minimum}", path.display())]
    Outdated {
        path: PathBuf,
        found: EngineVersion,
        minimum: Version,
    },

    /// The engine named by the `enginePath` setting could not be loaded.
    #[error("Invalid engine path {}: {reason}", path.display())]
    InvalidEnginePath { path: PathBuf, reason: String },

    /// No project engine was usable and the bundled engine is not available.
    #[error("The bundled engine is not available")]
    BundledUnavailable,
}

/// Errors raised while reading a project config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is malformed.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// An `overrides` entry is malformed.
    #[error("Invalid override in {}: {message}", path.display())]
    Override { path: PathBuf, message: String },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an override error.
    pub fn invalid_override(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Override {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the config template command.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A config file already exists and `force` was not given.
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
