//! Engine trait and handle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{EngineError, EngineVersion, LanguageInfo};

/// Option name to value, passed to the engine as-is.
pub type FormatOptions = serde_json::Map<String, serde_json::Value>;

/// A single format request.
#[derive(Debug, Clone, Copy)]
pub struct FormatRequest<'a> {
    /// Path of the document being formatted, if it has one.
    pub file_path: Option<&'a Path>,
    /// Parser to use when the options do not name one.
    pub parser: Option<&'a str>,
    /// Merged formatting options.
    pub options: &'a FormatOptions,
}

/// A loaded formatting engine.
///
/// Implementations must be usable from several threads at once; the host
/// may format different documents concurrently.
pub trait Engine: Send + Sync {
    /// Formats `text` and returns the formatted text.
    fn format(&self, text: &str, request: &FormatRequest<'_>) -> Result<String, EngineError>;

    /// Returns the languages the engine supports.
    fn languages(&self) -> Result<Vec<LanguageInfo>, EngineError>;
}

/// Where an engine instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineOrigin {
    /// The fallback engine shipped alongside fmtbridge.
    Bundled,
    /// An installation found in the user's project.
    ProjectLocal,
}

impl fmt::Display for EngineOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => write!(f, "bundled"),
            Self::ProjectLocal => write!(f, "project-local"),
        }
    }
}

/// Reference to a loaded engine instance.
///
/// Cloning a handle shares the underlying instance.
#[derive(Clone)]
pub struct EngineHandle {
    engine: Arc<dyn Engine>,
    version: EngineVersion,
    origin: EngineOrigin,
    location: PathBuf,
}

impl EngineHandle {
    /// Creates a new handle.
    pub fn new(
        engine: Arc<dyn Engine>,
        version: EngineVersion,
        origin: EngineOrigin,
        location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            version,
            origin,
            location: location.into(),
        }
    }

    /// Returns the engine version.
    pub fn version(&self) -> &EngineVersion {
        &self.version
    }

    /// Returns where the engine came from.
    pub fn origin(&self) -> EngineOrigin {
        self.origin
    }

    /// Returns the installation directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Returns whether both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &EngineHandle) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.engine), Arc::as_ptr(&other.engine))
    }

    /// Formats text with this engine.
    pub fn format(&self, text: &str, request: &FormatRequest<'_>) -> Result<String, EngineError> {
        self.engine.format(text, request)
    }

    /// Returns the languages this engine supports.
    pub fn languages(&self) -> Result<Vec<LanguageInfo>, EngineError> {
        self.engine.languages()
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("version", &self.version)
            .field("origin", &self.origin)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
