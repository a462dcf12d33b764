//! Documents handed to the edit provider.

use std::path::{Path, PathBuf};

/// A document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File path; `None` for untitled buffers.
    pub path: Option<PathBuf>,
    pub text: String,
    /// Editor language identifier.
    pub language_id: Option<String>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            text: text.into(),
            language_id: None,
        }
    }

    /// Creates a document that has never been saved.
    pub fn untitled(text: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
            language_id: Some(language_id.into()),
        }
    }

    pub fn with_language_id(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Name used in user-facing messages.
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }
}
