//! LSP Backend state management.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tower_lsp::lsp_types::Url;
use tracing::error;

use fmtbridge_core::{Document, EditorSettings, NotificationSink, Session};
use fmtbridge_engine::{EngineLoader, EnginePackage};

/// Builds the engine loader for a set of settings.
pub type LoaderFactory = Arc<dyn Fn(&EditorSettings) -> Arc<dyn EngineLoader> + Send + Sync>;

/// Document content and version cache.
#[derive(Debug, Clone)]
pub(crate) struct DocumentData {
    pub text: String,
    pub version: i32,
    pub language_id: String,
}

impl DocumentData {
    /// Converts the cached content into a core document for `uri`.
    pub fn to_document(&self, uri: &Url) -> Document {
        match uri.to_file_path() {
            Ok(path) if uri.scheme() == "file" => {
                Document::new(path, self.text.clone()).with_language_id(self.language_id.clone())
            }
            _ => Document::untitled(self.text.clone(), self.language_id.clone()),
        }
    }
}

/// Shared backend state.
pub(crate) struct BackendState {
    /// Document contents cache.
    pub documents: RwLock<HashMap<Url, DocumentData>>,
    /// Resolution services, created during `initialize`.
    pub session: RwLock<Option<Arc<Session>>>,
    /// Whether the client registers formatting dynamically.
    pub dynamic_formatting: AtomicBool,
    /// Whether a formatting registration is currently active on the client.
    pub formatting_registered: AtomicBool,
    /// Whether file watchers are currently registered on the client.
    pub watchers_registered: AtomicBool,
    loader_factory: LoaderFactory,
}

impl fmt::Debug for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendState")
            .field("documents", &"<HashMap<Url, DocumentData>>")
            .field("session", &"<Option<Session>>")
            .field("dynamic_formatting", &self.dynamic_formatting)
            .field("formatting_registered", &self.formatting_registered)
            .finish()
    }
}

impl BackendState {
    pub fn new(loader_factory: LoaderFactory) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            dynamic_formatting: AtomicBool::new(false),
            formatting_registered: AtomicBool::new(false),
            watchers_registered: AtomicBool::new(false),
            loader_factory,
        }
    }

    /// Returns the active session, if `initialize` has run.
    pub fn session(&self) -> Option<Arc<Session>> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                error!("Session lock poisoned: {}", e);
                None
            }
        }
    }

    /// Creates a session and makes it the active one.
    pub fn start_session(
        &self,
        roots: Vec<PathBuf>,
        settings: EditorSettings,
        sink: Arc<dyn NotificationSink>,
    ) -> Option<Arc<Session>> {
        let loader = (self.loader_factory)(&settings);
        let session = Arc::new(Session::activate(
            EnginePackage::prettier(),
            roots,
            settings,
            loader,
            sink,
        ));

        match self.session.write() {
            Ok(mut guard) => {
                *guard = Some(session.clone());
                Some(session)
            }
            Err(e) => {
                error!("Session lock poisoned: {}", e);
                None
            }
        }
    }

    /// Returns a snapshot of the document stored for `uri`.
    pub fn document(&self, uri: &Url) -> Option<DocumentData> {
        match self.documents.read() {
            Ok(docs) => docs.get(uri).cloned(),
            Err(e) => {
                error!("Documents lock poisoned: {}", e);
                None
            }
        }
    }

    pub fn uses_dynamic_formatting(&self) -> bool {
        self.dynamic_formatting.load(Ordering::Relaxed)
    }
}

/// Type alias for shared state.
pub type SharedState = Arc<BackendState>;

#[cfg(test)]
mod tests {
    use super::*;

    fn data(text: &str) -> DocumentData {
        DocumentData {
            text: text.to_string(),
            version: 1,
            language_id: "javascript".to_string(),
        }
    }

    #[test]
    fn test_file_uri_becomes_path_document() {
        let path = std::env::temp_dir().join("a.js");
        let uri = Url::from_file_path(&path).unwrap();
        let document = data("x").to_document(&uri);
        assert_eq!(document.path(), Some(path.as_path()));
        assert_eq!(document.language_id.as_deref(), Some("javascript"));
    }

    #[test]
    fn test_untitled_uri_has_no_path() {
        let uri = Url::parse("untitled:Untitled-1").unwrap();
        let document = data("x").to_document(&uri);
        assert!(document.path().is_none());
        assert_eq!(document.display_name(), "Untitled");
    }
}
