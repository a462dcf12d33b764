//! Formatter registration: which documents the edit provider is offered for.

use std::path::Path;
use std::sync::Arc;

use fmtbridge_engine::{EngineHandle, LanguageInfo};
use serde::Serialize;

use crate::{LoggingService, ModuleResolver, ResolveOptions, Workspace};

/// One entry of a document selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl DocumentFilter {
    fn language(language: &str, scheme: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            scheme: Some(scheme.to_string()),
            pattern: None,
        }
    }

    fn pattern(pattern: String) -> Self {
        Self {
            language: None,
            scheme: Some("file".to_string()),
            pattern: Some(pattern),
        }
    }
}

pub struct Formatter {
    workspace: Arc<Workspace>,
    modules: Arc<ModuleResolver>,
    logger: Arc<LoggingService>,
}

impl Formatter {
    pub fn new(
        workspace: Arc<Workspace>,
        modules: Arc<ModuleResolver>,
        logger: Arc<LoggingService>,
    ) -> Self {
        Self {
            workspace,
            modules,
            logger,
        }
    }

    /// Languages supported by the engines of the open workspace roots.
    ///
    /// Falls back to the bundled engine when no root is open.
    pub fn supported_languages(&self) -> Vec<LanguageInfo> {
        let roots = self.workspace.roots();
        let options = ResolveOptions {
            show_notifications: false,
        };
        let engines: Vec<EngineHandle> = if roots.is_empty() {
            self.modules.bundled_instance().into_iter().collect()
        } else {
            roots
                .iter()
                .filter_map(|root| self.modules.engine_for_directory(root, options))
                .collect()
        };

        let mut languages: Vec<LanguageInfo> = Vec::new();
        for engine in engines {
            match engine.languages() {
                Ok(found) => {
                    for language in found {
                        if !languages.iter().any(|known| known.name == language.name) {
                            languages.push(language);
                        }
                    }
                }
                Err(e) => self.logger.log_warning(&format!(
                    "Could not read supported languages from {}: {}",
                    engine.location().display(),
                    e
                )),
            }
        }
        languages
    }

    /// Computes the selector to register the edit provider with.
    pub fn document_selector(&self) -> Vec<DocumentFilter> {
        let settings = self.workspace.settings();
        let mut filters: Vec<DocumentFilter> = Vec::new();
        let mut push = |filter: DocumentFilter| {
            if !filters.contains(&filter) {
                filters.push(filter);
            }
        };

        for language in self.supported_languages() {
            let ids: Vec<String> = language
                .language_ids()
                .into_iter()
                .filter(|id| !settings.is_language_disabled(id))
                .collect();
            if ids.is_empty() {
                continue;
            }

            for id in &ids {
                push(DocumentFilter::language(id, "file"));
                push(DocumentFilter::language(id, "untitled"));
            }
            for extension in &language.extensions {
                push(DocumentFilter::pattern(format!("**/*{}", extension)));
            }
            for file_name in &language.filenames {
                push(DocumentFilter::pattern(format!("**/{}", file_name)));
            }
        }

        self.logger.log_debug(&format!(
            "Document selector has {} entries",
            filters.len()
        ));
        filters
    }

    /// Returns whether the selector would offer formatting for `path`.
    pub fn supports_path(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.supported_languages().iter().any(|language| {
            language.filenames.iter().any(|f| f == name)
                || language
                    .extensions
                    .iter()
                    .any(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
        })
    }
}
