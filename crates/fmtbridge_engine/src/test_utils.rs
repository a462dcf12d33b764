//! Test utilities for engine consumers.
//!
//! `MockLoader` reads a fixture installation's `package.json` for its version
//! and hands back an in-process `MockEngine`, counting every load so caching
//! behaviour can be asserted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{
    Engine, EngineError, EngineHandle, EngineLoader, EngineOrigin, EngineVersion, FormatOptions,
    FormatRequest, LanguageInfo, LoadError, PackageManifest,
};

type FormatFn = dyn Fn(&str, &FormatRequest<'_>) -> Result<String, EngineError> + Send + Sync;

/// A recorded format call.
#[derive(Debug, Clone)]
pub struct FormatCall {
    pub text: String,
    pub file_path: Option<PathBuf>,
    pub parser: Option<String>,
    pub options: FormatOptions,
}

/// In-process engine for tests.
///
/// By default it strips trailing whitespace from each line and makes sure
/// the text ends with a newline.
pub struct MockEngine {
    formatter: Box<FormatFn>,
    languages: Vec<LanguageInfo>,
    calls: Mutex<Vec<FormatCall>>,
}

impl MockEngine {
    /// Creates an engine with the default formatter and languages.
    pub fn new() -> Self {
        Self {
            formatter: Box::new(|text, _| Ok(trim_trailing_whitespace(text))),
            languages: default_languages(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the formatting function.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&str, &FormatRequest<'_>) -> Result<String, EngineError> + Send + Sync + 'static,
    {
        self.formatter = Box::new(formatter);
        self
    }

    /// Replaces the supported languages.
    pub fn with_languages(mut self, languages: Vec<LanguageInfo>) -> Self {
        self.languages = languages;
        self
    }

    /// Returns all recorded format calls.
    pub fn calls(&self) -> Vec<FormatCall> {
        self.calls.lock().clone()
    }

    /// Returns the most recent format call.
    pub fn last_call(&self) -> Option<FormatCall> {
        self.calls.lock().last().cloned()
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MockEngine {
    fn format(&self, text: &str, request: &FormatRequest<'_>) -> Result<String, EngineError> {
        self.calls.lock().push(FormatCall {
            text: text.to_string(),
            file_path: request.file_path.map(Path::to_path_buf),
            parser: request.parser.map(String::from),
            options: request.options.clone(),
        });
        (self.formatter)(text, request)
    }

    fn languages(&self) -> Result<Vec<LanguageInfo>, EngineError> {
        Ok(self.languages.clone())
    }
}

/// Languages reported by `MockEngine` unless replaced.
pub fn default_languages() -> Vec<LanguageInfo> {
    vec![
        LanguageInfo::new("JavaScript", "babel")
            .with_extensions(&[".js", ".cjs", ".mjs", ".jsx"])
            .with_language_ids(&["javascript", "javascriptreact"]),
        LanguageInfo::new("TypeScript", "typescript")
            .with_extensions(&[".ts", ".cts", ".mts"])
            .with_language_ids(&["typescript"]),
        LanguageInfo::new("JSON", "json")
            .with_extensions(&[".json"])
            .with_filenames(&[".prettierrc"])
            .with_language_ids(&["json"]),
        LanguageInfo::new("Markdown", "markdown")
            .with_extensions(&[".md", ".markdown"])
            .with_language_ids(&["markdown"]),
        LanguageInfo::new("CSS", "css")
            .with_extensions(&[".css"])
            .with_language_ids(&["css"]),
    ]
}

fn trim_trailing_whitespace(text: &str) -> String {
    let mut out = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

/// Creates a bundled handle backed by a fresh `MockEngine`.
pub fn bundled_handle(version: &str) -> EngineHandle {
    EngineHandle::new(
        Arc::new(MockEngine::new()),
        EngineVersion::parse(version),
        EngineOrigin::Bundled,
        "/bundled/prettier",
    )
}

/// Loader that serves `MockEngine`s for fixture installations.
///
/// An installation is any directory with a `package.json`; its `version`
/// field becomes the engine version.
#[derive(Default)]
pub struct MockLoader {
    loads: AtomicUsize,
    loads_by_path: Mutex<HashMap<PathBuf, usize>>,
    engines: Mutex<Vec<Arc<MockEngine>>>,
}

impl MockLoader {
    /// Creates a new loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of load calls.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Returns the number of load calls for one directory.
    pub fn load_count_for(&self, module_dir: &Path) -> usize {
        self.loads_by_path
            .lock()
            .get(module_dir)
            .copied()
            .unwrap_or(0)
    }

    /// Returns every engine this loader created, in load order.
    pub fn engines(&self) -> Vec<Arc<MockEngine>> {
        self.engines.lock().clone()
    }
}

impl EngineLoader for MockLoader {
    fn load(&self, module_dir: &Path, origin: EngineOrigin) -> Result<EngineHandle, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        *self
            .loads_by_path
            .lock()
            .entry(module_dir.to_path_buf())
            .or_insert(0) += 1;

        let manifest_path = module_dir.join("package.json");
        if !manifest_path.is_file() {
            return Err(LoadError::NotFound(module_dir.to_path_buf()));
        }
        let content = std::fs::read_to_string(&manifest_path)?;
        let manifest =
            PackageManifest::from_json(&content).map_err(|message| LoadError::InvalidManifest {
                path: manifest_path.clone(),
                message,
            })?;

        let engine = Arc::new(MockEngine::new());
        self.engines.lock().push(Arc::clone(&engine));
        Ok(EngineHandle::new(
            engine,
            EngineVersion::parse(manifest.version.as_deref().unwrap_or("")),
            origin,
            module_dir,
        ))
    }
}
