//! Service wiring for one editor session.
//!
//! `Session` constructs every service once and hands out shared references,
//! and turns workspace events into the matching cache invalidations.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use fmtbridge_engine::{EngineLoader, EngineOrigin, EnginePackage};
use serde_json::{Value, json};

use crate::{
    ConfigResolver, EditProvider, EditorSettings, Formatter, IgnoreResolver, LoggingService,
    ModuleResolver, NotificationService, NotificationSink, Workspace,
};

/// Environment variable naming the bundled engine directory.
pub const BUNDLED_ENGINE_ENV: &str = "FMTBRIDGE_BUNDLED_ENGINE";

/// What a changed path means to the resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedFile {
    Config,
    Ignore,
    /// A manifest or anything inside `node_modules`.
    Package,
    Other,
}

pub struct Session {
    pub workspace: Arc<Workspace>,
    pub logger: Arc<LoggingService>,
    pub notifications: Arc<NotificationService>,
    pub modules: Arc<ModuleResolver>,
    pub configs: Arc<ConfigResolver>,
    pub ignores: Arc<IgnoreResolver>,
    pub edit_provider: EditProvider,
    pub formatter: Formatter,
    loader: Arc<dyn EngineLoader>,
}

impl Session {
    /// Builds the services without loading the bundled engine.
    pub fn new(
        package: EnginePackage,
        roots: Vec<PathBuf>,
        settings: EditorSettings,
        loader: Arc<dyn EngineLoader>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let logger = Arc::new(LoggingService::new(settings.log_level));
        let workspace = Arc::new(Workspace::new(package, roots, settings));
        let notifications = Arc::new(NotificationService::new(sink, logger.clone()));
        let modules = Arc::new(ModuleResolver::new(
            workspace.clone(),
            loader.clone(),
            logger.clone(),
            notifications.clone(),
        ));
        let configs = Arc::new(ConfigResolver::new(workspace.clone(), logger.clone()));
        let ignores = Arc::new(IgnoreResolver::new(workspace.clone(), logger.clone()));
        let edit_provider = EditProvider::new(
            workspace.clone(),
            modules.clone(),
            configs.clone(),
            ignores.clone(),
            logger.clone(),
            notifications.clone(),
        );
        let formatter = Formatter::new(workspace.clone(), modules.clone(), logger.clone());

        Self {
            workspace,
            logger,
            notifications,
            modules,
            configs,
            ignores,
            edit_provider,
            formatter,
            loader,
        }
    }

    /// Builds the services and loads the bundled engine.
    pub fn activate(
        package: EnginePackage,
        roots: Vec<PathBuf>,
        settings: EditorSettings,
        loader: Arc<dyn EngineLoader>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let session = Self::new(package, roots, settings, loader, sink);
        session.load_bundled();
        session.logger.log_debug(&format!(
            "Session started with {} workspace root(s)",
            session.workspace.roots().len()
        ));
        session
    }

    /// Loads the bundled engine from the settings or the environment.
    ///
    /// Returns whether a bundled engine is available afterwards.
    pub fn load_bundled(&self) -> bool {
        let settings = self.workspace.settings();
        let dir = settings
            .bundled_engine_path
            .clone()
            .or_else(|| std::env::var_os(BUNDLED_ENGINE_ENV).map(PathBuf::from));

        let Some(dir) = dir else {
            self.logger
                .log_debug("No bundled engine configured");
            self.modules.set_bundled(None);
            return false;
        };

        match self.loader.load(&dir, EngineOrigin::Bundled) {
            Ok(handle) => {
                self.logger.log_info(&format!(
                    "Bundled {} {} at {}",
                    self.workspace.package().name,
                    handle.version(),
                    dir.display()
                ));
                self.modules.set_bundled(Some(handle));
                true
            }
            Err(e) => {
                self.logger
                    .log_error("Failed to load the bundled engine", Some(&e));
                self.modules.set_bundled(None);
                false
            }
        }
    }

    /// Applies new editor settings and drops everything derived from the old ones.
    pub fn update_settings(&self, settings: EditorSettings) {
        let previous = self.workspace.settings();
        let reload_bundled = previous.bundled_engine_path != settings.bundled_engine_path
            || previous.node_path != settings.node_path;

        self.logger.set_level(settings.log_level);
        self.workspace.set_settings(settings);
        self.clear_caches();
        if reload_bundled {
            self.load_bundled();
        }
    }

    /// Replaces the workspace roots.
    pub fn set_roots(&self, roots: Vec<PathBuf>) {
        self.workspace.set_roots(roots);
        self.clear_caches();
    }

    pub fn clear_caches(&self) {
        self.modules.clear();
        self.configs.clear();
        self.ignores.clear();
    }

    /// Classifies a changed path.
    pub fn classify(&self, path: &Path) -> WatchedFile {
        let in_node_modules = path
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"));
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        if in_node_modules || name == "package.json" {
            WatchedFile::Package
        } else if self.workspace.package().is_config_file(name) {
            WatchedFile::Config
        } else if name == self.workspace.ignore_file_name() {
            WatchedFile::Ignore
        } else {
            WatchedFile::Other
        }
    }

    /// Delivers a file change to the resolvers it concerns.
    pub fn file_changed(&self, path: &Path) -> WatchedFile {
        let kind = self.classify(path);
        self.logger
            .log_debug(&format!("{} changed ({:?})", path.display(), kind));
        match kind {
            WatchedFile::Config => self.configs.invalidate(path),
            WatchedFile::Ignore => self.ignores.invalidate(path),
            WatchedFile::Package => {
                self.modules.invalidate(path);
                self.configs.invalidate(path);
            }
            WatchedFile::Other => {}
        }
        kind
    }

    /// Startup telemetry payload naming the enabled companion integrations.
    pub fn integration_usage(&self) -> Value {
        let settings = self.workspace.settings();
        json!({
            "name": "integration_usage",
            "eslint": u8::from(settings.eslint_integration),
            "stylelint": u8::from(settings.stylelint_integration),
            "tslint": u8::from(settings.tslint_integration),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingSink, fixture};
    use crate::{Document, FormatOutcome, LogLevel};
    use fmtbridge_engine::test_utils::MockLoader;
    use pretty_assertions::assert_eq;

    fn session(root: &Path, settings: EditorSettings) -> (Arc<MockLoader>, Session) {
        let loader = Arc::new(MockLoader::new());
        let session = Session::activate(
            EnginePackage::prettier(),
            vec![root.to_path_buf()],
            settings,
            loader.clone(),
            Arc::new(RecordingSink::default()),
        );
        (loader, session)
    }

    #[test]
    fn test_activate_loads_bundled_from_settings() {
        let temp = fixture::no_dep();
        let bundled = temp.path().join("bundled/prettier");
        fixture::write_engine(&bundled, "3.3.3");

        let settings = EditorSettings {
            bundled_engine_path: Some(bundled.clone()),
            ..EditorSettings::default()
        };
        let (loader, session) = session(temp.path(), settings);

        let handle = session.modules.bundled_instance().unwrap();
        assert_eq!(handle.origin(), EngineOrigin::Bundled);
        assert_eq!(handle.version().to_string(), "3.3.3");
        assert_eq!(loader.load_count_for(&bundled), 1);

        let document = Document::new(temp.path().join("no-dep/a.js"), "a  \n");
        assert!(matches!(
            session.edit_provider.format_document(&document, None),
            FormatOutcome::Edits(ref edits) if edits.len() == 1
        ));
    }

    #[test]
    fn test_missing_bundled_engine_is_logged() {
        let temp = fixture::no_dep();
        let settings = EditorSettings {
            bundled_engine_path: Some(temp.path().join("nowhere")),
            ..EditorSettings::default()
        };
        let (_, session) = session(temp.path(), settings);

        assert!(session.modules.bundled_instance().is_none());
        assert!(session
            .logger
            .contains(LogLevel::Error, "Failed to load the bundled engine"));
    }

    #[test]
    fn test_classify() {
        let temp = fixture::no_dep();
        let (_, session) = session(temp.path(), EditorSettings::default());
        let root = temp.path();

        assert_eq!(session.classify(&root.join(".prettierrc.yaml")), WatchedFile::Config);
        assert_eq!(session.classify(&root.join(".prettierignore")), WatchedFile::Ignore);
        assert_eq!(session.classify(&root.join("package.json")), WatchedFile::Package);
        assert_eq!(
            session.classify(&root.join("node_modules/prettier/index.js")),
            WatchedFile::Package
        );
        assert_eq!(session.classify(&root.join("src/a.js")), WatchedFile::Other);
    }

    #[test]
    fn test_package_change_reaches_module_resolver() {
        let temp = fixture::specific_version();
        let (loader, session) = session(temp.path(), EditorSettings::default());
        let project = temp.path().join("specific-version");
        let file = project.join("a.js");

        session.modules.engine_instance(&file, Default::default());
        session.file_changed(&project.join("package.json"));
        session.modules.engine_instance(&file, Default::default());
        assert_eq!(loader.load_count(), 2);
    }

    #[test]
    fn test_integration_usage() {
        let temp = fixture::no_dep();
        let settings = EditorSettings {
            eslint_integration: true,
            ..EditorSettings::default()
        };
        let (_, session) = session(temp.path(), settings);
        assert_eq!(
            session.integration_usage(),
            json!({ "name": "integration_usage", "eslint": 1, "stylelint": 0, "tslint": 0 })
        );
    }
}
