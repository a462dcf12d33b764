//! Engine resolution.
//!
//! For each file the resolver finds the project that owns it, loads that
//! project's engine installation once and hands out the cached handle from
//! then on. A project that names the engine in its manifest wins over one
//! that merely has a copy in `node_modules`, however close that copy is.
//!
//! Failure handling:
//! - an installation that cannot be loaded falls back to the bundled engine
//! - an installation older than the minimum is an error, never a fallback

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use fmtbridge_engine::{EngineHandle, EngineLoader, EngineOrigin, EngineVersion, PackageManifest};
use parking_lot::RwLock;

use crate::{LoggingService, NotificationService, ResolveError, Workspace, message};

/// Directory that owns an engine installation; the engine cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolutionRoot(PathBuf);

impl ResolutionRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ResolutionRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolutionRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// How a project came to own its engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Named in the manifest's dependency tables.
    Explicit { range: String },
    /// Only present in `node_modules`.
    Implicit,
}

/// Where a file's engine lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    pub root: ResolutionRoot,
    /// Installation directory, e.g. `<root>/node_modules/prettier`.
    pub module_dir: PathBuf,
    pub declaration: Declaration,
}

/// Result of locating a file's engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ModuleLocation),
    /// Declared by the manifest at the root, but not installed.
    NotInstalled(ResolutionRoot),
    NotFound,
}

/// Per-call resolution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Surface failures to the user, not only to the log.
    pub show_notifications: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            show_notifications: true,
        }
    }
}

#[derive(Debug, Clone)]
enum CachedEngine {
    Ready(EngineHandle),
    Outdated {
        module_dir: PathBuf,
        version: EngineVersion,
    },
    Unloadable {
        module_dir: PathBuf,
        reason: String,
    },
}

impl CachedEngine {
    fn module_dir(&self) -> &Path {
        match self {
            Self::Ready(handle) => handle.location(),
            Self::Outdated { module_dir, .. } | Self::Unloadable { module_dir, .. } => module_dir,
        }
    }
}

pub struct ModuleResolver {
    workspace: Arc<Workspace>,
    loader: Arc<dyn EngineLoader>,
    logger: Arc<LoggingService>,
    notifications: Arc<NotificationService>,
    /// Directory to the lookup answer for files in it.
    lookups: RwLock<HashMap<PathBuf, Lookup>>,
    engines: RwLock<HashMap<ResolutionRoot, CachedEngine>>,
    /// Engines loaded from the `enginePath` setting, by resolved path.
    overrides: RwLock<HashMap<PathBuf, CachedEngine>>,
    bundled: RwLock<Option<EngineHandle>>,
}

impl ModuleResolver {
    pub fn new(
        workspace: Arc<Workspace>,
        loader: Arc<dyn EngineLoader>,
        logger: Arc<LoggingService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            workspace,
            loader,
            logger,
            notifications,
            lookups: RwLock::new(HashMap::new()),
            engines: RwLock::new(HashMap::new()),
            overrides: RwLock::new(HashMap::new()),
            bundled: RwLock::new(None),
        }
    }

    /// Sets the fallback engine.
    pub fn set_bundled(&self, handle: Option<EngineHandle>) {
        *self.bundled.write() = handle;
    }

    pub fn bundled_instance(&self) -> Option<EngineHandle> {
        self.bundled.read().clone()
    }

    /// Returns the engine for `file_path`, or `None` when formatting must not
    /// happen. Failures are logged and, if requested, shown to the user.
    pub fn engine_instance(&self, file_path: &Path, options: ResolveOptions) -> Option<EngineHandle> {
        let dir = file_path.parent().unwrap_or(file_path);
        self.engine_for_directory(dir, options)
    }

    /// Returns the engine for files directly inside `dir`.
    pub fn engine_for_directory(&self, dir: &Path, options: ResolveOptions) -> Option<EngineHandle> {
        match self.resolve_in(dir, options) {
            Ok(handle) => Some(handle),
            Err(err) => {
                let identity = match &err {
                    ResolveError::Outdated { .. } => message::OUTDATED_ENGINE_INSTALLED,
                    ResolveError::InvalidEnginePath { .. } => message::INVALID_ENGINE_PATH,
                    ResolveError::BundledUnavailable => message::ENGINE_UNAVAILABLE,
                };
                self.logger.log_error(identity, Some(&err));
                if options.show_notifications {
                    self.notifications.show_error_once(identity);
                }
                None
            }
        }
    }

    /// Resolves the engine for `file_path`.
    pub fn resolve(
        &self,
        file_path: &Path,
        options: ResolveOptions,
    ) -> Result<EngineHandle, ResolveError> {
        self.resolve_in(file_path.parent().unwrap_or(file_path), options)
    }

    fn resolve_in(&self, dir: &Path, options: ResolveOptions) -> Result<EngineHandle, ResolveError> {
        let settings = self.workspace.settings();
        if let Some(engine_path) = settings.engine_path.as_deref() {
            return self.resolve_override(dir, engine_path);
        }

        match self.locate(dir) {
            Lookup::Found(location) => match self.project_engine(&location) {
                CachedEngine::Ready(handle) => Ok(handle),
                CachedEngine::Outdated {
                    module_dir,
                    version,
                } => {
                    self.logger.log_info(&format!(
                        "Attempted to load {} from {}",
                        self.workspace.package().name,
                        module_dir.display()
                    ));
                    Err(ResolveError::Outdated {
                        path: module_dir,
                        found: version,
                        minimum: self.workspace.package().min_version.clone(),
                    })
                }
                CachedEngine::Unloadable { module_dir, reason } => {
                    self.logger.log_warning(&format!(
                        "{} ({}: {})",
                        message::FAILED_TO_LOAD_MODULE,
                        module_dir.display(),
                        reason
                    ));
                    if options.show_notifications {
                        self.notifications
                            .show_warning_once(message::FAILED_TO_LOAD_MODULE);
                    }
                    self.fallback_to_bundled()
                }
            },
            Lookup::NotInstalled(root) => {
                self.logger.log_warning(&format!(
                    "{} is declared in {} but not installed",
                    self.workspace.package().name,
                    root.path().join("package.json").display()
                ));
                self.fallback_to_bundled()
            }
            Lookup::NotFound => self.fallback_to_bundled(),
        }
    }

    fn fallback_to_bundled(&self) -> Result<EngineHandle, ResolveError> {
        let bundled = self
            .bundled_instance()
            .ok_or(ResolveError::BundledUnavailable)?;
        self.logger.log_info(message::USING_BUNDLED_ENGINE);
        Ok(bundled)
    }

    fn resolve_override(&self, dir: &Path, engine_path: &Path) -> Result<EngineHandle, ResolveError> {
        let module_dir = if engine_path.is_absolute() {
            engine_path.to_path_buf()
        } else {
            self.workspace
                .root_for(dir)
                .unwrap_or_else(|| dir.to_path_buf())
                .join(engine_path)
        };

        let cached = self.overrides.read().get(&module_dir).cloned();
        let cached = match cached {
            Some(cached) => cached,
            None => {
                let loaded = self.load(&module_dir);
                self.overrides
                    .write()
                    .entry(module_dir.clone())
                    .or_insert(loaded)
                    .clone()
            }
        };

        match cached {
            CachedEngine::Ready(handle) => Ok(handle),
            CachedEngine::Outdated {
                module_dir,
                version,
            } => Err(ResolveError::Outdated {
                path: module_dir,
                found: version,
                minimum: self.workspace.package().min_version.clone(),
            }),
            CachedEngine::Unloadable { module_dir, reason } => Err(ResolveError::InvalidEnginePath {
                path: module_dir,
                reason,
            }),
        }
    }

    fn project_engine(&self, location: &ModuleLocation) -> CachedEngine {
        if let Some(cached) = self.engines.read().get(&location.root) {
            return cached.clone();
        }

        let loaded = self.load(&location.module_dir);
        self.engines
            .write()
            .entry(location.root.clone())
            .or_insert(loaded)
            .clone()
    }

    /// Loads and validates an installation.
    fn load(&self, module_dir: &Path) -> CachedEngine {
        let handle = match self.loader.load(module_dir, EngineOrigin::ProjectLocal) {
            Ok(handle) => handle,
            Err(e) => {
                return CachedEngine::Unloadable {
                    module_dir: module_dir.to_path_buf(),
                    reason: e.to_string(),
                };
            }
        };

        let package = self.workspace.package();
        match handle.version().satisfies(&package.min_version) {
            Some(true) => {
                self.logger.log_debug(&format!(
                    "Loaded {} {} from {}",
                    package.name,
                    handle.version(),
                    module_dir.display()
                ));
                CachedEngine::Ready(handle)
            }
            Some(false) => CachedEngine::Outdated {
                module_dir: module_dir.to_path_buf(),
                version: handle.version().clone(),
            },
            None => {
                self.logger.log_warning(&format!(
                    "Could not determine the version of {} at {} ({}), using it anyway",
                    package.name,
                    module_dir.display(),
                    handle.version()
                ));
                CachedEngine::Ready(handle)
            }
        }
    }

    /// Locates the engine for files in `dir`.
    pub fn locate(&self, dir: &Path) -> Lookup {
        if let Some(cached) = self.lookups.read().get(dir) {
            return cached.clone();
        }

        let (lookup, settled) = self.search(dir);
        let mut lookups = self.lookups.write();
        for visited in settled {
            lookups.entry(visited).or_insert_with(|| lookup.clone());
        }
        lookup
    }

    /// Walks up from `dir`; returns the answer and every directory it holds for.
    ///
    /// The walk stops at the first ancestor with a cached answer. A cached
    /// declaration is reused as-is, while a cached implicit copy or miss only
    /// holds when no closer copy was seen on the way up.
    fn search(&self, dir: &Path) -> (Lookup, Vec<PathBuf>) {
        let package = &self.workspace.package().name;
        let ancestors: Vec<&Path> = dir
            .ancestors()
            .take_while(|d| !d.as_os_str().is_empty())
            .collect();
        let mut nearest_copy: Option<(usize, PathBuf)> = None;

        for (depth, candidate) in ancestors.iter().enumerate() {
            if let Some(cached) = self.lookups.read().get(*candidate).cloned() {
                let lookup = match (cached, nearest_copy) {
                    (Lookup::Found(ModuleLocation {
                        declaration: Declaration::Implicit,
                        ..
                    })
                    | Lookup::NotFound, Some((near, module_dir))) => {
                        let lookup = Lookup::Found(ModuleLocation {
                            root: ResolutionRoot::new(ancestors[near]),
                            module_dir,
                            declaration: Declaration::Implicit,
                        });
                        return (lookup, settled_dirs(&ancestors[..=near]));
                    }
                    (cached, _) => cached,
                };
                return (lookup, settled_dirs(&ancestors[..depth]));
            }

            if let Some(range) = self.declared_range(candidate, package) {
                let root = ResolutionRoot::new(*candidate);
                let lookup = match find_installed(candidate, package) {
                    Some(module_dir) => Lookup::Found(ModuleLocation {
                        root,
                        module_dir,
                        declaration: Declaration::Explicit { range },
                    }),
                    None => Lookup::NotInstalled(root),
                };
                return (lookup, settled_dirs(&ancestors[..=depth]));
            }

            if nearest_copy.is_none() {
                let module_dir = installed_at(candidate, package);
                if module_dir.is_dir() {
                    nearest_copy = Some((depth, module_dir));
                }
            }
        }

        match nearest_copy {
            Some((near, module_dir)) => {
                let lookup = Lookup::Found(ModuleLocation {
                    root: ResolutionRoot::new(ancestors[near]),
                    module_dir,
                    declaration: Declaration::Implicit,
                });
                (lookup, settled_dirs(&ancestors[..=near]))
            }
            None => (Lookup::NotFound, settled_dirs(&ancestors)),
        }
    }

    /// The range `dir`'s manifest declares for `package`, if any.
    fn declared_range(&self, dir: &Path, package: &str) -> Option<String> {
        let manifest_path = dir.join("package.json");
        if !manifest_path.is_file() {
            return None;
        }
        match PackageManifest::read(&manifest_path) {
            Ok(manifest) => manifest.declares(package).map(|range| range.to_string()),
            Err(e) => {
                self.logger.log_debug(&format!("Skipping {}", e));
                None
            }
        }
    }

    /// Drops cached state affected by a change to `path`.
    ///
    /// A manifest change affects its directory, anything under
    /// `node_modules` affects the directory holding `node_modules`, and any
    /// other path is treated as a directory.
    pub fn invalidate(&self, path: &Path) {
        let affected = affected_dir(path);
        self.logger
            .log_debug(&format!("Invalidating engine lookups under {}", affected.display()));

        self.lookups
            .write()
            .retain(|dir, _| !dir.starts_with(&affected));
        self.engines.write().retain(|root, cached| {
            !root.path().starts_with(&affected) && !cached.module_dir().starts_with(&affected)
        });
        self.overrides
            .write()
            .retain(|module_dir, _| !module_dir.starts_with(&affected));
    }

    /// Drops every cached lookup and engine except the bundled one.
    pub fn clear(&self) {
        self.lookups.write().clear();
        self.engines.write().clear();
        self.overrides.write().clear();
    }
}

fn installed_at(dir: &Path, package: &str) -> PathBuf {
    dir.join("node_modules").join(package)
}

/// Node-style lookup of an installed package starting at `dir`.
fn find_installed(dir: &Path, package: &str) -> Option<PathBuf> {
    dir.ancestors()
        .take_while(|d| !d.as_os_str().is_empty())
        .map(|d| installed_at(d, package))
        .find(|module_dir| module_dir.is_dir())
}

fn settled_dirs(dirs: &[&Path]) -> Vec<PathBuf> {
    dirs.iter().map(|d| d.to_path_buf()).collect()
}

fn affected_dir(path: &Path) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in path.components() {
        if matches!(component, Component::Normal(name) if name == "node_modules") {
            return prefix;
        }
        prefix.push(component);
    }

    if path.file_name().is_some_and(|name| name == "package.json") {
        return path.parent().unwrap_or(path).to_path_buf();
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingSink, fixture};
    use crate::{EditorSettings, LogLevel, NotificationKind};
    use fmtbridge_engine::EnginePackage;
    use fmtbridge_engine::test_utils::{MockLoader, bundled_handle};
    use pretty_assertions::assert_eq;

    struct Harness {
        loader: Arc<MockLoader>,
        logger: Arc<LoggingService>,
        sink: Arc<RecordingSink>,
        workspace: Arc<Workspace>,
        resolver: ModuleResolver,
    }

    fn harness(root: &Path) -> Harness {
        let workspace = Arc::new(Workspace::new(
            EnginePackage::prettier(),
            vec![root.to_path_buf()],
            EditorSettings::default(),
        ));
        let loader = Arc::new(MockLoader::new());
        let logger = Arc::new(LoggingService::new(LogLevel::Debug));
        let sink = Arc::new(RecordingSink::default());
        let notifications = Arc::new(NotificationService::new(sink.clone(), logger.clone()));
        let resolver = ModuleResolver::new(
            workspace.clone(),
            loader.clone(),
            logger.clone(),
            notifications,
        );
        resolver.set_bundled(Some(bundled_handle("3.3.3")));
        Harness {
            loader,
            logger,
            sink,
            workspace,
            resolver,
        }
    }

    #[test]
    fn test_no_dep_uses_bundled() {
        let temp = fixture::no_dep();
        let h = harness(temp.path());

        let handle = h
            .resolver
            .engine_instance(&temp.path().join("no-dep/index.js"), ResolveOptions::default())
            .unwrap();

        assert_eq!(handle.origin(), EngineOrigin::Bundled);
        assert!(handle.ptr_eq(&h.resolver.bundled_instance().unwrap()));
        assert!(h.logger.contains(LogLevel::Info, message::USING_BUNDLED_ENGINE));
        assert!(!h.logger.has_entries_at(LogLevel::Error));
        assert_eq!(h.loader.load_count(), 0);
    }

    #[test]
    fn test_outdated_fails_without_fallback() {
        let temp = fixture::outdated();
        let h = harness(temp.path());

        let handle = h
            .resolver
            .engine_instance(&temp.path().join("outdated/index.js"), ResolveOptions::default());

        assert!(handle.is_none());
        assert!(h.logger.contains(LogLevel::Error, message::OUTDATED_ENGINE_INSTALLED));
        assert!(!h.logger.contains(LogLevel::Info, message::USING_BUNDLED_ENGINE));
        assert_eq!(
            h.sink.messages(),
            vec![(
                NotificationKind::Error,
                message::OUTDATED_ENGINE_INSTALLED.to_string()
            )]
        );
    }

    #[test]
    fn test_outdated_without_notifications() {
        let temp = fixture::outdated();
        let h = harness(temp.path());

        let options = ResolveOptions {
            show_notifications: false,
        };
        assert!(
            h.resolver
                .engine_instance(&temp.path().join("outdated/index.js"), options)
                .is_none()
        );
        assert!(h.sink.messages().is_empty());
    }

    #[test]
    fn test_specific_version() {
        let temp = fixture::specific_version();
        let h = harness(temp.path());

        let handle = h
            .resolver
            .engine_instance(
                &temp.path().join("specific-version/index.js"),
                ResolveOptions::default(),
            )
            .unwrap();

        assert_eq!(handle.version().to_string(), "2.0.2");
        assert_eq!(handle.origin(), EngineOrigin::ProjectLocal);
        assert!(!handle.ptr_eq(&h.resolver.bundled_instance().unwrap()));
    }

    #[test]
    fn test_implicit_module() {
        let temp = fixture::module();
        let h = harness(temp.path());

        let file = temp.path().join("module/index.js");
        let handle = h
            .resolver
            .engine_instance(&file, ResolveOptions::default())
            .unwrap();
        assert_eq!(handle.version().to_string(), "2.0.2");
        assert_eq!(
            h.resolver.locate(file.parent().unwrap()),
            Lookup::Found(ModuleLocation {
                root: ResolutionRoot::new(temp.path().join("module")),
                module_dir: temp.path().join("module/node_modules/prettier"),
                declaration: Declaration::Implicit,
            })
        );
    }

    #[test]
    fn test_explicit_declaration_beats_closer_implicit_copy() {
        let temp = fixture::explicit_dep();
        let h = harness(temp.path());

        let handle = h
            .resolver
            .engine_instance(
                &temp.path().join("explicit-dep/implicit-dep/index.js"),
                ResolveOptions::default(),
            )
            .unwrap();

        assert_eq!(handle.version().to_string(), "2.0.2");
        assert_eq!(
            handle.location(),
            temp.path().join("explicit-dep/node_modules/prettier")
        );
        assert_eq!(
            h.loader
                .load_count_for(&temp.path().join("explicit-dep/implicit-dep/node_modules/prettier")),
            0
        );
    }

    #[test]
    fn test_engine_loaded_once_per_root() {
        let temp = fixture::explicit_dep();
        let h = harness(temp.path());

        let first = h
            .resolver
            .engine_instance(
                &temp.path().join("explicit-dep/index.js"),
                ResolveOptions::default(),
            )
            .unwrap();
        let second = h
            .resolver
            .engine_instance(
                &temp.path().join("explicit-dep/implicit-dep/other.js"),
                ResolveOptions::default(),
            )
            .unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(h.loader.load_count(), 1);
    }

    #[test]
    fn test_lookup_cached_for_visited_dirs() {
        let temp = fixture::explicit_dep();
        let h = harness(temp.path());
        let nested = temp.path().join("explicit-dep/implicit-dep");

        h.resolver
            .engine_instance(&nested.join("index.js"), ResolveOptions::default());
        let cached = h.resolver.lookups.read().get(&nested).cloned();
        assert!(matches!(cached, Some(Lookup::Found(_))));
        assert!(h
            .resolver
            .lookups
            .read()
            .contains_key(&temp.path().join("explicit-dep")));
    }

    #[test]
    fn test_new_subdirectory_reuses_cached_ancestor() {
        let temp = fixture::specific_version();
        let h = harness(temp.path());
        let project = temp.path().join("specific-version");

        h.resolver
            .engine_instance(&project.join("index.js"), ResolveOptions::default());
        std::fs::remove_file(project.join("package.json")).unwrap();
        std::fs::remove_dir_all(project.join("node_modules")).unwrap();

        let handle = h
            .resolver
            .engine_instance(&project.join("src/deep/other.js"), ResolveOptions::default())
            .unwrap();
        assert_eq!(handle.origin(), EngineOrigin::ProjectLocal);
        assert_eq!(handle.version().to_string(), "2.0.2");
        assert_eq!(h.loader.load_count(), 1);
        assert!(h.resolver.lookups.read().contains_key(&project.join("src/deep")));
    }

    #[test]
    fn test_cached_declaration_beats_closer_copy() {
        let temp = fixture::explicit_dep();
        let h = harness(temp.path());
        let project = temp.path().join("explicit-dep");

        h.resolver
            .engine_instance(&project.join("index.js"), ResolveOptions::default());
        let handle = h
            .resolver
            .engine_instance(
                &project.join("implicit-dep/index.js"),
                ResolveOptions::default(),
            )
            .unwrap();
        assert_eq!(handle.version().to_string(), "2.0.2");
        assert_eq!(handle.location(), project.join("node_modules/prettier"));
    }

    #[test]
    fn test_closer_copy_beats_cached_implicit_copy() {
        let temp = fixture::module();
        let h = harness(temp.path());
        let project = temp.path().join("module");
        let nested = project.join("pkg");
        fixture::write_engine(&nested.join("node_modules/prettier"), "2.2.1");

        h.resolver
            .engine_instance(&project.join("index.js"), ResolveOptions::default());
        assert_eq!(
            h.resolver.locate(&nested.join("src")),
            Lookup::Found(ModuleLocation {
                root: ResolutionRoot::new(nested.clone()),
                module_dir: nested.join("node_modules/prettier"),
                declaration: Declaration::Implicit,
            })
        );

        let handle = h
            .resolver
            .engine_instance(&project.join("lib/index.js"), ResolveOptions::default())
            .unwrap();
        assert_eq!(handle.version().to_string(), "2.0.2");
    }

    #[test]
    fn test_corrupt_install_falls_back_to_bundled() {
        let temp = fixture::corrupt();
        let h = harness(temp.path());

        let handle = h
            .resolver
            .engine_instance(&temp.path().join("corrupt/index.js"), ResolveOptions::default())
            .unwrap();

        assert_eq!(handle.origin(), EngineOrigin::Bundled);
        assert!(h.logger.contains(LogLevel::Warning, message::FAILED_TO_LOAD_MODULE));
        assert!(h.logger.contains(LogLevel::Info, message::USING_BUNDLED_ENGINE));

        // The failure is cached with the root.
        h.resolver
            .engine_instance(&temp.path().join("corrupt/other.js"), ResolveOptions::default());
        assert_eq!(h.loader.load_count(), 1);
        assert_eq!(h.sink.messages().len(), 1);
    }

    #[test]
    fn test_declared_but_not_installed() {
        let temp = tempfile::tempdir().unwrap();
        fixture::write_manifest(&temp.path().join("app"), Some("^2.0.0"));
        let h = harness(temp.path());

        let handle = h
            .resolver
            .engine_instance(&temp.path().join("app/index.js"), ResolveOptions::default())
            .unwrap();
        assert_eq!(handle.origin(), EngineOrigin::Bundled);
        assert!(h.logger.contains(LogLevel::Warning, "not installed"));
    }

    #[test]
    fn test_unknown_version_is_accepted() {
        let temp = tempfile::tempdir().unwrap();
        let app = temp.path().join("app");
        fixture::write_manifest(&app, Some("next"));
        fixture::write_engine(&app.join("node_modules/prettier"), "next");
        let h = harness(temp.path());

        let handle = h
            .resolver
            .engine_instance(&app.join("index.js"), ResolveOptions::default())
            .unwrap();
        assert_eq!(handle.origin(), EngineOrigin::ProjectLocal);
        assert!(handle.version().as_semver().is_none());
        assert!(h.logger.contains(LogLevel::Warning, "Could not determine the version"));
    }

    #[test]
    fn test_bundled_unavailable() {
        let temp = fixture::no_dep();
        let h = harness(temp.path());
        h.resolver.set_bundled(None);

        assert!(
            h.resolver
                .engine_instance(&temp.path().join("no-dep/index.js"), ResolveOptions::default())
                .is_none()
        );
        assert!(h.logger.contains(LogLevel::Error, message::ENGINE_UNAVAILABLE));
        assert!(matches!(
            h.resolver
                .resolve(&temp.path().join("no-dep/index.js"), ResolveOptions::default()),
            Err(ResolveError::BundledUnavailable)
        ));
    }

    #[test]
    fn test_engine_path_override() {
        let temp = fixture::specific_version();
        let h = harness(temp.path());
        fixture::write_engine(&temp.path().join("vendor/prettier"), "3.0.0");
        h.workspace.set_settings(EditorSettings {
            engine_path: Some(PathBuf::from("vendor/prettier")),
            ..EditorSettings::default()
        });

        let handle = h
            .resolver
            .engine_instance(
                &temp.path().join("specific-version/index.js"),
                ResolveOptions::default(),
            )
            .unwrap();
        assert_eq!(handle.version().to_string(), "3.0.0");
        assert_eq!(handle.location(), temp.path().join("vendor/prettier"));
    }

    #[test]
    fn test_invalid_engine_path_has_no_fallback() {
        let temp = fixture::no_dep();
        let h = harness(temp.path());
        h.workspace.set_settings(EditorSettings {
            engine_path: Some(temp.path().join("missing")),
            ..EditorSettings::default()
        });

        assert!(
            h.resolver
                .engine_instance(&temp.path().join("no-dep/index.js"), ResolveOptions::default())
                .is_none()
        );
        assert!(h.logger.contains(LogLevel::Error, message::INVALID_ENGINE_PATH));
    }

    #[test]
    fn test_invalidate_after_install() {
        let temp = fixture::no_dep();
        let h = harness(temp.path());
        let project = temp.path().join("no-dep");
        let file = project.join("index.js");

        let before = h
            .resolver
            .engine_instance(&file, ResolveOptions::default())
            .unwrap();
        assert_eq!(before.origin(), EngineOrigin::Bundled);

        fixture::write_manifest(&project, Some("2.0.2"));
        fixture::write_engine(&project.join("node_modules/prettier"), "2.0.2");
        let cached = h
            .resolver
            .engine_instance(&file, ResolveOptions::default())
            .unwrap();
        assert_eq!(cached.origin(), EngineOrigin::Bundled, "lookups are cached");

        h.resolver
            .invalidate(&project.join("node_modules/prettier/package.json"));
        let after = h
            .resolver
            .engine_instance(&file, ResolveOptions::default())
            .unwrap();
        assert_eq!(after.origin(), EngineOrigin::ProjectLocal);
        assert_eq!(after.version().to_string(), "2.0.2");
    }

    #[test]
    fn test_invalidate_manifest_reloads_engine() {
        let temp = fixture::specific_version();
        let h = harness(temp.path());
        let project = temp.path().join("specific-version");
        let file = project.join("index.js");

        h.resolver.engine_instance(&file, ResolveOptions::default());
        h.resolver.engine_instance(&file, ResolveOptions::default());
        assert_eq!(h.loader.load_count(), 1);

        h.resolver.invalidate(&project.join("package.json"));
        h.resolver.engine_instance(&file, ResolveOptions::default());
        assert_eq!(h.loader.load_count(), 2);

        h.resolver.clear();
        h.resolver.engine_instance(&file, ResolveOptions::default());
        assert_eq!(h.loader.load_count(), 3);
    }

    #[test]
    fn test_affected_dir() {
        assert_eq!(
            affected_dir(Path::new("/w/app/node_modules/prettier/package.json")),
            PathBuf::from("/w/app")
        );
        assert_eq!(
            affected_dir(Path::new("/w/app/package.json")),
            PathBuf::from("/w/app")
        );
        assert_eq!(affected_dir(Path::new("/w/app/src")), PathBuf::from("/w/app/src"));
    }
}
