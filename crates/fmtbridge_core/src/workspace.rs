//! Workspace roots and the current editor settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fmtbridge_engine::EnginePackage;
use parking_lot::RwLock;

use crate::EditorSettings;

/// State shared by every resolver: which folders are open and how the
/// editor is configured.
#[derive(Debug)]
pub struct Workspace {
    package: EnginePackage,
    roots: RwLock<Vec<PathBuf>>,
    settings: RwLock<Arc<EditorSettings>>,
}

impl Workspace {
    pub fn new(package: EnginePackage, roots: Vec<PathBuf>, settings: EditorSettings) -> Self {
        Self {
            package,
            roots: RwLock::new(roots),
            settings: RwLock::new(Arc::new(settings)),
        }
    }

    pub fn package(&self) -> &EnginePackage {
        &self.package
    }

    pub fn roots(&self) -> Vec<PathBuf> {
        self.roots.read().clone()
    }

    pub fn set_roots(&self, roots: Vec<PathBuf>) {
        *self.roots.write() = roots;
    }

    pub fn add_root(&self, root: PathBuf) {
        let mut roots = self.roots.write();
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    pub fn remove_root(&self, root: &Path) {
        self.roots.write().retain(|r| r != root);
    }

    /// Returns the innermost workspace root containing `path`.
    pub fn root_for(&self, path: &Path) -> Option<PathBuf> {
        self.roots
            .read()
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .cloned()
    }

    pub fn settings(&self) -> Arc<EditorSettings> {
        Arc::clone(&self.settings.read())
    }

    pub fn set_settings(&self, settings: EditorSettings) {
        *self.settings.write() = Arc::new(settings);
    }

    /// Returns the ignore file name in effect.
    ///
    /// Only the file name of the `ignorePath` setting is used; the file is
    /// looked up in every directory.
    pub fn ignore_file_name(&self) -> String {
        self.settings()
            .ignore_path
            .as_deref()
            .map(Path::new)
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_else(|| self.package.ignore_file.clone())
    }
}

/// Returns `start` and its ancestors, innermost first.
///
/// When `boundary` contains `start` the walk stops after `boundary`;
/// otherwise it continues to the filesystem root.
pub fn ancestors_within(start: &Path, boundary: Option<&Path>) -> Vec<PathBuf> {
    let boundary = boundary.filter(|b| start.starts_with(b));
    let mut dirs = Vec::new();
    for dir in start.ancestors() {
        if dir.as_os_str().is_empty() {
            break;
        }
        dirs.push(dir.to_path_buf());
        if Some(dir) == boundary {
            break;
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_root_for_prefers_innermost() {
        let workspace = Workspace::new(
            EnginePackage::prettier(),
            vec![PathBuf::from("/work"), PathBuf::from("/work/packages/app")],
            EditorSettings::default(),
        );
        assert_eq!(
            workspace.root_for(Path::new("/work/packages/app/src/a.js")),
            Some(PathBuf::from("/work/packages/app"))
        );
        assert_eq!(
            workspace.root_for(Path::new("/work/README.md")),
            Some(PathBuf::from("/work"))
        );
        assert_eq!(workspace.root_for(Path::new("/elsewhere/a.js")), None);
    }

    #[test]
    fn test_ancestors_within_boundary() {
        let dirs = ancestors_within(Path::new("/work/a/b"), Some(Path::new("/work")));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/work/a/b"),
                PathBuf::from("/work/a"),
                PathBuf::from("/work"),
            ]
        );

        let unbounded = ancestors_within(Path::new("/x/y"), Some(Path::new("/work")));
        assert_eq!(
            unbounded,
            vec![PathBuf::from("/x/y"), PathBuf::from("/x"), PathBuf::from("/")]
        );
    }

    #[test]
    fn test_ignore_file_name() {
        let workspace = Workspace::new(EnginePackage::prettier(), vec![], EditorSettings::default());
        assert_eq!(workspace.ignore_file_name(), ".prettierignore");

        workspace.set_settings(EditorSettings {
            ignore_path: Some("config/.formatignore".to_string()),
            ..EditorSettings::default()
        });
        assert_eq!(workspace.ignore_file_name(), ".formatignore");
    }
}
