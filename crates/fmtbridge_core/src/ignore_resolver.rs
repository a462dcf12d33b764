//! Ignore file resolution.
//!
//! Every directory between a file and its workspace root may carry an ignore
//! file. They are applied from the outermost directory inward, so a deeper
//! `!pattern` can re-include what an ancestor excluded.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use parking_lot::RwLock;

use crate::workspace::ancestors_within;
use crate::{LoggingService, Workspace, message};

pub struct IgnoreResolver {
    workspace: Arc<Workspace>,
    logger: Arc<LoggingService>,
    /// Ignore file path to compiled rules; `None` when absent or unusable.
    ignores: RwLock<HashMap<PathBuf, Option<Arc<Gitignore>>>>,
}

impl IgnoreResolver {
    pub fn new(workspace: Arc<Workspace>, logger: Arc<LoggingService>) -> Self {
        Self {
            workspace,
            logger,
            ignores: RwLock::new(HashMap::new()),
        }
    }

    /// Returns whether `file_path` is excluded from formatting.
    pub fn should_ignore(&self, file_path: &Path) -> bool {
        let settings = self.workspace.settings();
        if !settings.with_node_modules && in_node_modules(file_path) {
            return true;
        }

        let Some(dir) = file_path.parent() else {
            return false;
        };
        let boundary = self.workspace.root_for(file_path);
        let file_name = self.workspace.ignore_file_name();

        let mut ignored = false;
        for dir in ancestors_within(dir, boundary.as_deref()).iter().rev() {
            let Some(rules) = self.rules_for(&dir.join(&file_name)) else {
                continue;
            };
            match rules.matched_path_or_any_parents(file_path, false) {
                Match::None => {}
                Match::Ignore(_) => ignored = true,
                Match::Whitelist(_) => ignored = false,
            }
        }
        ignored
    }

    /// Drops cached rules for the changed path.
    pub fn invalidate(&self, path: &Path) {
        self.ignores
            .write()
            .retain(|ignore_file, _| ignore_file != path && !ignore_file.starts_with(path));
    }

    pub fn clear(&self) {
        self.ignores.write().clear();
    }

    fn rules_for(&self, ignore_file: &Path) -> Option<Arc<Gitignore>> {
        if let Some(cached) = self.ignores.read().get(ignore_file) {
            return cached.clone();
        }

        let rules = self.compile(ignore_file).map(Arc::new);
        self.ignores
            .write()
            .entry(ignore_file.to_path_buf())
            .or_insert(rules)
            .clone()
    }

    fn compile(&self, ignore_file: &Path) -> Option<Gitignore> {
        if !ignore_file.is_file() {
            return None;
        }
        let root = ignore_file.parent()?;

        let result = std::fs::read_to_string(ignore_file)
            .map_err(ignore::Error::from)
            .and_then(|content| {
                let mut builder = GitignoreBuilder::new(root);
                for line in content.lines() {
                    builder.add_line(Some(ignore_file.to_path_buf()), line)?;
                }
                builder.build()
            });

        match result {
            Ok(rules) => {
                self.logger.log_debug(&format!(
                    "Loaded {} ignore rules from {}",
                    rules.len(),
                    ignore_file.display()
                ));
                Some(rules)
            }
            Err(e) => {
                self.logger.log_warning(&format!(
                    "{} {}: {}",
                    message::FAILED_TO_PARSE_IGNORE_FILE,
                    ignore_file.display(),
                    e
                ));
                None
            }
        }
    }
}

fn in_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditorSettings, LogLevel};
    use fmtbridge_engine::EnginePackage;
    use std::fs;

    fn resolver(root: &Path) -> (Arc<LoggingService>, IgnoreResolver) {
        let workspace = Arc::new(Workspace::new(
            EnginePackage::prettier(),
            vec![root.to_path_buf()],
            EditorSettings::default(),
        ));
        let logger = Arc::new(LoggingService::new(LogLevel::Debug));
        (logger.clone(), IgnoreResolver::new(workspace, logger))
    }

    #[test]
    fn test_ancestor_pattern_applies_to_nested_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join(".prettierignore"), "# generated\ndist/\n*.min.js\n").unwrap();
        fs::create_dir_all(root.join("packages/app/src")).unwrap();

        let (_, resolver) = resolver(root);
        assert!(resolver.should_ignore(&root.join("packages/app/src/vendor.min.js")));
        assert!(resolver.should_ignore(&root.join("packages/app/dist/index.js")));
        assert!(!resolver.should_ignore(&root.join("packages/app/src/index.js")));
    }

    #[test]
    fn test_deeper_whitelist_reincludes() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join(".prettierignore"), "*.md\n").unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/.prettierignore"), "!guide.md\n").unwrap();

        let (_, resolver) = resolver(root);
        assert!(resolver.should_ignore(&root.join("README.md")));
        assert!(resolver.should_ignore(&root.join("docs/other.md")));
        assert!(!resolver.should_ignore(&root.join("docs/guide.md")));
    }

    #[test]
    fn test_node_modules_ignored_by_default() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        let (_, resolver) = resolver(root);
        assert!(resolver.should_ignore(&root.join("node_modules/pkg/index.js")));

        resolver.workspace.set_settings(EditorSettings {
            with_node_modules: true,
            ..EditorSettings::default()
        });
        assert!(!resolver.should_ignore(&root.join("node_modules/pkg/index.js")));
    }

    #[test]
    fn test_malformed_ignore_file_yields_no_rules() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join(".prettierignore"), "src/[z-a].js\n").unwrap();

        let (logger, resolver) = resolver(root);
        assert!(!resolver.should_ignore(&root.join("src/a.js")));
        assert!(logger.contains(LogLevel::Warning, message::FAILED_TO_PARSE_IGNORE_FILE));
    }

    #[test]
    fn test_invalidate_recompiles() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        let ignore_file = root.join(".prettierignore");
        fs::write(&ignore_file, "a.js\n").unwrap();

        let (_, resolver) = resolver(root);
        assert!(resolver.should_ignore(&root.join("a.js")));

        fs::write(&ignore_file, "b.js\n").unwrap();
        assert!(resolver.should_ignore(&root.join("a.js")), "cached until invalidated");

        resolver.invalidate(&ignore_file);
        assert!(!resolver.should_ignore(&root.join("a.js")));
        assert!(resolver.should_ignore(&root.join("b.js")));
    }

    #[test]
    fn test_custom_ignore_file_name() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join(".formatignore"), "*.css\n").unwrap();

        let (_, resolver) = resolver(root);
        assert!(!resolver.should_ignore(&root.join("site.css")));

        resolver.workspace.set_settings(EditorSettings {
            ignore_path: Some(".formatignore".to_string()),
            ..EditorSettings::default()
        });
        assert!(resolver.should_ignore(&root.join("site.css")));
    }
}
