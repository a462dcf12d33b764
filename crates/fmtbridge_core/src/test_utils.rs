//! Test helpers: a recording notification sink and on-disk project fixtures.

use parking_lot::Mutex;

use crate::{NotificationKind, NotificationSink};

/// Sink that remembers every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(NotificationKind, String)> {
        self.messages.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn show(&self, kind: NotificationKind, message: &str) {
        self.messages.lock().push((kind, message.to_string()));
    }
}

/// Project trees used by resolver tests.
///
/// Each builder returns a fresh temporary directory holding one project
/// directory named after the scenario.
pub mod fixture {
    use std::fs;
    use std::path::Path;

    use serde_json::json;
    use tempfile::TempDir;

    /// Writes `<dir>/package.json`, declaring prettier when `range` is given.
    pub fn write_manifest(dir: &Path, range: Option<&str>) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let mut manifest = json!({ "name": name, "version": "1.0.0" });
        if let Some(range) = range {
            manifest["devDependencies"] = json!({ "prettier": range });
        }
        write(dir, "package.json", &manifest.to_string());
    }

    /// Writes an engine installation reporting `version`.
    pub fn write_engine(module_dir: &Path, version: &str) {
        let manifest = json!({
            "name": "prettier",
            "version": version,
            "bin": { "prettier": "./bin/prettier.cjs" }
        });
        write(module_dir, "package.json", &manifest.to_string());
        write(&module_dir.join("bin"), "prettier.cjs", "");
    }

    pub fn write(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    /// `no-dep`: a project without any engine.
    pub fn no_dep() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        write_manifest(&temp.path().join("no-dep"), None);
        temp
    }

    /// `outdated`: a project pinned to an unsupported 1.x release.
    pub fn outdated() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("outdated");
        write_manifest(&project, Some("1.10.2"));
        write_engine(&project.join("node_modules/prettier"), "1.10.2");
        temp
    }

    /// `specific-version`: a project pinned to 2.0.2.
    pub fn specific_version() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("specific-version");
        write_manifest(&project, Some("2.0.2"));
        write_engine(&project.join("node_modules/prettier"), "2.0.2");
        temp
    }

    /// `module`: 2.0.2 installed without being declared.
    pub fn module() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("module");
        write_manifest(&project, None);
        write_engine(&project.join("node_modules/prettier"), "2.0.2");
        temp
    }

    /// `explicit-dep`: declares 2.0.2, with a nested `implicit-dep` project
    /// carrying its own undeclared 2.2.1 copy.
    pub fn explicit_dep() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("explicit-dep");
        write_manifest(&project, Some("2.0.2"));
        write_engine(&project.join("node_modules/prettier"), "2.0.2");

        let nested = project.join("implicit-dep");
        write_manifest(&nested, None);
        write_engine(&nested.join("node_modules/prettier"), "2.2.1");
        temp
    }

    /// `corrupt`: declares the engine but its installed manifest is broken.
    pub fn corrupt() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        let project = temp.path().join("corrupt");
        write_manifest(&project, Some("2.0.2"));
        write(&project.join("node_modules/prettier"), "package.json", "{ \"name\": ");
        temp
    }
}
