//! CLI utility functions

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use miette::{IntoDiagnostic, Result};
use tokio::runtime::Runtime;
use tracing::debug;

use fmtbridge_core::{EditorSettings, Session, TracingSink};
use fmtbridge_engine::{EnginePackage, NodeEngineLoader};

use crate::cli::Cli;

pub fn create_tokio_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()
}

/// User-wide settings file, used when `--settings` is not given.
fn global_settings_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("fmtbridge").join("settings.json"))
        .filter(|path| path.is_file())
}

/// Loads settings from the settings file and applies command line overrides.
pub fn load_settings(cli: &Cli) -> Result<EditorSettings> {
    let path = cli.settings.clone().or_else(global_settings_path);
    let mut settings = match path {
        Some(path) => {
            debug!("Reading settings from {}", path.display());
            EditorSettings::from_file(&path)
                .map_err(|e| miette::miette!("Failed to load settings: {}", e))?
        }
        None => EditorSettings::default(),
    };

    if let Some(engine_path) = &cli.engine_path {
        settings.engine_path = Some(engine_path.clone());
    }
    if let Some(bundled) = &cli.bundled_engine_path {
        settings.bundled_engine_path = Some(bundled.clone());
    }
    Ok(settings)
}

/// Builds a session rooted at the current directory.
pub fn create_session(cli: &Cli) -> Result<Session> {
    let settings = load_settings(cli)?;
    let root = std::env::current_dir().into_diagnostic()?;
    let loader = NodeEngineLoader::new(EnginePackage::prettier(), settings.node_command());

    Ok(Session::activate(
        EnginePackage::prettier(),
        vec![root],
        settings,
        Arc::new(loader),
        Arc::new(TracingSink),
    ))
}

/// Makes `path` absolute against the current directory.
///
/// `.` and `..` components are folded away so that walking the ancestors of
/// the result only visits directories that really contain the file.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path).into_diagnostic()?;
    Ok(normalize(&path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_dot_components() {
        assert_eq!(
            normalize(Path::new("/work/app/../other/./a.js")),
            PathBuf::from("/work/other/a.js")
        );
        assert_eq!(normalize(Path::new("/../a.js")), PathBuf::from("/a.js"));
    }

    #[test]
    fn test_absolute_has_no_parent_components() {
        let path = absolute(Path::new("../a.js")).unwrap();
        assert!(path.is_absolute());
        assert!(!path.components().any(|c| c == Component::ParentDir));
    }
}
