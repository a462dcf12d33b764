//! Package manifest (`package.json`) reading.
//!
//! Only the fields fmtbridge needs are typed; everything else is kept in
//! `other` so embedded tool configuration can still be looked up by key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while reading a package manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or has an unexpected shape.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// The `bin` field, which is either a single script or a name-to-script map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BinField {
    Single(String),
    Map(BTreeMap<String, String>),
}

/// A parsed `package.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub bin: Option<BinField>,

    #[serde(default)]
    pub dependencies: Map<String, Value>,

    #[serde(default)]
    pub dev_dependencies: Map<String, Value>,

    #[serde(default)]
    pub peer_dependencies: Map<String, Value>,

    /// All remaining top-level keys.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl PackageManifest {
    /// Reads and parses a manifest file.
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|message| ManifestError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Returns the declared version range for `package`.
    ///
    /// Regular dependencies are checked first, then dev and peer dependencies.
    /// A declaration whose range is not a string still counts as declared
    /// and yields an empty range.
    pub fn declares(&self, package: &str) -> Option<&str> {
        [
            &self.dependencies,
            &self.dev_dependencies,
            &self.peer_dependencies,
        ]
        .into_iter()
        .find_map(|table| table.get(package))
        .map(|range| range.as_str().unwrap_or(""))
    }

    /// Returns a tool configuration embedded under `key` (e.g. `"prettier"`).
    pub fn embedded_config(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }

    /// Returns the script the package exposes as its command.
    ///
    /// With a map-valued `bin`, the entry named after the package wins,
    /// otherwise the first entry is used.
    pub fn bin_script(&self, package: &str) -> Option<&str> {
        match self.bin.as_ref()? {
            BinField::Single(script) => Some(script),
            BinField::Map(entries) => entries
                .get(package)
                .or_else(|| entries.values().next())
                .map(String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declares_checks_all_tables() {
        let manifest = PackageManifest::from_json(
            r#"{
                "name": "app",
                "dependencies": { "react": "^18.0.0" },
                "devDependencies": { "prettier": "2.0.2" }
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.declares("prettier"), Some("2.0.2"));
        assert_eq!(manifest.declares("react"), Some("^18.0.0"));
        assert_eq!(manifest.declares("eslint"), None);

        let peer =
            PackageManifest::from_json(r#"{ "peerDependencies": { "prettier": ">=2" } }"#)
                .unwrap();
        assert_eq!(peer.declares("prettier"), Some(">=2"));
    }

    #[test]
    fn test_embedded_config() {
        let manifest = PackageManifest::from_json(
            r#"{ "name": "app", "prettier": { "semi": false } }"#,
        )
        .unwrap();
        assert_eq!(
            manifest.embedded_config("prettier"),
            Some(&serde_json::json!({ "semi": false }))
        );
        assert!(manifest.embedded_config("eslintConfig").is_none());
    }

    #[test]
    fn test_bin_script_forms() {
        let single =
            PackageManifest::from_json(r#"{ "name": "prettier", "bin": "./bin/prettier.cjs" }"#)
                .unwrap();
        assert_eq!(single.bin_script("prettier"), Some("./bin/prettier.cjs"));

        let map = PackageManifest::from_json(
            r#"{ "name": "prettier", "bin": { "other": "o.js", "prettier": "bin-prettier.js" } }"#,
        )
        .unwrap();
        assert_eq!(map.bin_script("prettier"), Some("bin-prettier.js"));

        let none = PackageManifest::from_json(r#"{ "name": "prettier" }"#).unwrap();
        assert_eq!(none.bin_script("prettier"), None);
    }

    #[test]
    fn test_read_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = PackageManifest::read(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().contains("package.json"));

        let missing = PackageManifest::read(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, ManifestError::Io { .. }));
    }
}
