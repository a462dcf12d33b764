//! Identity of the engine package.

use semver::Version;

/// Everything that names the engine: its package, the oldest supported
/// release and the files it reads configuration and ignore rules from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePackage {
    /// Package name as it appears in dependency tables and `node_modules`.
    pub name: String,
    /// Oldest version fmtbridge will use from a project.
    pub min_version: Version,
    /// Config file candidates, in lookup order, checked in each directory.
    pub config_files: Vec<String>,
    /// Default ignore file name.
    pub ignore_file: String,
}

impl EnginePackage {
    /// The `prettier` package.
    pub fn prettier() -> Self {
        Self {
            name: "prettier".to_string(),
            min_version: Version::new(1, 13, 0),
            config_files: [
                "package.json",
                ".prettierrc",
                ".prettierrc.json",
                ".prettierrc.yaml",
                ".prettierrc.yml",
                ".prettierrc.json5",
                ".prettierrc.toml",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ignore_file: ".prettierignore".to_string(),
        }
    }

    /// Key used for configuration embedded in `package.json`.
    pub fn manifest_key(&self) -> &str {
        &self.name
    }

    /// Returns whether `file_name` is one of the engine's config files.
    pub fn is_config_file(&self, file_name: &str) -> bool {
        self.config_files.iter().any(|f| f == file_name)
    }
}

impl Default for EnginePackage {
    fn default() -> Self {
        Self::prettier()
    }
}
