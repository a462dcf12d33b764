//! Editor-level settings.

use std::fs;
use std::path::{Path, PathBuf};

use jsonc_parser::ParseOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ConfigError, FormatConfig, LogLevel};

/// Key settings may be nested under when the host sends its whole settings tree.
pub const SETTINGS_SECTION: &str = "fmtbridge";

/// Settings supplied by the editor (or the CLI settings file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    /// Master switch for formatting.
    pub enable: bool,

    /// Only format files governed by a project config file.
    pub require_config: bool,

    /// Ignore file name looked up in each directory.
    pub ignore_path: Option<String>,

    /// Explicit engine installation to use instead of resolving one.
    pub engine_path: Option<PathBuf>,

    /// Installation directory of the bundled engine.
    pub bundled_engine_path: Option<PathBuf>,

    /// `node` executable used to run engines.
    pub node_path: Option<PathBuf>,

    /// Format files inside `node_modules`.
    pub with_node_modules: bool,

    /// Editor language identifiers never formatted.
    pub disable_languages: Vec<String>,

    pub eslint_integration: bool,
    pub stylelint_integration: bool,
    pub tslint_integration: bool,

    pub log_level: LogLevel,

    /// Editor-level formatting options.
    pub options: FormatConfig,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            enable: true,
            require_config: false,
            ignore_path: None,
            engine_path: None,
            bundled_engine_path: None,
            node_path: None,
            with_node_modules: false,
            disable_languages: Vec::new(),
            eslint_integration: false,
            stylelint_integration: false,
            tslint_integration: false,
            log_level: LogLevel::Info,
            options: FormatConfig::default(),
        }
    }
}

impl EditorSettings {
    /// Builds settings from a JSON value sent by the host.
    ///
    /// The value may be the settings object itself or a tree holding it
    /// under the `fmtbridge` key. `null` yields the defaults.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        if section.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(section)
    }

    /// Reads settings from a JSONC file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value = jsonc_parser::parse_to_serde_value(&content, &ParseOptions::default())
            .map_err(|e| ConfigError::parse(path, e.to_string()))?
            .unwrap_or(Value::Null);
        Self::from_value(&value).map_err(|e| ConfigError::parse(path, e.to_string()))
    }

    /// Returns the `node` executable to run engines with.
    pub fn node_command(&self) -> PathBuf {
        self.node_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("node"))
    }

    /// Returns whether formatting is disabled for `language_id`.
    pub fn is_language_disabled(&self, language_id: &str) -> bool {
        self.disable_languages.iter().any(|id| id == language_id)
    }
}
