//! Project config file discovery and merging.
//!
//! Options are layered lowest to highest: built-in defaults, editor
//! settings, the nearest project config file, then each matching
//! `overrides` entry of that file in order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fmtbridge_engine::PackageManifest;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use jsonc_parser::ParseOptions;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::{ConfigError, FormatConfig, LoggingService, Workspace, message};

/// Options in effect for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub options: FormatConfig,
    /// Project config file the options came from.
    pub source: Option<PathBuf>,
}

/// Glob patterns from an override's `files` or `excludeFiles`.
#[derive(Debug)]
struct PatternSet {
    /// Patterns without a `/`, matched against the file name.
    names: GlobSet,
    /// Patterns with a `/`, matched against the path relative to the config file.
    paths: GlobSet,
}

impl PatternSet {
    fn build(patterns: &[String]) -> Result<Self, globset::Error> {
        let mut names = GlobSetBuilder::new();
        let mut paths = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
            if pattern.contains('/') {
                let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
                paths.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
            } else {
                names.add(GlobBuilder::new(pattern).build()?);
            }
        }
        Ok(Self {
            names: names.build()?,
            paths: paths.build()?,
        })
    }

    fn is_match(&self, file_name: &str, relative: &Path) -> bool {
        self.names.is_match(file_name) || self.paths.is_match(relative)
    }
}

#[derive(Debug)]
struct Override {
    files: PatternSet,
    exclude: Option<PatternSet>,
    options: FormatConfig,
}

/// Parsed contents of one project config file.
#[derive(Debug)]
struct ProjectConfig {
    base_dir: PathBuf,
    options: FormatConfig,
    overrides: Vec<Override>,
}

impl ProjectConfig {
    fn options_for(&self, file_path: &Path) -> FormatConfig {
        let mut options = self.options.clone();
        let Ok(relative) = file_path.strip_prefix(&self.base_dir) else {
            return options;
        };
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for entry in &self.overrides {
            let excluded = entry
                .exclude
                .as_ref()
                .is_some_and(|set| set.is_match(&file_name, relative));
            if !excluded && entry.files.is_match(&file_name, relative) {
                options.merge(&entry.options);
            }
        }
        options
    }
}

pub struct ConfigResolver {
    workspace: Arc<Workspace>,
    logger: Arc<LoggingService>,
    /// Directory to the config file governing it.
    locations: RwLock<HashMap<PathBuf, Option<PathBuf>>>,
    /// Config file to its parsed contents, or the parse failure.
    contents: RwLock<HashMap<PathBuf, Result<Arc<ProjectConfig>, String>>>,
}

impl ConfigResolver {
    pub fn new(workspace: Arc<Workspace>, logger: Arc<LoggingService>) -> Self {
        Self {
            workspace,
            logger,
            locations: RwLock::new(HashMap::new()),
            contents: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the options for `file_path`; never fails.
    pub fn config_for(&self, file_path: &Path) -> ResolvedConfig {
        let mut options = self.editor_config();

        let Some(config_path) = self.config_path(file_path) else {
            return ResolvedConfig {
                options,
                source: None,
            };
        };

        match self.load(&config_path) {
            Ok(project) => {
                options.merge(&project.options_for(file_path));
                ResolvedConfig {
                    options,
                    source: Some(config_path),
                }
            }
            Err(_) => ResolvedConfig {
                options,
                source: None,
            },
        }
    }

    /// Built-in defaults with the editor settings applied.
    pub fn editor_config(&self) -> FormatConfig {
        FormatConfig::defaults().merged(&self.workspace.settings().options)
    }

    /// Returns whether a project config file governs `file_path`.
    pub fn has_config(&self, file_path: &Path) -> bool {
        self.config_path(file_path).is_some()
    }

    /// Returns the config file governing `file_path`.
    pub fn config_path(&self, file_path: &Path) -> Option<PathBuf> {
        let dir = file_path.parent()?;

        let mut visited = Vec::new();
        let mut found = None;
        for candidate_dir in dir.ancestors() {
            if candidate_dir.as_os_str().is_empty() {
                break;
            }
            if let Some(cached) = self.locations.read().get(candidate_dir) {
                found = cached.clone();
                break;
            }
            visited.push(candidate_dir.to_path_buf());
            if let Some(path) = self.config_in(candidate_dir) {
                found = Some(path);
                break;
            }
        }

        let mut locations = self.locations.write();
        for dir in visited {
            locations.insert(dir, found.clone());
        }
        found
    }

    /// Drops cached state affected by a change to `path`.
    pub fn invalidate(&self, path: &Path) {
        self.contents
            .write()
            .retain(|config, _| config != path && !config.starts_with(path));

        let dir = path.parent().unwrap_or(path);
        self.locations.write().retain(|d, _| !d.starts_with(dir));
    }

    pub fn clear(&self) {
        self.contents.write().clear();
        self.locations.write().clear();
    }

    /// Returns the first config candidate present in `dir`.
    fn config_in(&self, dir: &Path) -> Option<PathBuf> {
        let package = self.workspace.package();
        for name in &package.config_files {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            if name != "package.json" {
                return Some(path);
            }
            // A manifest only counts when it embeds a config.
            match PackageManifest::read(&path) {
                Ok(manifest) if manifest.embedded_config(package.manifest_key()).is_some() => {
                    return Some(path);
                }
                Ok(_) => {}
                Err(e) => self.logger.log_debug(&format!("Skipping {}", e)),
            }
        }
        None
    }

    fn load(&self, config_path: &Path) -> Result<Arc<ProjectConfig>, String> {
        if let Some(cached) = self.contents.read().get(config_path) {
            return cached.clone();
        }

        let result = self.parse(config_path).map(Arc::new).map_err(|e| {
            self.logger
                .log_error(message::FAILED_TO_PARSE_CONFIG, Some(&e));
            e.to_string()
        });

        self.contents
            .write()
            .entry(config_path.to_path_buf())
            .or_insert(result)
            .clone()
    }

    fn parse(&self, path: &Path) -> Result<ProjectConfig, ConfigError> {
        let base_dir = path.parent().unwrap_or(path).to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let value = if file_name == "package.json" {
            let manifest = PackageManifest::read(path)
                .map_err(|e| ConfigError::parse(path, e.to_string()))?;
            match manifest.embedded_config(self.workspace.package().manifest_key()) {
                Some(Value::String(shared)) => {
                    self.logger.log_info(&format!(
                        "{} refers to shared config `{}`, which is left to the engine",
                        path.display(),
                        shared
                    ));
                    Value::Null
                }
                Some(value) => value.clone(),
                None => Value::Null,
            }
        } else {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config_text(path, &file_name, &content)?
        };

        let mut map = match value {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::parse(
                    path,
                    format!("expected an object, found {}", kind_of(&other)),
                ));
            }
        };

        map.remove("$schema");
        let overrides = match map.remove("overrides") {
            Some(value) => parse_overrides(path, value)?,
            None => Vec::new(),
        };

        self.logger
            .log_debug(&format!("Loaded config from {}", path.display()));
        Ok(ProjectConfig {
            base_dir,
            options: FormatConfig::from(map),
            overrides,
        })
    }
}

/// Every relaxation the parser offers, which covers most of JSON5.
const LOOSE_JSON: ParseOptions = ParseOptions {
    allow_comments: true,
    allow_loose_object_property_names: true,
    allow_trailing_commas: true,
    allow_missing_commas: true,
    allow_single_quoted_strings: true,
    allow_hexadecimal_numbers: true,
    allow_unary_plus_numbers: true,
};

/// Parses config text according to the file's name.
fn parse_config_text(path: &Path, file_name: &str, content: &str) -> Result<Value, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }

    if file_name.ends_with(".yaml") || file_name.ends_with(".yml") {
        return serde_yaml::from_str(content).map_err(|e| ConfigError::parse(path, e.to_string()));
    }
    if file_name.ends_with(".toml") {
        return toml::from_str::<toml::Table>(content)
            .map_err(|e| ConfigError::parse(path, e.to_string()))
            .and_then(|table| {
                serde_json::to_value(table).map_err(|e| ConfigError::parse(path, e.to_string()))
            });
    }

    let json = jsonc_parser::parse_to_serde_value(content, &LOOSE_JSON)
        .map(|value| value.unwrap_or(Value::Null));
    match json {
        Ok(value) => Ok(value),
        // An extensionless rc file may be YAML.
        Err(json_err) if !file_name.contains(".json") => serde_yaml::from_str(content)
            .map_err(|yaml_err| {
                ConfigError::parse(
                    path,
                    format!("not valid JSON ({}) or YAML ({})", json_err, yaml_err),
                )
            }),
        Err(e) => Err(ConfigError::parse(path, e.to_string())),
    }
}

fn parse_overrides(path: &Path, value: Value) -> Result<Vec<Override>, ConfigError> {
    let Value::Array(entries) = value else {
        return Err(ConfigError::invalid_override(path, "`overrides` must be an array"));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let Value::Object(mut entry) = entry else {
                return Err(ConfigError::invalid_override(
                    path,
                    format!("entry {} must be an object", index),
                ));
            };

            let files = entry
                .remove("files")
                .map(|v| patterns(path, index, "files", v))
                .transpose()?
                .ok_or_else(|| {
                    ConfigError::invalid_override(path, format!("entry {} has no `files`", index))
                })?;
            let exclude = entry
                .remove("excludeFiles")
                .map(|v| patterns(path, index, "excludeFiles", v))
                .transpose()?;
            let options = match entry.remove("options") {
                Some(Value::Object(options)) => FormatConfig::from(options),
                None => FormatConfig::new(),
                Some(_) => {
                    return Err(ConfigError::invalid_override(
                        path,
                        format!("entry {} has non-object `options`", index),
                    ));
                }
            };

            Ok(Override {
                files,
                exclude,
                options,
            })
        })
        .collect()
}

fn patterns(path: &Path, index: usize, key: &str, value: Value) -> Result<PatternSet, ConfigError> {
    let list = match value {
        Value::String(pattern) => vec![pattern],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(pattern) => Ok(pattern),
                _ => Err(ConfigError::invalid_override(
                    path,
                    format!("entry {} has a non-string `{}` pattern", index, key),
                )),
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(ConfigError::invalid_override(
                path,
                format!("entry {} has invalid `{}`", index, key),
            ));
        }
    };
    PatternSet::build(&list).map_err(|e| ConfigError::invalid_override(path, e.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
