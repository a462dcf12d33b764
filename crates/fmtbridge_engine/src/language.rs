//! Language support information reported by an engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A language the engine can format.
///
/// Field names follow the engine's `--support-info` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    /// Display name (e.g. "JavaScript").
    pub name: String,
    /// Parsers able to handle the language, preferred first.
    #[serde(default)]
    pub parsers: Vec<String>,
    /// File extensions including the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Exact file names (e.g. ".prettierrc").
    #[serde(default)]
    pub filenames: Vec<String>,
    /// Editor language identifiers.
    #[serde(default)]
    pub vscode_language_ids: Vec<String>,
}

impl LanguageInfo {
    /// Creates a language entry.
    pub fn new(name: impl Into<String>, parser: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parsers: vec![parser.into()],
            extensions: Vec::new(),
            filenames: Vec::new(),
            vscode_language_ids: Vec::new(),
        }
    }

    /// Adds file extensions.
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions
            .extend(extensions.iter().map(|e| e.to_string()));
        self
    }

    /// Adds exact file names.
    pub fn with_filenames(mut self, filenames: &[&str]) -> Self {
        self.filenames.extend(filenames.iter().map(|f| f.to_string()));
        self
    }

    /// Adds editor language identifiers.
    pub fn with_language_ids(mut self, ids: &[&str]) -> Self {
        self.vscode_language_ids
            .extend(ids.iter().map(|id| id.to_string()));
        self
    }

    /// Returns the editor language identifiers, falling back to the lowercased name.
    pub fn language_ids(&self) -> Vec<String> {
        if self.vscode_language_ids.is_empty() {
            vec![self.name.to_lowercase()]
        } else {
            self.vscode_language_ids.clone()
        }
    }

    fn matches_file(&self, file_name: &str) -> bool {
        self.filenames.iter().any(|name| name == file_name)
    }

    fn matches_extension(&self, file_name: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| file_name.len() > ext.len() && file_name.ends_with(ext.as_str()))
    }
}

/// Output of the engine's `--support-info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportInfo {
    #[serde(default)]
    pub languages: Vec<LanguageInfo>,
}

/// Picks a parser for a document.
///
/// Exact file names win over extensions, which win over the editor
/// language identifier.
pub fn infer_parser(
    languages: &[LanguageInfo],
    file_path: Option<&Path>,
    language_id: Option<&str>,
) -> Option<String> {
    let file_name = file_path
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());

    let by_path = file_name.and_then(|name| {
        languages
            .iter()
            .find(|lang| lang.matches_file(name))
            .or_else(|| languages.iter().find(|lang| lang.matches_extension(name)))
    });

    let language = by_path.or_else(|| {
        let id = language_id?;
        languages
            .iter()
            .find(|lang| lang.language_ids().iter().any(|known| known == id))
    })?;

    language.parsers.first().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn languages() -> Vec<LanguageInfo> {
        vec![
            LanguageInfo::new("JavaScript", "babel")
                .with_extensions(&[".js", ".mjs"])
                .with_language_ids(&["javascript", "javascriptreact"]),
            LanguageInfo::new("JSON", "json")
                .with_extensions(&[".json"])
                .with_filenames(&[".prettierrc"])
                .with_language_ids(&["json"]),
            LanguageInfo::new("Markdown", "markdown").with_extensions(&[".md"]),
        ]
    }

    #[test]
    fn test_infer_by_extension() {
        let path = PathBuf::from("/work/src/index.mjs");
        assert_eq!(
            infer_parser(&languages(), Some(&path), None),
            Some("babel".to_string())
        );
    }

    #[test]
    fn test_infer_by_filename_before_extension() {
        let path = PathBuf::from("/work/.prettierrc");
        assert_eq!(
            infer_parser(&languages(), Some(&path), None),
            Some("json".to_string())
        );
    }

    #[test]
    fn test_infer_by_language_id() {
        assert_eq!(
            infer_parser(&languages(), None, Some("javascriptreact")),
            Some("babel".to_string())
        );
        // Name fallback when no ids are declared.
        assert_eq!(
            infer_parser(&languages(), None, Some("markdown")),
            Some("markdown".to_string())
        );
    }

    #[test]
    fn test_infer_unsupported() {
        let path = PathBuf::from("/work/main.rs");
        assert_eq!(infer_parser(&languages(), Some(&path), Some("rust")), None);
    }

    #[test]
    fn test_extension_alone_is_not_a_match() {
        let path = PathBuf::from("/work/.json");
        assert_eq!(infer_parser(&languages(), Some(&path), None), None);
    }

    #[test]
    fn test_support_info_deserialize() {
        let json = r#"{
            "languages": [
                {
                    "name": "TypeScript",
                    "parsers": ["typescript", "babel-ts"],
                    "extensions": [".ts", ".cts"],
                    "vscodeLanguageIds": ["typescript"],
                    "linguistLanguageId": 378
                }
            ],
            "options": []
        }"#;
        let info: SupportInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.languages.len(), 1);
        assert_eq!(info.languages[0].parsers[0], "typescript");
        assert_eq!(info.languages[0].vscode_language_ids, vec!["typescript"]);
    }
}
