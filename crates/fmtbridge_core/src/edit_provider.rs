//! Per-request formatting pipeline.
//!
//! A request runs through the disabled-language check, ignore rules, engine
//! resolution, the `requireConfig` gate, parser inference, option
//! resolution and finally the engine. Every failure ends in a
//! `FormatOutcome`; nothing escapes to the host.

use std::sync::Arc;

use fmtbridge_engine::{EngineError, FormatRequest, infer_parser};
use serde_json::Value;

use crate::edit::{ByteRange, TextEdit, minimal_edit};
use crate::{
    ConfigResolver, Document, IgnoreResolver, LoggingService, ModuleResolver, NotificationService,
    ResolveOptions, Workspace, message,
};

/// Why a document was left untouched on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Formatting is switched off in the settings.
    Disabled,
    LanguageDisabled,
    Ignored,
    /// `requireConfig` is set and no project config governs the file.
    NoConfig,
    /// The engine has no parser for the document.
    Unsupported,
}

/// Why formatting was attempted and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EngineUnavailable,
    /// The engine rejected the document content.
    Syntax,
    Engine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Edits to apply; empty when the document is already formatted.
    Edits(Vec<TextEdit>),
    Skipped(SkipReason),
    Failed(FailureKind),
}

impl FormatOutcome {
    /// Returns the edits, treating every other outcome as "no edits".
    pub fn into_edits(self) -> Vec<TextEdit> {
        match self {
            Self::Edits(edits) => edits,
            Self::Skipped(_) | Self::Failed(_) => Vec::new(),
        }
    }
}

pub struct EditProvider {
    workspace: Arc<Workspace>,
    modules: Arc<ModuleResolver>,
    configs: Arc<ConfigResolver>,
    ignores: Arc<IgnoreResolver>,
    logger: Arc<LoggingService>,
    notifications: Arc<NotificationService>,
}

impl EditProvider {
    pub fn new(
        workspace: Arc<Workspace>,
        modules: Arc<ModuleResolver>,
        configs: Arc<ConfigResolver>,
        ignores: Arc<IgnoreResolver>,
        logger: Arc<LoggingService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            workspace,
            modules,
            configs,
            ignores,
            logger,
            notifications,
        }
    }

    /// Returns the edits formatting the whole document.
    pub fn provide_edits(&self, document: &Document) -> Vec<TextEdit> {
        self.format_document(document, None).into_edits()
    }

    /// Returns the edits formatting `range` of the document.
    pub fn provide_range_edits(&self, document: &Document, range: ByteRange) -> Vec<TextEdit> {
        self.format_document(document, Some(range)).into_edits()
    }

    pub fn format_document(&self, document: &Document, range: Option<ByteRange>) -> FormatOutcome {
        let settings = self.workspace.settings();
        let name = document.display_name();

        if !settings.enable {
            return FormatOutcome::Skipped(SkipReason::Disabled);
        }
        if let Some(language_id) = document.language_id.as_deref()
            && settings.is_language_disabled(language_id)
        {
            self.logger
                .log_debug(&format!("Formatting is disabled for {}", language_id));
            return FormatOutcome::Skipped(SkipReason::LanguageDisabled);
        }

        let path = document.path();
        if let Some(path) = path
            && self.ignores.should_ignore(path)
        {
            self.logger.log_info(&format!("Ignoring {}", path.display()));
            return FormatOutcome::Skipped(SkipReason::Ignored);
        }

        let engine = match path {
            Some(path) => self.modules.engine_instance(path, ResolveOptions::default()),
            None => {
                let bundled = self.modules.bundled_instance();
                if bundled.is_none() {
                    self.logger.log_error(message::ENGINE_UNAVAILABLE, None);
                    self.notifications
                        .show_error_once(message::ENGINE_UNAVAILABLE);
                }
                bundled
            }
        };
        let Some(engine) = engine else {
            return FormatOutcome::Failed(FailureKind::EngineUnavailable);
        };

        if settings.require_config
            && let Some(path) = path
            && !self.configs.has_config(path)
        {
            self.logger.log_info(&format!(
                "Skipping {}: no project config and requireConfig is set",
                path.display()
            ));
            return FormatOutcome::Skipped(SkipReason::NoConfig);
        }

        let mut options = match path {
            Some(path) => self.configs.config_for(path).options,
            None => self.configs.editor_config(),
        };

        let languages = match engine.languages() {
            Ok(languages) => languages,
            Err(e) => {
                self.logger.log_error(message::FORMAT_FAILED, Some(&e));
                self.notifications.show_error_once(message::FORMAT_FAILED);
                return FormatOutcome::Failed(FailureKind::Engine);
            }
        };
        let parser = match options.get("parser").and_then(Value::as_str) {
            Some(parser) => Some(parser.to_string()),
            None => infer_parser(&languages, path, document.language_id.as_deref()),
        };
        let Some(parser) = parser else {
            self.logger.log_info(&format!(
                "No parser could be inferred for {}",
                path.map(|p| p.display().to_string()).unwrap_or(name)
            ));
            return FormatOutcome::Skipped(SkipReason::Unsupported);
        };

        if let Some(range) = range {
            // The engine counts offsets in UTF-16 code units.
            let start = utf16_offset(&document.text, range.start);
            let end = utf16_offset(&document.text, range.end);
            options.insert("rangeStart", Value::from(start));
            options.insert("rangeEnd", Value::from(end));
        }

        self.logger.log_debug(&format!(
            "Formatting {} with {} {} ({})",
            name,
            self.workspace.package().name,
            engine.version(),
            engine.origin()
        ));
        let request = FormatRequest {
            file_path: path,
            parser: Some(&parser),
            options: options.as_map(),
        };

        match engine.format(&document.text, &request) {
            Ok(formatted) => {
                self.notifications.forget_scope(&syntax_scope(&name));
                match minimal_edit(&document.text, &formatted) {
                    Some(edit) => FormatOutcome::Edits(vec![edit]),
                    None => FormatOutcome::Edits(Vec::new()),
                }
            }
            Err(EngineError::Syntax { message: detail }) => {
                let scope = syntax_scope(&name);
                let text = format!("{}{}", scope, detail);
                self.logger.log_error(&text, None);
                self.notifications.show_scoped_error_once(&scope, &text);
                FormatOutcome::Failed(FailureKind::Syntax)
            }
            Err(e) => {
                self.logger.log_error(message::FORMAT_FAILED, Some(&e));
                self.notifications.show_error_once(message::FORMAT_FAILED);
                FormatOutcome::Failed(FailureKind::Engine)
            }
        }
    }
}

/// Prefix shared by the syntax error notifications of one document.
fn syntax_scope(name: &str) -> String {
    format!("{}: ", name)
}

/// Converts a byte offset to a UTF-16 offset, clamping to a char boundary.
fn utf16_offset(text: &str, byte_offset: usize) -> usize {
    let mut offset = byte_offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    text[..offset].encode_utf16().count()
}
