//! # fmtbridge_core
//!
//! Resolution core for fmtbridge.
//!
//! This crate provides:
//! - Engine resolution per project with a bundled fallback
//! - Project config discovery and key-by-key option merging
//! - Ignore file handling
//! - The edit provider that runs one format request end to end
//! - Formatter registration data and the config template command
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fmtbridge_core::{Document, EditorSettings, Session, TracingSink};
//! use fmtbridge_engine::{EnginePackage, NodeEngineLoader};
//!
//! let settings = EditorSettings::default();
//! let loader = NodeEngineLoader::new(EnginePackage::prettier(), settings.node_command());
//! let session = Session::activate(
//!     EnginePackage::prettier(),
//!     vec!["/work/app".into()],
//!     settings,
//!     Arc::new(loader),
//!     Arc::new(TracingSink),
//! );
//!
//! let document = Document::new("/work/app/src/index.js", "const a=1");
//! let edits = session.edit_provider.provide_edits(&document);
//! ```

mod config_resolver;
mod document;
pub mod edit;
mod edit_provider;
mod error;
mod format_config;
mod formatter;
mod ignore_resolver;
mod logging;
pub mod message;
mod module_resolver;
mod notification;
mod session;
mod settings;
pub mod template;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config_resolver::{ConfigResolver, ResolvedConfig};
pub use document::Document;
pub use edit::{ByteRange, TextEdit, minimal_edit};
pub use edit_provider::{EditProvider, FailureKind, FormatOutcome, SkipReason};
pub use error::{ConfigError, ResolveError, TemplateError};
pub use format_config::FormatConfig;
pub use formatter::{DocumentFilter, Formatter};
pub use ignore_resolver::IgnoreResolver;
pub use logging::{LogEntry, LogLevel, LoggingService};
pub use module_resolver::{
    Declaration, Lookup, ModuleLocation, ModuleResolver, ResolutionRoot, ResolveOptions,
};
pub use notification::{NotificationKind, NotificationService, NotificationSink, TracingSink};
pub use session::{BUNDLED_ENGINE_ENV, Session, WatchedFile};
pub use settings::{EditorSettings, SETTINGS_SECTION};
pub use template::{CONFIG_TEMPLATE, create_config_file};
pub use workspace::Workspace;
