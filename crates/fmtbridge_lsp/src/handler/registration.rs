//! Dynamic capability registration.
//!
//! Formatting is registered with the document selector computed from the
//! resolved engines, and re-registered whenever that selector may change.

use std::sync::atomic::Ordering;

use tower_lsp::Client;
use tower_lsp::lsp_types::*;
use tracing::{error, info, warn};

use fmtbridge_core::{DocumentFilter, Session};

use crate::conversion::to_lsp_filter;
use crate::state::SharedState;

const FORMATTING_ID: &str = "fmtbridge-formatting";
const RANGE_FORMATTING_ID: &str = "fmtbridge-range-formatting";
const WATCHERS_ID: &str = "fmtbridge-watchers";

const FORMATTING_METHOD: &str = "textDocument/formatting";
const RANGE_FORMATTING_METHOD: &str = "textDocument/rangeFormatting";
const WATCHED_FILES_METHOD: &str = "workspace/didChangeWatchedFiles";

/// Replaces the client's formatting registrations with the current selector.
pub async fn refresh_formatting_registration(state: &SharedState, client: &Client) {
    if !state.uses_dynamic_formatting() {
        return;
    }
    let Some(session) = state.session() else {
        return;
    };

    if state.formatting_registered.swap(false, Ordering::SeqCst) {
        let unregistrations = vec![
            Unregistration {
                id: FORMATTING_ID.to_string(),
                method: FORMATTING_METHOD.to_string(),
            },
            Unregistration {
                id: RANGE_FORMATTING_ID.to_string(),
                method: RANGE_FORMATTING_METHOD.to_string(),
            },
        ];
        if let Err(e) = client.unregister_capability(unregistrations).await {
            warn!("Failed to unregister formatting: {}", e);
        }
    }

    // Computing the selector may load engines.
    let selector =
        match tokio::task::spawn_blocking(move || session.formatter.document_selector()).await {
            Ok(selector) => selector,
            Err(e) => {
                error!("Selector task failed: {}", e);
                return;
            }
        };

    let count = selector.len();
    match client
        .register_capability(formatting_registrations(&selector))
        .await
    {
        Ok(()) => {
            state.formatting_registered.store(true, Ordering::SeqCst);
            info!("Registered formatting for {} selector entries", count);
        }
        Err(e) => warn!("Failed to register formatting: {}", e),
    }
}

fn formatting_registrations(selector: &[DocumentFilter]) -> Vec<Registration> {
    let options = TextDocumentRegistrationOptions {
        document_selector: Some(selector.iter().map(to_lsp_filter).collect()),
    };
    let register_options = match serde_json::to_value(options) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to serialize registration options: {}", e);
            return Vec::new();
        }
    };

    vec![
        Registration {
            id: FORMATTING_ID.to_string(),
            method: FORMATTING_METHOD.to_string(),
            register_options: Some(register_options.clone()),
        },
        Registration {
            id: RANGE_FORMATTING_ID.to_string(),
            method: RANGE_FORMATTING_METHOD.to_string(),
            register_options: Some(register_options),
        },
    ]
}

/// Glob patterns for every file whose change affects resolution.
fn watch_patterns(session: &Session) -> Vec<String> {
    let package = session.workspace.package();
    let mut patterns: Vec<String> = package
        .config_files
        .iter()
        .map(|name| format!("**/{}", name))
        .collect();
    patterns.push(format!("**/{}", session.workspace.ignore_file_name()));
    patterns.push(format!("**/node_modules/{}/package.json", package.name));
    patterns
}

/// Registers file watchers for config, ignore and package files.
pub async fn register_watchers(state: &SharedState, client: &Client) {
    let Some(session) = state.session() else {
        return;
    };

    if state.watchers_registered.swap(false, Ordering::SeqCst) {
        let unregistration = Unregistration {
            id: WATCHERS_ID.to_string(),
            method: WATCHED_FILES_METHOD.to_string(),
        };
        if let Err(e) = client.unregister_capability(vec![unregistration]).await {
            warn!("Failed to unregister file watchers: {}", e);
        }
    }

    let watchers = watch_patterns(&session)
        .into_iter()
        .map(|pattern| FileSystemWatcher {
            glob_pattern: GlobPattern::String(pattern),
            kind: None,
        })
        .collect();
    let options = DidChangeWatchedFilesRegistrationOptions { watchers };
    let register_options = match serde_json::to_value(options) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to serialize watcher options: {}", e);
            return;
        }
    };

    let registration = Registration {
        id: WATCHERS_ID.to_string(),
        method: WATCHED_FILES_METHOD.to_string(),
        register_options: Some(register_options),
    };
    match client.register_capability(vec![registration]).await {
        Ok(()) => state.watchers_registered.store(true, Ordering::SeqCst),
        Err(e) => warn!("Failed to register file watchers: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registration_carries_selector() {
        let selector = vec![DocumentFilter {
            language: Some("javascript".to_string()),
            scheme: Some("file".to_string()),
            pattern: None,
        }];
        let registrations = formatting_registrations(&selector);

        assert_eq!(registrations.len(), 2);
        assert_eq!(registrations[0].method, FORMATTING_METHOD);
        assert_eq!(registrations[1].method, RANGE_FORMATTING_METHOD);
        assert_eq!(
            registrations[0].register_options,
            Some(serde_json::json!({
                "documentSelector": [{ "language": "javascript", "scheme": "file" }]
            }))
        );
    }
}
