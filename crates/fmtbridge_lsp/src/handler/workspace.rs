//! Workspace folder and configuration handlers.

use std::sync::Arc;

use serde_json::Value;
use tower_lsp::Client;
use tower_lsp::lsp_types::*;
use tracing::{debug, info, warn};

use fmtbridge_core::{EditorSettings, SETTINGS_SECTION};

use crate::sink::ClientSink;
use crate::state::SharedState;

/// Handles the `workspace/didChangeWorkspaceFolders` notification.
pub async fn handle_did_change_workspace_folders(
    state: &SharedState,
    params: DidChangeWorkspaceFoldersParams,
) {
    let Some(session) = state.session() else {
        return;
    };

    for folder in params.event.removed {
        if let Ok(path) = folder.uri.to_file_path() {
            info!("Workspace folder removed: {}", path.display());
            session.workspace.remove_root(&path);
        }
    }
    for folder in params.event.added {
        if let Ok(path) = folder.uri.to_file_path() {
            info!("Workspace folder added: {}", path.display());
            session.workspace.add_root(path);
        }
    }
    session.clear_caches();
}

/// Handles the `workspace/didChangeConfiguration` notification.
///
/// Clients that send no payload are asked for the settings section.
pub async fn handle_did_change_configuration(
    state: &SharedState,
    client: &Client,
    params: DidChangeConfigurationParams,
) {
    let Some(session) = state.session() else {
        return;
    };

    let value = if params.settings.is_null() {
        pull_settings(client).await
    } else {
        params.settings
    };
    let settings = match EditorSettings::from_value(&value) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Ignoring invalid settings: {}", e);
            return;
        }
    };

    if settings == *session.workspace.settings() {
        debug!("Settings unchanged");
        return;
    }

    // The loader is bound to the node executable, so a new one needs a new session.
    if settings.node_path != session.workspace.settings().node_path {
        info!("Node executable changed, restarting the session");
        let sink = Arc::new(ClientSink::new(client.clone()));
        state.start_session(session.workspace.roots(), settings, sink);
    } else {
        info!("Settings changed, clearing caches");
        session.update_settings(settings);
    }
}

async fn pull_settings(client: &Client) -> Value {
    let item = ConfigurationItem {
        scope_uri: None,
        section: Some(SETTINGS_SECTION.to_string()),
    };
    match client.configuration(vec![item]).await {
        Ok(mut values) if !values.is_empty() => values.swap_remove(0),
        Ok(_) => Value::Null,
        Err(e) => {
            warn!("Failed to fetch settings: {}", e);
            Value::Null
        }
    }
}
