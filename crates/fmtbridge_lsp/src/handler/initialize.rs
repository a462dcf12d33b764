//! Initialize and shutdown handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tracing::{info, warn};

use fmtbridge_core::EditorSettings;

use super::CREATE_CONFIG_COMMAND;
use super::registration::{refresh_formatting_registration, register_watchers};
use crate::sink::ClientSink;
use crate::state::SharedState;

/// Handles the `initialize` LSP request.
pub async fn handle_initialize(
    state: &SharedState,
    client: &tower_lsp::Client,
    params: InitializeParams,
) -> Result<InitializeResult> {
    info!("fmtbridge LSP server initializing...");

    let settings = match params.initialization_options.as_ref() {
        Some(options) => EditorSettings::from_value(options).unwrap_or_else(|e| {
            warn!("Ignoring invalid initialization options: {}", e);
            EditorSettings::default()
        }),
        None => EditorSettings::default(),
    };

    let dynamic = params
        .capabilities
        .text_document
        .as_ref()
        .and_then(|doc| doc.formatting.as_ref())
        .and_then(|formatting| formatting.dynamic_registration)
        .unwrap_or(false);
    state.dynamic_formatting.store(dynamic, Ordering::Relaxed);

    let roots = workspace_roots(&params);
    info!("Workspace roots: {:?}", roots);
    let sink = Arc::new(ClientSink::new(client.clone()));
    if state.start_session(roots, settings, sink).is_none() {
        return Ok(InitializeResult::default());
    }

    Ok(InitializeResult {
        capabilities: ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            // Without dynamic registration no selector can be sent, so every
            // document is offered and the edit provider filters.
            document_formatting_provider: (!dynamic).then_some(OneOf::Left(true)),
            document_range_formatting_provider: (!dynamic).then_some(OneOf::Left(true)),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: vec![CREATE_CONFIG_COMMAND.to_string()],
                work_done_progress_options: Default::default(),
            }),
            workspace: Some(WorkspaceServerCapabilities {
                workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                    supported: Some(true),
                    change_notifications: Some(OneOf::Left(true)),
                }),
                file_operations: None,
            }),
            ..Default::default()
        },
        server_info: Some(ServerInfo {
            name: "fmtbridge-lsp".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

/// Workspace folders when the client sends them, else the root URI.
fn workspace_roots(params: &InitializeParams) -> Vec<PathBuf> {
    if let Some(folders) = &params.workspace_folders {
        return folders
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
    }

    params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
        .into_iter()
        .collect()
}

/// Handles the `initialized` LSP notification.
pub async fn handle_initialized(state: &SharedState, client: &tower_lsp::Client) {
    client
        .log_message(MessageType::INFO, "fmtbridge LSP server initialized!")
        .await;

    let Some(session) = state.session() else {
        return;
    };

    if state.uses_dynamic_formatting() {
        refresh_formatting_registration(state, client).await;
    }
    register_watchers(state, client).await;
    client.telemetry_event(session.integration_usage()).await;
}

/// Handles the `shutdown` LSP request.
pub async fn handle_shutdown() -> Result<()> {
    info!("fmtbridge LSP server shutting down...");
    Ok(())
}
