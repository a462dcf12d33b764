//! Command handlers.

use std::path::PathBuf;

use serde_json::Value;
use tower_lsp::Client;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::{ExecuteCommandParams, MessageType, Url};
use tracing::error;

use fmtbridge_core::{TemplateError, create_config_file};

use crate::state::SharedState;

/// Writes the default config file into a workspace folder.
///
/// Arguments: an optional folder (URI or path) and an optional `force` flag.
pub const CREATE_CONFIG_COMMAND: &str = "fmtbridge.createConfigFile";

/// Handles the `workspace/executeCommand` request.
pub async fn handle_execute_command(
    state: &SharedState,
    client: &Client,
    params: ExecuteCommandParams,
) -> Result<Option<Value>> {
    if params.command != CREATE_CONFIG_COMMAND {
        return Err(Error::invalid_params(format!(
            "Unknown command: {}",
            params.command
        )));
    }

    let Some(root) = target_folder(state, &params.arguments) else {
        client
            .show_message(
                MessageType::ERROR,
                "Open a workspace folder to create a config file.",
            )
            .await;
        return Ok(None);
    };
    let force = params
        .arguments
        .get(1)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match create_config_file(&root, force) {
        Ok(path) => {
            if let Some(session) = state.session() {
                session.file_changed(&path);
            }
            client
                .show_message(MessageType::INFO, format!("Created {}", path.display()))
                .await;
            Ok(Some(Value::String(path.display().to_string())))
        }
        Err(TemplateError::AlreadyExists(path)) => {
            client
                .show_message(
                    MessageType::WARNING,
                    format!("{} already exists", path.display()),
                )
                .await;
            Ok(None)
        }
        Err(e) => {
            error!("Failed to create config file: {}", e);
            client
                .show_message(
                    MessageType::ERROR,
                    format!("Failed to create config file: {}", e),
                )
                .await;
            Ok(None)
        }
    }
}

/// The folder named by the first argument, else the first workspace folder.
fn target_folder(state: &SharedState, arguments: &[Value]) -> Option<PathBuf> {
    let explicit = arguments.first().and_then(Value::as_str).map(|arg| {
        Url::parse(arg)
            .ok()
            .and_then(|uri| uri.to_file_path().ok())
            .unwrap_or_else(|| PathBuf::from(arg))
    });
    explicit.or_else(|| state.session()?.workspace.roots().into_iter().next())
}
