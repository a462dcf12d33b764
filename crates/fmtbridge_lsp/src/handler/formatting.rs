//! Formatting request handlers.

use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::{
    DocumentFormattingParams, DocumentRangeFormattingParams, Range, TextEdit, Url,
};
use tracing::{debug, error};

use crate::conversion::{range_to_byte_range, to_lsp_edit};
use crate::state::SharedState;

/// Handles the `textDocument/formatting` request.
pub async fn handle_formatting(
    state: &SharedState,
    params: DocumentFormattingParams,
) -> Result<Option<Vec<TextEdit>>> {
    format(state, &params.text_document.uri, None).await
}

/// Handles the `textDocument/rangeFormatting` request.
pub async fn handle_range_formatting(
    state: &SharedState,
    params: DocumentRangeFormattingParams,
) -> Result<Option<Vec<TextEdit>>> {
    format(state, &params.text_document.uri, Some(params.range)).await
}

async fn format(
    state: &SharedState,
    uri: &Url,
    range: Option<Range>,
) -> Result<Option<Vec<TextEdit>>> {
    let Some(session) = state.session() else {
        debug!("Formatting requested before initialization");
        return Ok(None);
    };
    let Some(data) = state.document(uri) else {
        debug!("Formatting requested for unknown document {}", uri);
        return Ok(None);
    };

    let byte_range = match range {
        Some(range) => Some(
            range_to_byte_range(range, &data.text)
                .ok_or_else(|| Error::invalid_params("Range is outside the document"))?,
        ),
        None => None,
    };

    let document = data.to_document(uri);
    // The engine runs as a child process; keep it off the async runtime.
    let edits = tokio::task::spawn_blocking(move || {
        session
            .edit_provider
            .format_document(&document, byte_range)
            .into_edits()
    })
    .await
    .unwrap_or_else(|e| {
        error!("Format task failed: {}", e);
        Vec::new()
    });

    if edits.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        edits
            .iter()
            .filter_map(|edit| to_lsp_edit(edit, &data.text))
            .collect(),
    ))
}
