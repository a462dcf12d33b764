//! Document lifecycle handlers (open, change, close).

use tower_lsp::lsp_types::*;
use tracing::{debug, error};

use crate::state::{DocumentData, SharedState};

/// Handles the `textDocument/didOpen` notification.
pub async fn handle_did_open(state: &SharedState, params: DidOpenTextDocumentParams) {
    debug!("Document opened: {}", params.text_document.uri);

    let mut docs = match state.documents.write() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return;
        }
    };
    docs.insert(
        params.text_document.uri,
        DocumentData {
            text: params.text_document.text,
            version: params.text_document.version,
            language_id: params.text_document.language_id,
        },
    );
}

/// Handles the `textDocument/didChange` notification.
///
/// Only full-text changes are negotiated, so the last change holds the
/// whole document.
pub async fn handle_did_change(state: &SharedState, params: DidChangeTextDocumentParams) {
    debug!("Document changed: {}", params.text_document.uri);

    let Some(change) = params.content_changes.into_iter().last() else {
        return;
    };

    let mut docs = match state.documents.write() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return;
        }
    };
    match docs.get_mut(&params.text_document.uri) {
        Some(data) => {
            if params.text_document.version < data.version {
                debug!("Ignoring stale change for {}", params.text_document.uri);
                return;
            }
            data.text = change.text;
            data.version = params.text_document.version;
        }
        None => {
            debug!("Change for unopened document {}", params.text_document.uri);
        }
    }
}

/// Handles the `textDocument/didClose` notification.
pub async fn handle_did_close(state: &SharedState, params: DidCloseTextDocumentParams) {
    debug!("Document closed: {}", params.text_document.uri);

    match state.documents.write() {
        Ok(mut docs) => {
            docs.remove(&params.text_document.uri);
        }
        Err(e) => error!("Documents lock poisoned: {}", e),
    }
}
