//! Watched files handler.

use tower_lsp::lsp_types::*;
use tracing::debug;

use fmtbridge_core::WatchedFile;

use crate::state::SharedState;

/// Handles the `workspace/didChangeWatchedFiles` notification.
///
/// Returns whether an engine installation changed, which may change the
/// set of supported languages.
pub async fn handle_did_change_watched_files(
    state: &SharedState,
    params: DidChangeWatchedFilesParams,
) -> bool {
    debug!("Watched files changed: {:?}", params.changes);

    let Some(session) = state.session() else {
        return false;
    };

    let mut packages_changed = false;
    for change in &params.changes {
        let Ok(path) = change.uri.to_file_path() else {
            continue;
        };
        if session.file_changed(&path) == WatchedFile::Package {
            packages_changed = true;
        }
    }
    packages_changed
}
