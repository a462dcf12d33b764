//! fmtbridge LSP Server
//!
//! Language Server Protocol front end for fmtbridge. Serves document and
//! range formatting, registered dynamically for the languages the resolved
//! engines support.

mod conversion;
mod handler;
mod sink;
mod state;

use std::sync::Arc;

use serde_json::Value;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::info;

use fmtbridge_core::EditorSettings;
use fmtbridge_engine::{EngineLoader, EnginePackage, NodeEngineLoader};

pub use handler::CREATE_CONFIG_COMMAND;
pub use state::LoaderFactory;

use state::{BackendState, SharedState};

/// The LSP backend for fmtbridge.
#[derive(Clone)]
pub struct Backend {
    /// LSP client for sending notifications.
    client: Client,
    /// Shared state
    state: SharedState,
}

impl Backend {
    /// Creates a backend that runs engines under `node`.
    pub fn new(client: Client) -> Self {
        let factory: LoaderFactory = Arc::new(|settings: &EditorSettings| {
            Arc::new(NodeEngineLoader::new(
                EnginePackage::prettier(),
                settings.node_command(),
            )) as Arc<dyn EngineLoader>
        });
        Self::with_loader_factory(client, factory)
    }

    /// Creates a backend that builds its engine loader from the settings.
    pub fn with_loader_factory(client: Client, factory: LoaderFactory) -> Self {
        Self {
            client,
            state: Arc::new(BackendState::new(factory)),
        }
    }

    /// Creates a backend that always uses `loader`.
    pub fn with_loader(client: Client, loader: Arc<dyn EngineLoader>) -> Self {
        Self::with_loader_factory(client, Arc::new(move |_: &EditorSettings| loader.clone()))
    }

    async fn refresh_registrations(&self) {
        handler::refresh_formatting_registration(&self.state, &self.client).await;
        handler::register_watchers(&self.state, &self.client).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handler::handle_initialize(&self.state, &self.client, params).await
    }

    async fn initialized(&self, _: InitializedParams) {
        handler::handle_initialized(&self.state, &self.client).await;
    }

    async fn shutdown(&self) -> Result<()> {
        handler::handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        handler::handle_did_open(&self.state, params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        handler::handle_did_change(&self.state, params).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handler::handle_did_close(&self.state, params).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        handler::handle_did_change_configuration(&self.state, &self.client, params).await;
        self.refresh_registrations().await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        handler::handle_did_change_workspace_folders(&self.state, params).await;
        self.refresh_registrations().await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        if handler::handle_did_change_watched_files(&self.state, params).await {
            handler::refresh_formatting_registration(&self.state, &self.client).await;
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        handler::handle_execute_command(&self.state, &self.client, params).await
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        handler::handle_formatting(&self.state, params).await
    }

    async fn range_formatting(
        &self,
        params: DocumentRangeFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        handler::handle_range_formatting(&self.state, params).await
    }
}

/// Starts the LSP server.
///
/// This function does not return unless an error occurs or the server shuts down.
pub async fn run() {
    info!("fmtbridge LSP server starting...");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
