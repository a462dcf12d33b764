mod common;

use std::sync::Arc;
use std::time::Duration;

use fmtbridge_engine::test_utils::MockLoader;
use fmtbridge_lsp::Backend;
use tower_lsp::LspService;
use tower_lsp::lsp_types::Url;

async fn initialize_response(dynamic_registration: bool) -> serde_json::Value {
    let (client_read, server_write) = tokio::io::duplex(4096);
    let (server_read, client_write) = tokio::io::duplex(4096);

    let loader = Arc::new(MockLoader::new());
    let (service, socket) = LspService::new(move |client| Backend::with_loader(client, loader));
    tokio::spawn(async move {
        tower_lsp::Server::new(server_read, server_write, socket)
            .serve(service)
            .await;
    });

    let temp = common::workspace();
    let root_uri = Url::from_file_path(temp.path()).unwrap();
    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "rootUri": root_uri,
            "capabilities": {
                "textDocument": {
                    "formatting": { "dynamicRegistration": dynamic_registration }
                }
            },
            "initializationOptions": {
                "bundledEnginePath": temp.path().join("bundled/prettier")
            }
        }
    });

    let mut reader = tokio::io::BufReader::new(client_read);
    let mut writer = client_write;
    common::send_msg(&mut writer, &request.to_string()).await;

    let response = tokio::time::timeout(Duration::from_secs(5), common::recv_msg(&mut reader))
        .await
        .expect("initialize timed out")
        .expect("no response");
    serde_json::from_str(&response).unwrap()
}

#[tokio::test]
async fn test_static_formatting_without_dynamic_registration() {
    let response = initialize_response(false).await;
    let capabilities = &response["result"]["capabilities"];

    assert_eq!(capabilities["documentFormattingProvider"], true);
    assert_eq!(capabilities["documentRangeFormattingProvider"], true);
    assert_eq!(
        capabilities["executeCommandProvider"]["commands"][0],
        "fmtbridge.createConfigFile"
    );
    assert_eq!(response["result"]["serverInfo"]["name"], "fmtbridge-lsp");
}

#[tokio::test]
async fn test_dynamic_registration_leaves_formatting_unadvertised() {
    let response = initialize_response(true).await;
    let capabilities = &response["result"]["capabilities"];

    assert!(capabilities.get("documentFormattingProvider").is_none());
    assert_eq!(
        capabilities["workspace"]["workspaceFolders"]["supported"],
        true
    );
}
