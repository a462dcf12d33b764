//! LSP command implementation

use miette::Result;

use crate::utils::create_tokio_runtime;

pub fn run_lsp() -> Result<()> {
    create_tokio_runtime()?.block_on(async {
        fmtbridge_lsp::run().await;
    });
    Ok(())
}
