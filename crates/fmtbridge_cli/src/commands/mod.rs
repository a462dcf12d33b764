pub mod format;
pub mod init;
pub mod lsp;
pub mod resolve;
