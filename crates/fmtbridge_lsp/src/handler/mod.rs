//! LSP request and notification handlers.

mod command;
mod documents;
mod files;
mod formatting;
mod initialize;
mod registration;
mod workspace;

pub use command::{CREATE_CONFIG_COMMAND, handle_execute_command};
pub use documents::{handle_did_change, handle_did_close, handle_did_open};
pub use files::handle_did_change_watched_files;
pub use formatting::{handle_formatting, handle_range_formatting};
pub use initialize::{handle_initialize, handle_initialized, handle_shutdown};
pub use registration::{refresh_formatting_registration, register_watchers};
pub use workspace::{handle_did_change_configuration, handle_did_change_workspace_folders};
