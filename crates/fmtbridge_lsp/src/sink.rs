//! Forwards core notifications to the client's message UI.

use tokio::runtime::Handle;
use tower_lsp::Client;
use tower_lsp::lsp_types::MessageType;

use fmtbridge_core::{NotificationKind, NotificationSink, TracingSink};

/// Notification sink backed by `window/showMessage`.
///
/// Notifications are raised from blocking format tasks, so each message is
/// sent from a task spawned on the runtime captured at construction.
pub(crate) struct ClientSink {
    client: Client,
    runtime: Option<Handle>,
}

impl ClientSink {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            runtime: Handle::try_current().ok(),
        }
    }
}

fn message_type(kind: NotificationKind) -> MessageType {
    match kind {
        NotificationKind::Info => MessageType::INFO,
        NotificationKind::Warning => MessageType::WARNING,
        NotificationKind::Error => MessageType::ERROR,
    }
}

impl NotificationSink for ClientSink {
    fn show(&self, kind: NotificationKind, message: &str) {
        let Some(runtime) = &self.runtime else {
            TracingSink.show(kind, message);
            return;
        };

        let client = self.client.clone();
        let message = message.to_string();
        runtime.spawn(async move {
            client.show_message(message_type(kind), message).await;
        });
    }
}
