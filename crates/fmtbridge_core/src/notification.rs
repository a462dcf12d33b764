//! User-visible notifications.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::LoggingService;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The host's message UI.
pub trait NotificationSink: Send + Sync {
    fn show(&self, kind: NotificationKind, message: &str);
}

/// Sink that only emits `tracing` events, for hosts without a message UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn show(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Info => info!("{}", message),
            NotificationKind::Warning => warn!("{}", message),
            NotificationKind::Error => error!("{}", message),
        }
    }
}

/// Delivers each distinct message at most once per session.
pub struct NotificationService {
    sink: Arc<dyn NotificationSink>,
    logger: Arc<LoggingService>,
    seen: Mutex<HashSet<(NotificationKind, String)>>,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn NotificationSink>, logger: Arc<LoggingService>) -> Self {
        Self {
            sink,
            logger,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Shows an info message if it has not been shown yet.
    pub fn show_info_once(&self, message: &str) -> bool {
        self.show_once(NotificationKind::Info, message)
    }

    /// Shows a warning if it has not been shown yet.
    pub fn show_warning_once(&self, message: &str) -> bool {
        self.show_once(NotificationKind::Warning, message)
    }

    /// Shows an error if it has not been shown yet.
    pub fn show_error_once(&self, message: &str) -> bool {
        self.show_once(NotificationKind::Error, message)
    }

    /// Shows an error that replaces any earlier one starting with `scope`.
    ///
    /// At most one message per scope is remembered, so a scope whose message
    /// keeps changing does not grow the set.
    pub fn show_scoped_error_once(&self, scope: &str, message: &str) -> bool {
        let kind = NotificationKind::Error;
        let first = {
            let mut seen = self.seen.lock();
            let key = (kind, message.to_string());
            if seen.contains(&key) {
                false
            } else {
                seen.retain(|(_, shown)| !shown.starts_with(scope));
                seen.insert(key)
            }
        };
        self.deliver(first, kind, message)
    }

    /// Forgets the messages starting with `scope`.
    pub fn forget_scope(&self, scope: &str) {
        self.seen.lock().retain(|(_, shown)| !shown.starts_with(scope));
    }

    /// Forgets every message shown so far.
    pub fn reset(&self) {
        self.seen.lock().clear();
    }

    fn show_once(&self, kind: NotificationKind, message: &str) -> bool {
        let first = self.seen.lock().insert((kind, message.to_string()));
        self.deliver(first, kind, message)
    }

    fn deliver(&self, first: bool, kind: NotificationKind, message: &str) -> bool {
        if !first {
            self.logger
                .log_debug(&format!("Suppressed repeated {} notification: {}", kind, message));
            return false;
        }
        self.sink.show(kind, message);
        true
    }
}

impl fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationService")
            .field("seen", &self.seen.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;
    use crate::test_utils::RecordingSink;

    fn service() -> (Arc<RecordingSink>, NotificationService) {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(LoggingService::new(LogLevel::Debug));
        let service = NotificationService::new(sink.clone(), logger);
        (sink, service)
    }

    #[test]
    fn test_dedup_by_message() {
        let (sink, service) = service();
        assert!(service.show_error_once("broken"));
        assert!(!service.show_error_once("broken"));
        assert!(service.show_error_once("other"));
        assert_eq!(sink.messages().len(), 2);
    }

    #[test]
    fn test_kind_is_part_of_identity() {
        let (sink, service) = service();
        assert!(service.show_warning_once("same"));
        assert!(service.show_error_once("same"));
        assert_eq!(
            sink.messages(),
            vec![
                (NotificationKind::Warning, "same".to_string()),
                (NotificationKind::Error, "same".to_string()),
            ]
        );
    }

    #[test]
    fn test_reset_allows_repeat() {
        let (sink, service) = service();
        service.show_warning_once("again");
        service.reset();
        assert!(service.show_warning_once("again"));
        assert_eq!(sink.messages().len(), 2);
    }

    #[test]
    fn test_scoped_error_keeps_one_entry_per_scope() {
        let (sink, service) = service();
        assert!(service.show_scoped_error_once("a.js: ", "a.js: Unexpected token (1:3)"));
        assert!(!service.show_scoped_error_once("a.js: ", "a.js: Unexpected token (1:3)"));
        assert!(service.show_scoped_error_once("a.js: ", "a.js: Unexpected token (1:4)"));
        assert!(service.show_scoped_error_once("b.js: ", "b.js: Unexpected token (2:1)"));
        assert_eq!(sink.messages().len(), 3);
        assert_eq!(service.seen.lock().len(), 2);

        service.forget_scope("a.js: ");
        assert_eq!(service.seen.lock().len(), 1);
        assert!(service.show_scoped_error_once("a.js: ", "a.js: Unexpected token (1:4)"));
    }
}
