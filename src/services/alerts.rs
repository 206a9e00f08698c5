//! Alert banner state shared between forms and the host UI

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    /// Survive the next route change (e.g. "saved" shown on the list page)
    pub keep_after_navigation: bool,
}

/// Holds at most one visible alert
#[derive(Clone)]
pub struct AlertService {
    tx: Arc<watch::Sender<Option<Alert>>>,
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertService {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn success(&self, message: impl Into<String>, keep_after_navigation: bool) {
        self.show(AlertKind::Success, message.into(), keep_after_navigation);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(AlertKind::Error, message.into(), false);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(AlertKind::Info, message.into(), false);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.show(AlertKind::Warning, message.into(), false);
    }

    fn show(&self, kind: AlertKind, message: String, keep_after_navigation: bool) {
        tracing::debug!("Alert {:?}: {}", kind, message);
        self.tx.send_replace(Some(Alert {
            kind,
            message,
            keep_after_navigation,
        }));
    }

    /// Dismiss the current alert
    pub fn clear(&self) {
        self.tx.send_if_modified(|alert| alert.take().is_some());
    }

    /// Drop the alert unless it asked to outlive this navigation.
    /// A kept alert survives exactly one route change.
    pub fn route_changed(&self) {
        self.tx.send_if_modified(|alert| match alert {
            Some(a) if a.keep_after_navigation => {
                a.keep_after_navigation = false;
                false
            }
            Some(_) => {
                *alert = None;
                true
            }
            None => false,
        });
    }

    pub fn current(&self) -> Option<Alert> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Alert>> {
        self.tx.subscribe()
    }
}
