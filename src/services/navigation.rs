//! Navigation intents emitted by forms

use tokio::sync::mpsc;

use super::alerts::AlertService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub url: String,
}

/// Hands navigation requests to whatever owns the router
#[derive(Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<NavigationIntent>,
    alerts: AlertService,
}

impl Navigator {
    pub fn channel(alerts: AlertService) -> (Self, mpsc::UnboundedReceiver<NavigationIntent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, alerts }, rx)
    }

    pub fn navigate_by_url(&self, url: impl Into<String>) {
        let url = url.into();
        tracing::info!("Navigating to {}", url);
        self.alerts.route_changed();
        if self.tx.send(NavigationIntent { url }).is_err() {
            tracing::warn!("Navigation requested but no router is listening");
        }
    }
}
