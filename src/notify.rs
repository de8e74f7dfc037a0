//! Blocking modal alerts ("Success" / "Error" popups).
//!
//! Alerts are fire-and-forget: callers never wait for or read a response.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}

/// Writes alerts to the log only.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, title: &str, message: &str) {
        info!(title = %title, message = %message, "alert");
    }
}

/// Buffers alerts until the front-end drains them.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    pending: Mutex<VecDeque<Alert>>,
}

impl QueuedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Alert> {
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl Notifier for QueuedNotifier {
    fn alert(&self, title: &str, message: &str) {
        info!(title = %title, "alert queued");
        let alert = Alert {
            title: title.to_string(),
            message: message.to_string(),
        };
        match self.pending.lock() {
            Ok(mut pending) => pending.push_back(alert),
            Err(poisoned) => poisoned.into_inner().push_back(alert),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_alerts_drain_in_order() {
        let notifier = QueuedNotifier::new();
        notifier.alert("Error", "Invalid manager code. Please try again.");
        notifier.alert("Success", "Refund has been approved and processed.");

        let alerts = notifier.drain();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].title, "Error");
        assert_eq!(alerts[1].title, "Success");
        assert!(notifier.drain().is_empty());
    }
}
