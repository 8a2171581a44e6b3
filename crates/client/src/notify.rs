//! Transient user-facing notifications ("toasts").
//!
//! Stores emit notifications and never read anything back. UI code picks
//! the [`Notifier`] implementation that fits its surface.

use std::sync::Mutex;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Default,
    Destructive,
}

/// A (title, description, severity) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    /// A `Success` notification.
    #[must_use]
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            description: description.into(),
            severity: Severity::Default,
        }
    }

    /// An `Error` notification rendered as destructive.
    #[must_use]
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Destructive
    }
}

/// Fire-and-forget notification surface.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Default => tracing::info!(
                title = %notification.title,
                "{}",
                notification.description
            ),
            Severity::Destructive => tracing::warn!(
                title = %notification.title,
                "{}",
                notification.description
            ),
        }
    }
}

/// Collects notifications until the UI drains them.
#[derive(Debug, Default)]
pub struct BufferedNotifier {
    pending: Mutex<Vec<Notification>>,
}

impl BufferedNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    /// Copy of the pending notifications without removing them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .map(|pending| pending.clone())
            .unwrap_or_default()
    }
}

impl Notifier for BufferedNotifier {
    fn notify(&self, notification: Notification) {
        match self.pending.lock() {
            Ok(mut pending) => pending.push(notification),
            Err(_) => tracing::error!("Notification buffer poisoned, dropping notification"),
        }
    }
}
