//! One-shot user notifications (toasts).
//!
//! Operations push [`Notification`]s into a channel; the UI drains the receiver
//! and renders them. Every notification is logged as well, so headless runs keep
//! a trace of what the user would have seen.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Operation succeeded
    Success,
    /// Operation succeeded with a problem worth mentioning
    Warning,
    /// Operation failed
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
}

/// Sending half of the notification channel
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Creates a notifier and the receiver the UI listens on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Reports a success.
    pub fn success(&self, message: impl Into<String>) {
        self.emit(NotificationLevel::Success, message.into());
    }

    /// Reports a partial success.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(NotificationLevel::Warning, message.into());
    }

    /// Reports a failure.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(NotificationLevel::Error, message.into());
    }

    fn emit(&self, level: NotificationLevel, message: String) {
        match level {
            NotificationLevel::Success => info!(%message, "notify"),
            NotificationLevel::Warning => warn!(%message, "notify"),
            NotificationLevel::Error => error!(%message, "notify"),
        }
        if self.tx.send(Notification { level, message }).is_err() {
            debug!("Notification dropped: no listener");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_notifications_arrive_in_order() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.success("Saved");
        notifier.warning("Saved, but the photo was not uploaded");

        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Success);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, NotificationLevel::Warning);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emitting_without_listener_is_harmless() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.error("nobody hears this");
    }
}
