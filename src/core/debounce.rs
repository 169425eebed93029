//! Cancellable delayed commits for rapidly changing input.
//!
//! Each [`Debouncer::push`] cancels the pending timer and arms a new one; only
//! the timer that survives the full quiet period fires, sending its value to
//! the receiver returned by [`Debouncer::new`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Delays values until input pauses for `delay`
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
    latest: Arc<AtomicU64>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates a debouncer and the receiver committed values arrive on.
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            tx,
            pending: None,
            latest: Arc::new(AtomicU64::new(0)),
        };
        (debouncer, rx)
    }

    /// Replaces the pending value and restarts the quiet period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) == ticket {
                trace!(ticket, "Debounced value committed");
                // The receiver may be gone if the screen closed.
                let _ = tx.send(value);
            }
        }));
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            self.latest.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// True while a value is waiting for its quiet period to end
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// The quiet period
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_in_a_burst_is_committed() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

        debouncer.push("s");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("sm");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("smi");

        assert_eq!(rx.recv().await, Some("smi"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_separated_by_a_pause_both_commit() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.push(2);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

        debouncer.push("typed then cleared");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
