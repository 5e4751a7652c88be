//! In-flight stream tracking and graceful shutdown.
//!
//! Every `ProcessOrders` call holds a [`StreamGuard`] for as long as its
//! session task runs. [`StreamTracker::shutdown`] uses the count to drain
//! before cancelling whatever is left through a shared
//! [`CancellationToken`].

use crate::server::telemetry::{decrement_streams_inflight, increment_streams_inflight};
use core::time::Duration;
use ordermgmt_tonic_core::Error;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

/// Counts open consolidation streams and coordinates their shutdown.
#[derive(Debug)]
pub struct StreamTracker {
    inflight: AtomicUsize,
    shutting_down: AtomicBool,
    shutdown_token: CancellationToken,
    shutdown_timeout: Duration,
}

impl StreamTracker {
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            inflight: AtomicUsize::new(0),
            shutting_down: AtomicBool::new(false),
            shutdown_token: CancellationToken::new(),
            shutdown_timeout,
        }
    }

    /// Registers a new stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once shutdown has begun.
    pub fn try_acquire(self: &Arc<Self>) -> Result<StreamGuard, Error> {
        // Count first so a concurrent shutdown either sees this stream or
        // this call sees the flag.
        self.inflight.fetch_add(1, Ordering::AcqRel);
        if self.shutting_down.load(Ordering::Acquire) {
            self.inflight.fetch_sub(1, Ordering::AcqRel);
            return Err(Error::ServiceShutdown);
        }
        increment_streams_inflight();
        Ok(StreamGuard {
            tracker: Arc::clone(self),
        })
    }

    /// Token cancelled when draining times out during shutdown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown_token.child_token()
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }

    /// Gracefully shuts down stream processing.
    ///
    /// - Refuses new streams.
    /// - Waits up to the configured timeout for open streams to finish on
    ///   their own.
    /// - Cancels the remainder and waits for them to unwind (bounded by the
    ///   same timeout).
    pub async fn shutdown(&self) {
        // === Phase 0: Stop accepting new streams ===
        #[cfg(feature = "tracing")]
        tracing::info!("Refusing new consolidation streams");
        self.shutting_down.store(true, Ordering::Release);

        // === Phase 1: Drain ===
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Draining in-flight streams ({} active)",
            self.inflight()
        );
        if self.wait_for_drain().await {
            #[cfg(feature = "tracing")]
            tracing::debug!("All in-flight streams drained");
            return;
        }

        // === Phase 2: Cancel the rest ===
        #[cfg(feature = "tracing")]
        tracing::warn!(
            "Graceful drain timed out ({} streams still active), cancelling",
            self.inflight()
        );
        self.shutdown_token.cancel();

        if !self.wait_for_drain().await {
            #[cfg(feature = "tracing")]
            tracing::error!(
                "{} streams did not unwind after cancellation",
                self.inflight()
            );
        }
    }

    async fn wait_for_drain(&self) -> bool {
        timeout(self.shutdown_timeout, async {
            while self.inflight() > 0 {
                sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .is_ok()
    }
}

/// Keeps a stream counted as in-flight until dropped.
#[derive(Debug)]
pub struct StreamGuard {
    tracker: Arc<StreamTracker>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.tracker.inflight.fetch_sub(1, Ordering::AcqRel);
        decrement_streams_inflight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_count_inflight_streams() {
        let tracker = Arc::new(StreamTracker::new(Duration::from_millis(50)));
        let first = tracker.try_acquire().unwrap();
        let second = tracker.try_acquire().unwrap();
        assert_eq!(tracker.inflight(), 2);
        drop(first);
        assert_eq!(tracker.inflight(), 1);
        drop(second);
        assert_eq!(tracker.inflight(), 0);
    }

    #[tokio::test]
    async fn shutdown_refuses_new_streams() {
        let tracker = Arc::new(StreamTracker::new(Duration::from_millis(50)));
        tracker.shutdown().await;
        assert_eq!(tracker.try_acquire().unwrap_err(), Error::ServiceShutdown);
        assert_eq!(tracker.inflight(), 0);
    }

    #[tokio::test]
    async fn shutdown_waits_for_streams_that_finish_in_time() {
        let tracker = Arc::new(StreamTracker::new(Duration::from_secs(5)));
        let guard = tracker.try_acquire().unwrap();
        let token = tracker.cancellation_token();

        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        tracker.shutdown().await;
        assert_eq!(tracker.inflight(), 0);
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn shutdown_cancels_streams_that_overrun() {
        let tracker = Arc::new(StreamTracker::new(Duration::from_millis(50)));
        let guard = tracker.try_acquire().unwrap();
        let token = tracker.cancellation_token();

        let task = tokio::spawn(async move {
            token.cancelled().await;
            drop(guard);
        });

        tracker.shutdown().await;
        task.await.unwrap();
        assert_eq!(tracker.inflight(), 0);
    }
}
