//! Lifecycle controller: start discovery, wait, shut down.
//!
//! The main task has nothing to do while discovery threads drive the state
//! machine, so it parks in [`LifecycleController::run`] until one of two
//! things happens:
//!
//! - the state machine reaches `Completed` and fires the [`CompletionSignal`]
//!   from a discovery thread, or
//! - the user presses Ctrl-C.
//!
//! Either way the discovery subscription is torn down and the process exits
//! with status 0.
//!
//! # Why a watch channel? (for beginners)
//!
//! The completion signal is raised on a plain OS thread, outside the Tokio
//! runtime, while the main task is suspended inside `select!`.  A
//! `tokio::sync::watch` sender can be written from any thread without an
//! async context, and the receiver wakes the suspended task immediately.  No
//! flag is polled on a timer.

use std::future::Future;

use tokio::sync::watch;
use tracing::info;

/// Creates a connected completion signal / waiter pair.
pub fn completion_channel() -> (CompletionSignal, CompletionWaiter) {
    let (tx, rx) = watch::channel(false);
    (CompletionSignal { tx }, CompletionWaiter { rx })
}

/// Sending half, owned by the orchestrator.
#[derive(Debug)]
pub struct CompletionSignal {
    tx: watch::Sender<bool>,
}

impl CompletionSignal {
    /// Marks the session complete.  Safe to call from any thread; idempotent.
    pub fn notify(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half, awaited by the lifecycle controller.
#[derive(Debug)]
pub struct CompletionWaiter {
    rx: watch::Receiver<bool>,
}

impl CompletionWaiter {
    pub fn is_completed(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the session has completed.
    ///
    /// If the signal is dropped without ever firing, this never resolves; the
    /// process then only ends on interrupt.
    pub async fn wait(&mut self) {
        let outcome = self.rx.wait_for(|done| *done).await.map(|_| ());
        if outcome.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A running discovery subscription that can be torn down.
pub trait DiscoverySubscription {
    /// Stops browsing and releases the discovery daemon.  Idempotent.
    fn shutdown(&mut self);
}

/// Why the wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Completed,
    Interrupted,
}

impl ShutdownReason {
    /// Process exit status.  Both a finished session and a clean interrupt
    /// are successful exits.
    pub fn exit_code(self) -> i32 {
        match self {
            ShutdownReason::Completed => 0,
            ShutdownReason::Interrupted => 0,
        }
    }
}

/// Owns the discovery subscription and the top-level wait.
pub struct LifecycleController<S: DiscoverySubscription> {
    subscription: S,
    waiter: CompletionWaiter,
}

impl<S: DiscoverySubscription> LifecycleController<S> {
    /// Starts the discovery subscription with `start`.
    ///
    /// # Errors
    ///
    /// Returns whatever `start` returns when the subscription cannot be set up.
    pub fn start<E>(
        start: impl FnOnce() -> Result<S, E>,
        waiter: CompletionWaiter,
    ) -> Result<Self, E> {
        let subscription = start()?;
        info!("discovery subscription started");
        Ok(Self {
            subscription,
            waiter,
        })
    }

    /// Waits for completion or `interrupt`, then shuts discovery down.
    pub async fn run<F>(mut self, interrupt: F) -> ShutdownReason
    where
        F: Future<Output = ()>,
    {
        let reason = tokio::select! {
            biased;
            _ = self.waiter.wait() => ShutdownReason::Completed,
            _ = interrupt => ShutdownReason::Interrupted,
        };

        info!(?reason, "stopping discovery");
        self.subscription.shutdown();
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingSubscription {
        shutdowns: Arc<AtomicUsize>,
    }

    impl DiscoverySubscription for CountingSubscription {
        fn shutdown(&mut self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller(
        waiter: CompletionWaiter,
    ) -> (LifecycleController<CountingSubscription>, Arc<AtomicUsize>) {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let subscription = CountingSubscription {
            shutdowns: Arc::clone(&shutdowns),
        };
        let controller =
            LifecycleController::start(|| Ok::<_, std::io::Error>(subscription), waiter)
                .expect("start should succeed");
        (controller, shutdowns)
    }

    #[test]
    fn test_waiter_starts_incomplete() {
        let (_signal, waiter) = completion_channel();
        assert!(!waiter.is_completed());
    }

    #[test]
    fn test_notify_marks_completed() {
        // Arrange
        let (signal, waiter) = completion_channel();

        // Act
        signal.notify();
        signal.notify();

        // Assert
        assert!(waiter.is_completed());
    }

    #[test]
    fn test_start_propagates_subscription_error() {
        let (_signal, waiter) = completion_channel();
        let result = LifecycleController::<CountingSubscription>::start(
            || Err::<CountingSubscription, _>("daemon unavailable"),
            waiter,
        );
        assert!(matches!(result, Err("daemon unavailable")));
    }

    #[tokio::test]
    async fn test_completion_from_plain_thread_ends_the_wait() {
        // Arrange
        let (signal, waiter) = completion_channel();
        let (controller, shutdowns) = controller(waiter);

        // Act: fire the signal from outside the runtime, as a discovery thread would.
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            signal.notify();
        });
        let reason = controller.run(std::future::pending::<()>()).await;

        // Assert
        assert_eq!(reason, ShutdownReason::Completed);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interrupt_ends_the_wait() {
        let (_signal, waiter) = completion_channel();
        let (controller, shutdowns) = controller(waiter);

        let reason = controller.run(async {}).await;

        assert_eq!(reason, ShutdownReason::Interrupted);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_completion_wins_when_already_signalled() {
        // Arrange: completion is already set and the interrupt is also ready.
        let (signal, waiter) = completion_channel();
        signal.notify();
        let (controller, _shutdowns) = controller(waiter);

        // Act
        let reason = controller.run(async {}).await;

        // Assert
        assert_eq!(reason, ShutdownReason::Completed);
    }

    #[tokio::test]
    async fn test_dropped_signal_does_not_end_the_wait() {
        let (signal, mut waiter) = completion_channel();
        drop(signal);

        let waited = tokio::time::timeout(Duration::from_millis(50), waiter.wait()).await;

        assert!(waited.is_err(), "wait must stay pending without a completion");
    }

    #[test]
    fn test_exit_code_is_zero_for_both_reasons() {
        assert_eq!(ShutdownReason::Completed.exit_code(), 0);
        assert_eq!(ShutdownReason::Interrupted.exit_code(), 0);
    }
}
