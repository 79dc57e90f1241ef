//! Cancellation and deadlines for API calls
//!
//! Every Transport call takes a [`Context`]. Cancelling it, or letting its
//! deadline pass, makes in-flight calls fail with [`Error::Cancelled`] or
//! [`Error::DeadlineExceeded`] instead of a generic transport error.
//!
//! A cancelled mutating call may or may not have reached the server: without
//! a client-generated idempotency key there is no way to tell. The client
//! keeps no local state, so nothing is left half-written on this side.

use crate::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Cancellation scope threaded through every API call.
///
/// Cheap to clone; clones share the same cancellation state.
///
/// # Example
///
/// ```rust
/// use resourcely::Context;
/// use std::time::Duration;
///
/// # async fn example() {
/// let (ctx, handle) = Context::with_cancel();
/// let ctx = ctx.with_timeout(Duration::from_secs(30));
///
/// handle.cancel();
/// assert!(ctx.err().is_some());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<Arc<CancelState>>,
    deadline: Option<Instant>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Handle that cancels the [`Context`] it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Arc<CancelState>,
}

impl CancelHandle {
    /// Cancel the context and wake every call waiting on it.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A cancellable context and the handle that cancels it.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let state = Arc::new(CancelState::default());
        let ctx = Self {
            cancel: Some(Arc::clone(&state)),
            deadline: None,
        };
        (ctx, CancelHandle { state })
    }

    /// Derive a context that also expires after `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that also expires at `deadline`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The error this context currently fails with, if it is done.
    pub fn err(&self) -> Option<Error> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|s| s.cancelled.load(Ordering::SeqCst))
        {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> Error {
        let cancelled = async {
            match &self.cancel {
                Some(state) => loop {
                    let notified = state.notify.notified();
                    tokio::pin!(notified);
                    // Register before checking the flag so a concurrent
                    // cancel() cannot slip between the two.
                    notified.as_mut().enable();
                    if state.cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    notified.await;
                },
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Error::Cancelled,
            () = expired => Error::DeadlineExceeded,
        }
    }

    /// Run `future` under this context.
    ///
    /// If the context finishes first, the future is dropped and the
    /// context's error is returned. A context that is already done never
    /// starts the future.
    pub async fn run<F, T>(&self, future: F) -> Result<T, Error>
    where
        F: std::future::Future<Output = Result<T, Error>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = future => match (result, self.err()) {
                // A failure racing with cancellation reports the cancellation.
                (Err(_), Some(err)) => Err(err),
                (result, _) => result,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_background_never_done() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        let result = ctx.run(async { Ok::<_, Error>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_future() {
        let (ctx, handle) = Context::with_cancel();
        handle.cancel();

        let mut started = false;
        let result = ctx
            .run(async {
                started = true;
                Ok::<_, Error>(())
            })
            .await;

        assert_matches!(result, Err(Error::Cancelled));
        assert!(!started);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_call() {
        let (ctx, handle) = Context::with_cancel();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, Error>(())
            })
            .await;

        canceller.await.unwrap();
        assert_matches!(result, Err(Error::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_secs(1));

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, Error>(())
            })
            .await;

        assert_matches!(result, Err(Error::DeadlineExceeded));
        assert_matches!(ctx.err(), Some(Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_error_after_cancel_reports_cancellation() {
        let (ctx, handle) = Context::with_cancel();
        let result = ctx
            .run(async {
                handle.cancel();
                Err::<(), _>(Error::Connection("connection reset".to_string()))
            })
            .await;

        assert_matches!(result, Err(Error::Cancelled));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(5))
            .with_deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_clones_share_cancellation() {
        let (ctx, handle) = Context::with_cancel();
        let clone = ctx.clone();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_matches!(clone.err(), Some(Error::Cancelled));
    }

    #[test]
    fn test_done_wakes_on_cancel() {
        use tokio_test::{assert_pending, assert_ready, task};

        let (ctx, handle) = Context::with_cancel();
        let mut done = task::spawn(ctx.done());
        assert_pending!(done.poll());

        handle.cancel();
        assert!(done.is_woken());
        assert_matches!(assert_ready!(done.poll()), Error::Cancelled);
    }
}
