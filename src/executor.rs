//! Deferred execution: lazily produced step sequences that run outside the
//! panel's redraw pass.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::dispatcher::panic_message;

/// One step of a deferred sequence. The executor decides how to honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Let other work run, then continue.
    Yield,
    /// Pause for at least the given duration.
    Wait(Duration),
}

/// A lazily produced sequence of steps. Nothing runs until an executor pulls
/// the next step; the sequence is complete when the iterator ends.
pub struct DeferredSequence {
    steps: Box<dyn Iterator<Item = Step> + Send>,
}

impl DeferredSequence {
    pub fn new<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = Step>,
        I::IntoIter: Send + 'static,
    {
        Self {
            steps: Box::new(steps.into_iter()),
        }
    }

    /// Build a sequence from a closure called once per step; `None` ends it.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut() -> Option<Step> + Send + 'static,
    {
        Self::new(std::iter::from_fn(f))
    }
}

impl Iterator for DeferredSequence {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        self.steps.next()
    }
}

impl fmt::Debug for DeferredSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredSequence").finish_non_exhaustive()
    }
}

/// Host facility that drives deferred sequences to completion.
pub trait DeferredExecutor: Send + Sync {
    fn spawn(&self, label: &str, sequence: DeferredSequence);
}

// ── Tokio executor ──────────────────────────────────────────────

/// Runs each sequence on its own tokio task. `Yield` maps to
/// `yield_now`, `Wait` to `sleep`. A sequence that panics ends its own task
/// and is logged; the others keep running.
#[derive(Clone)]
pub struct TokioExecutor {
    handle: Handle,
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

/// Counts one running sequence; released when its task ends, however it ends.
struct ActiveGuard {
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl TokioExecutor {
    /// Bind to the runtime of the calling context.
    /// Must be called from within a tokio runtime.
    pub fn current() -> Self {
        Self::with_handle(Handle::current())
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            active: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Number of sequences that have been spawned and not yet finished.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Wait until every spawned sequence has finished.
    pub async fn wait_idle(&self) {
        loop {
            // Register before checking so a release in between is not missed.
            let released = self.idle.notified();
            if self.active() == 0 {
                return;
            }
            released.await;
        }
    }
}

impl DeferredExecutor for TokioExecutor {
    fn spawn(&self, label: &str, sequence: DeferredSequence) {
        let label = label.to_string();
        self.active.fetch_add(1, Ordering::AcqRel);
        let guard = ActiveGuard {
            active: Arc::clone(&self.active),
            idle: Arc::clone(&self.idle),
        };
        tracing::debug!(job = %label, "deferred sequence started");

        let run = async move {
            let mut count = 0usize;
            for step in sequence {
                count += 1;
                match step {
                    Step::Yield => tokio::task::yield_now().await,
                    Step::Wait(duration) => tokio::time::sleep(duration).await,
                }
            }
            count
        };

        self.handle.spawn(async move {
            let _guard = guard;
            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(count) => tracing::debug!(job = %label, steps = count, "deferred sequence finished"),
                Err(payload) => tracing::warn!(
                    job = %label,
                    error = %panic_message(payload.as_ref()),
                    "deferred sequence aborted"
                ),
            }
        });
    }
}

impl fmt::Debug for TokioExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioExecutor")
            .field("active", &self.active())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_lazy() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let mut seq = DeferredSequence::from_fn(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            (n < 2).then_some(Step::Yield)
        });
        assert_eq!(pulled.load(Ordering::SeqCst), 0);
        assert_eq!(seq.next(), Some(Step::Yield));
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tokio_executor_runs_to_completion() {
        let executor = TokioExecutor::current();
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        let mut remaining = 3;
        executor.spawn(
            "count",
            DeferredSequence::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                remaining -= 1;
                counter.fetch_add(1, Ordering::SeqCst);
                Some(Step::Wait(Duration::from_millis(1)))
            }),
        );
        assert_eq!(executor.active(), 1);

        tokio::time::timeout(Duration::from_secs(5), executor.wait_idle())
            .await
            .expect("sequence should finish");
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(executor.active(), 0);
    }

    #[tokio::test]
    async fn panicking_sequence_releases_its_slot() {
        let executor = TokioExecutor::current();
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        executor.spawn(
            "boom",
            DeferredSequence::from_fn(|| -> Option<Step> { panic!("sequence broke") }),
        );
        executor.spawn(
            "steady",
            DeferredSequence::new((0..2).map(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Step::Yield
            })),
        );
        assert_eq!(executor.active(), 2);

        tokio::time::timeout(Duration::from_secs(5), executor.wait_idle())
            .await
            .expect("panicked sequence should not block wait_idle");
        assert_eq!(executor.active(), 0);
        assert_eq!(done.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn wait_idle_returns_immediately_when_nothing_runs() {
        let executor = TokioExecutor::current();
        tokio::time::timeout(Duration::from_millis(100), executor.wait_idle())
            .await
            .expect("idle executor");
    }
}
