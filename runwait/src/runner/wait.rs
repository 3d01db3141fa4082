use super::handler::{ErrorHandler, SharedErrorHandler, default_handler};
use super::runnable::RunnableTask;
use crate::error::BoxError;
use crate::sync::{CancellationToken, StateCell};
use crate::time::{instrumented, sleep};

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

/// Delay between two checks of the running state when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How [`run_and_wait`] and [`wait_for`] wait.
///
/// # Examples
///
/// ```rust,ignore
/// let options = WaitOptions::new()
///     .poll_interval(Duration::from_millis(10))
///     .max_wait(Duration::from_secs(1));
/// ```
#[derive(Clone)]
pub struct WaitOptions {
    /// Delay between two checks.
    poll_interval: Duration,

    /// Upper bound on the total wait. `None` waits until the work ends
    /// or the token is cancelled.
    max_wait: Option<Duration>,

    /// External "stop waiting" signal.
    cancel: Option<CancellationToken>,

    /// Receives failures of the background work.
    handler: SharedErrorHandler,
}

impl WaitOptions {
    /// Polls every [`DEFAULT_POLL_INTERVAL`], without a time limit,
    /// logging failures through the default handler.
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
            cancel: None,
            handler: default_handler(),
        }
    }

    /// Sets the delay between two checks.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll_interval must be > 0");

        self.poll_interval = interval;
        self
    }

    /// Stops waiting once `max_wait` has passed.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Stops waiting once `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Routes failures of the background work to `handler`.
    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitOptions")
            .field("poll_interval", &self.poll_interval)
            .field("max_wait", &self.max_wait)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

/// Why a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The work finished; the cell was observed not running.
    Completed,
    /// `max_wait` elapsed first. The work may still be running.
    TimedOut,
    /// The cancellation token fired first. The work may still be running.
    Cancelled,
}

impl WaitOutcome {
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

/// Cooperatively waits while `state` reads `True`.
///
/// Each iteration checks the cell, then the cancellation token, then the
/// deadline, and otherwise sleeps for the poll interval (shortened so as
/// not to overshoot the deadline). The first check happens before any
/// sleep, so a cell that is already `False` returns immediately.
///
/// Sleeping suspends only the current task; the thread is free to run
/// other work in between checks.
pub async fn wait_for(state: &StateCell, options: &WaitOptions) -> WaitOutcome {
    let deadline = options
        .max_wait
        .and_then(|max_wait| Instant::now().checked_add(max_wait));

    loop {
        if !state.is_true() {
            return WaitOutcome::Completed;
        }

        if options.is_cancelled() {
            return WaitOutcome::Cancelled;
        }

        let nap = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    return WaitOutcome::TimedOut;
                }
                left.min(options.poll_interval)
            }
            None => options.poll_interval,
        };

        sleep(nap).await;
    }
}

/// Runs `work` in the background and waits for it without blocking.
///
/// The work is wrapped in a [`RunnableTask`] and spawned, detached, onto
/// the worker pool. The calling task then waits as [`wait_for`] does.
///
/// Failures of the work (errors and panics) never reach the caller; they
/// go to the handler set in `options`, exactly once.
///
/// On [`WaitOutcome::TimedOut`] or [`WaitOutcome::Cancelled`] the work is
/// **not** cancelled: it keeps running to completion in the background,
/// unobserved. Only the waiting stops.
///
/// # Panics
///
/// Panics if polled outside the context of a runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let outcome = run_and_wait(
///     async {
///         refresh_cache().await?;
///         Ok::<_, BoxError>(())
///     },
///     WaitOptions::new().max_wait(Duration::from_secs(1)),
/// )
/// .await;
/// ```
pub async fn run_and_wait<F, E>(work: F, options: WaitOptions) -> WaitOutcome
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    let state = RunnableTask::new(work)
        .with_shared_handler(options.handler.clone())
        .spawn();

    let (outcome, waited) = instrumented(wait_for(&state, &options)).await;

    debug!(?outcome, waited_ms = waited.as_millis() as u64, "run_and_wait finished");

    outcome
}

/// Spawns `work` in the background without waiting for it.
///
/// Failures go to `handler` (pass [`DefaultErrorHandler`] to log them).
/// The returned cell reads `True` until the work ends.
///
/// # Panics
///
/// Panics if called outside the context of a runtime.
///
/// [`DefaultErrorHandler`]: super::DefaultErrorHandler
pub fn fire_and_forget<F, E, H>(work: F, handler: H) -> Arc<StateCell>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError> + 'static,
    H: ErrorHandler + 'static,
{
    RunnableTask::new(work).with_error_handler(handler).spawn()
}
