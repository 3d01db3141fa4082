use super::handler::{ErrorHandler, SharedErrorHandler, default_handler};
use crate::error::{BoxError, TaskError};
use crate::runtime::task;
use crate::runtime::task::unwind::CatchUnwind;
use crate::sync::{StateCell, TriState};

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

type Work = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;

/// Something whose running state can be queried from any thread.
pub trait CanRun {
    /// The cell reporting whether the work is still running.
    ///
    /// Reads [`TriState::True`] while running and [`TriState::False`]
    /// once finished.
    fn is_running(&self) -> &StateCell;
}

/// A unit of background work paired with a [`StateCell`] tracking it.
///
/// The cell starts `True` and is flipped to `False` exactly once when the
/// work ends: on success, on error or on panic. Errors and panics go to
/// the task's [`ErrorHandler`] first.
///
/// Work that is dropped before it ends, e.g. by a runtime shutting down,
/// never ended: its cell keeps reading `True`.
pub struct RunnableTask {
    running: Arc<StateCell>,
    work: Work,
    handler: SharedErrorHandler,
}

impl RunnableTask {
    /// Wraps `work`. Failures go to the [`DefaultErrorHandler`] unless
    /// another handler is set.
    ///
    /// [`DefaultErrorHandler`]: super::DefaultErrorHandler
    pub fn new<F, E>(work: F) -> Self
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            running: Arc::new(StateCell::with_state(TriState::True)),
            work: Box::pin(async move { work.await.map_err(Into::into) }),
            handler: default_handler(),
        }
    }

    /// Routes failures of this task to `handler`.
    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Routes failures of this task to an already shared handler.
    pub fn with_shared_handler(mut self, handler: SharedErrorHandler) -> Self {
        self.handler = handler;
        self
    }

    /// Returns a shared handle to the running-state cell.
    pub fn state(&self) -> Arc<StateCell> {
        self.running.clone()
    }

    /// Returns a future that runs the work to completion.
    ///
    /// The future never fails: errors and panics are passed to the
    /// handler before the cell flips. Dropping it before it resolves
    /// leaves the cell `True`.
    pub fn run(self) -> impl Future<Output = ()> + Send + 'static {
        let Self {
            running,
            work,
            handler,
        } = self;

        let unfinished = Unfinished;

        async move {
            match CatchUnwind::new(work).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => handler.handle(TaskError::Failed(error)),
                Err(payload) => handler.handle(TaskError::from_panic(payload)),
            }

            unfinished.disarm();
            running.set_false();
        }
    }

    /// Spawns the task, detached, onto the current runtime and returns
    /// its state cell.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a runtime.
    pub fn spawn(self) -> Arc<StateCell> {
        let state = self.state();
        drop(task::spawn(self.run()));
        state
    }
}

impl CanRun for RunnableTask {
    fn is_running(&self) -> &StateCell {
        &self.running
    }
}

impl fmt::Debug for RunnableTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableTask")
            .field("running", &self.running.read())
            .finish_non_exhaustive()
    }
}

/// Logs work dropped before it ended.
struct Unfinished;

impl Unfinished {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for Unfinished {
    fn drop(&mut self) {
        debug!("background work dropped before it finished");
    }
}
