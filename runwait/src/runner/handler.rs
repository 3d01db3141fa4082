use crate::error::TaskError;

use std::sync::Arc;

use tracing::warn;

/// Receives failures of background work.
///
/// Work started through [`run_and_wait`](super::run_and_wait) or
/// [`fire_and_forget`](super::fire_and_forget) never reports errors to
/// the caller; they are funneled here instead, once per failed run.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: TaskError);
}

impl<F> ErrorHandler for F
where
    F: Fn(TaskError) + Send + Sync,
{
    fn handle(&self, error: TaskError) {
        self(error)
    }
}

/// Handler used when none is configured: logs the error and moves on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, error: TaskError) {
        warn!(%error, "background task failed");
    }
}

/// Shared, type-erased error handler.
pub type SharedErrorHandler = Arc<dyn ErrorHandler>;

pub(crate) fn default_handler() -> SharedErrorHandler {
    Arc::new(DefaultErrorHandler)
}
