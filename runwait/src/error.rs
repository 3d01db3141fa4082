use std::error::Error;

use thiserror::Error;

/// Boxed error type accepted from units of work.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Failure of a unit of background work.
///
/// These never propagate to a waiting caller; they are handed to an
/// [`ErrorHandler`](crate::runner::ErrorHandler) instead.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The work returned an error.
    #[error("task failed: {0}")]
    Failed(#[source] BoxError),

    /// The work panicked. Carries the panic message when one was available.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The job was dropped before it ran, e.g. because the main thread
    /// that should have run it went away.
    #[error("task was abandoned before it ran")]
    Abandoned,
}

impl TaskError {
    /// Builds a [`TaskError::Panicked`] from a panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        Self::Panicked(panic_message(payload.as_ref()))
    }

    /// Returns `true` if the work panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Error returned by [`timeout`](crate::time::timeout) when the deadline
/// passes before the wrapped future completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline has elapsed")]
pub struct Elapsed(pub(crate) ());

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
