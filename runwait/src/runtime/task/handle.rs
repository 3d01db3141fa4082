use crate::runtime::task::Task;
use crate::runtime::task::state::{COMPLETED, PANICKED};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::task::{Context, Poll};

/// A handle to a spawned task.
///
/// Resolves to the task's output once it completes.
///
/// Dropping the `JoinHandle` does **not** cancel the task; it only
/// discards the ability to observe its result.
pub struct JoinHandle<T> {
    pub(crate) task: Arc<Task<T>>,
}

impl<T> JoinHandle<T> {
    /// Returns `true` once the task has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self.task.state.load(Ordering::Acquire), COMPLETED | PANICKED)
    }

    fn try_take(&self) -> Option<T> {
        match self.task.state.load(Ordering::Acquire) {
            // Safety: COMPLETED is published after the result is written,
            // and only this handle reads it.
            COMPLETED => unsafe { (*self.task.result.get()).take() },
            PANICKED => panic!("awaited task panicked"),
            _ => None,
        }
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = T;

    /// Registers the waker **before** re-checking the state so a
    /// completion racing with registration is not missed.
    ///
    /// # Panics
    ///
    /// Panics if the task panicked.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if let Some(value) = self.try_take() {
            return Poll::Ready(value);
        }

        {
            let mut waiters = self.task.waiters.lock().unwrap();
            if !waiters.iter().any(|w| w.will_wake(cx.waker())) {
                waiters.push(cx.waker().clone());
            }
        }

        match self.try_take() {
            Some(value) => Poll::Ready(value),
            None => Poll::Pending,
        }
    }
}
