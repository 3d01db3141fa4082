use crate::error::TaskError;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

struct Slot<T> {
    result: Option<Result<T, TaskError>>,
    waker: Option<Waker>,
    done: bool,
}

/// Creates the two ends of a single-use result slot.
pub(crate) fn slot<T>() -> (Completer<T>, Invoke<T>) {
    let shared = Arc::new(Mutex::new(Slot {
        result: None,
        waker: None,
        done: false,
    }));

    (
        Completer {
            shared: Some(shared.clone()),
        },
        Invoke { shared },
    )
}

/// Writing end, moved into the posted job.
///
/// Dropping it without completing resolves the [`Invoke`] with
/// [`TaskError::Abandoned`].
pub(crate) struct Completer<T> {
    shared: Option<Arc<Mutex<Slot<T>>>>,
}

impl<T> Completer<T> {
    pub(crate) fn complete(mut self, result: Result<T, TaskError>) {
        if let Some(shared) = self.shared.take() {
            fill(&shared, result);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            fill(&shared, Err(TaskError::Abandoned));
        }
    }
}

fn fill<T>(shared: &Mutex<Slot<T>>, result: Result<T, TaskError>) {
    let waker = {
        let mut slot = shared.lock().unwrap();
        slot.result = Some(result);
        slot.done = true;
        slot.waker.take()
    };

    if let Some(waker) = waker {
        waker.wake();
    }
}

/// Future returned by
/// [`MainThreadHandle::invoke_async`](super::MainThreadHandle::invoke_async).
///
/// Resolves to the closure's return value once the main thread has run
/// it, [`TaskError::Panicked`] if it panicked, or
/// [`TaskError::Abandoned`] if the main thread went away first.
pub struct Invoke<T> {
    shared: Arc<Mutex<Slot<T>>>,
}

impl<T> Invoke<T> {
    /// Whether the result is available.
    pub fn is_done(&self) -> bool {
        self.shared.lock().unwrap().done
    }
}

impl<T> Future for Invoke<T> {
    type Output = Result<T, TaskError>;

    /// # Panics
    ///
    /// Panics if polled again after returning `Ready`.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.lock().unwrap();

        if slot.done {
            let result = slot.result.take().expect("Invoke polled after completion");
            return Poll::Ready(result);
        }

        match &slot.waker {
            Some(waker) if waker.will_wake(cx.waker()) => {}
            _ => slot.waker = Some(cx.waker().clone()),
        }

        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_once<T>(invoke: &mut Invoke<T>) -> Poll<Result<T, TaskError>> {
        let mut cx = Context::from_waker(Waker::noop());
        Pin::new(invoke).poll(&mut cx)
    }

    #[test]
    fn pending_until_completed() {
        let (completer, mut invoke) = slot::<u32>();

        assert!(poll_once(&mut invoke).is_pending());
        completer.complete(Ok(7));

        assert!(invoke.is_done());
        assert!(matches!(poll_once(&mut invoke), Poll::Ready(Ok(7))));
    }

    #[test]
    fn dropped_completer_abandons() {
        let (completer, mut invoke) = slot::<u32>();
        drop(completer);

        assert!(matches!(
            poll_once(&mut invoke),
            Poll::Ready(Err(TaskError::Abandoned))
        ));
    }
}
