use crate::driver::command::Command;
use crate::runtime::context::current_driver;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

/// Creates a future that completes after the given duration.
///
/// Sleeping suspends only the current task; the thread it runs on is
/// free to run other tasks (or main-thread jobs) meanwhile.
///
/// # Panics
///
/// The returned future panics if polled outside of a runtime context.
///
/// # Examples
///
/// ```rust,ignore
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep::new(duration)
}

/// Future returned by [`sleep`].
///
/// The timer is registered with the driver on first poll, registered
/// again whenever the sleep is polled with a different waker, and
/// cancelled when the future is dropped, so an abandoned sleep never
/// wakes its task.
pub struct Sleep {
    /// Absolute point in time when the sleep completes.
    deadline: Instant,

    /// Waker of the current registration, if any.
    waker: Option<Waker>,

    /// Cancellation flag shared with the driver's current timer entry.
    cancelled: Arc<AtomicBool>,
}

impl Sleep {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
            waker: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The instant at which this sleep completes.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if Instant::now() >= this.deadline {
            return Poll::Ready(());
        }

        if this.waker.as_ref().is_some_and(|w| w.will_wake(cx.waker())) {
            return Poll::Pending;
        }

        let driver = current_driver().expect("Sleep polled outside of runtime");

        // Retire the entry that would wake the previous waker.
        this.cancelled.store(true, Ordering::Release);
        this.cancelled = Arc::new(AtomicBool::new(false));
        this.waker = Some(cx.waker().clone());

        let _ = driver.send(Command::SetTimer {
            deadline: this.deadline,
            waker: cx.waker().clone(),
            cancelled: this.cancelled.clone(),
        });

        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
