use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that yields execution back to the executor exactly once.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.0 {
            return Poll::Ready(());
        }

        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Yields execution back to the executor once.
///
/// Lets other tasks (or, inside [`MainThread::block_on`], pending
/// main-thread jobs) make progress before the current task continues.
///
/// [`MainThread::block_on`]: crate::main_thread::MainThread::block_on
pub async fn yield_now() {
    YieldOnce(false).await
}
