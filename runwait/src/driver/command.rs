use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::task::Waker;
use std::time::Instant;

/// Requests sent to the timer driver thread.
pub(crate) enum Command {
    /// Wake `waker` once `deadline` is reached, unless `cancelled` is set.
    SetTimer {
        deadline: Instant,
        waker: Waker,
        cancelled: Arc<AtomicBool>,
    },

    /// Stop the driver loop.
    Shutdown,
}
