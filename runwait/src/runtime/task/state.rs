//! Task lifecycle states stored in `Task::state`.

/// Task is idle and not scheduled.
///
/// It is waiting for its waker to be called.
pub(crate) const IDLE: usize = 0;

/// Task is queued for execution.
pub(crate) const QUEUED: usize = 1;

/// Task is currently being polled by a worker.
///
/// At most one worker may observe this state at a time.
pub(crate) const RUNNING: usize = 2;

/// Task has completed; its result is ready to be taken.
pub(crate) const COMPLETED: usize = 3;

/// Task was woken while running and must be re-queued once the
/// current poll returns.
pub(crate) const NOTIFIED: usize = 4;

/// The future panicked. It will not be polled again.
pub(crate) const PANICKED: usize = 5;
