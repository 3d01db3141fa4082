use crate::runtime::task::Task;

use std::sync::Arc;
use std::task::{Wake, Waker};

/// Waking a task reschedules it on the executor.
impl<T: Send + 'static> Wake for Task<T> {
    fn wake(self: Arc<Self>) {
        Task::schedule(self);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        Task::schedule(self.clone());
    }
}

/// Creates a [`Waker`] that reschedules `task` when woken.
pub(crate) fn make_waker<T: Send + 'static>(task: Arc<Task<T>>) -> Waker {
    Waker::from(task)
}
