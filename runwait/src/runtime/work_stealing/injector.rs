use crate::runtime::task::Runnable;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Shared handle to the global task injector.
pub(crate) type InjectorHandle = Arc<Injector>;

/// Upper bound on how long an idle worker sleeps before re-checking
/// the other workers' queues for work to steal.
const PARK_TIMEOUT: Duration = Duration::from_millis(1);

/// Global task queue of the work-stealing scheduler.
///
/// Also coordinates parking: idle workers wait on the condition variable
/// until a task is pushed, shutdown is signaled, or [`PARK_TIMEOUT`]
/// passes.
///
/// Every spawned task is owned by the live set until it completes or
/// panics, so a detached task whose waker nobody holds is kept, not
/// dropped.
pub(crate) struct Injector {
    /// Queue holding globally injected tasks.
    queue: Mutex<VecDeque<Arc<dyn Runnable>>>,

    /// Unfinished tasks, keyed by task id.
    live: Mutex<HashMap<u64, Arc<dyn Runnable>>>,

    /// Next task id.
    next_id: AtomicU64,

    /// Condition variable used to wake parked workers.
    condvar: Condvar,

    /// Indicates whether the executor is shutting down.
    shutdown: AtomicBool,
}

impl Injector {
    pub(crate) fn new() -> Self {
        Injector {
            queue: Mutex::new(VecDeque::new()),
            live: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Signals shutdown and wakes all parked workers.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);

        let _queue = self.queue.lock().unwrap();
        self.condvar.notify_all();
    }

    /// Pushes a task and wakes one parked worker.
    ///
    /// After shutdown the task is dropped instead: no worker would run it.
    pub(crate) fn push(&self, task: Arc<dyn Runnable>) {
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }

        self.queue.lock().unwrap().push_back(task);
        self.condvar.notify_one();
    }

    /// Hands out a fresh task id.
    pub(crate) fn next_task_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Keeps `task` alive until [`release`](Self::release) is called.
    ///
    /// Returns `false`, without tracking, once shutdown has begun.
    pub(crate) fn track(&self, id: u64, task: Arc<dyn Runnable>) -> bool {
        let mut live = self.live.lock().unwrap();

        if self.shutdown.load(Ordering::Acquire) {
            return false;
        }

        live.insert(id, task);
        true
    }

    /// Drops the live set's reference to a finished task.
    pub(crate) fn release(&self, id: u64) {
        let task = self.live.lock().unwrap().remove(&id);
        drop(task);
    }

    /// Parks the current worker until work may be available.
    ///
    /// Returns immediately if the queue is non-empty or shutdown began.
    pub(crate) fn park(&self) {
        let queue = self.queue.lock().unwrap();

        if self.shutdown.load(Ordering::Acquire) || !queue.is_empty() {
            return;
        }

        let _ = self.condvar.wait_timeout(queue, PARK_TIMEOUT).unwrap();
    }

    /// Takes the oldest task from the queue.
    pub(crate) fn steal(&self) -> Option<Arc<dyn Runnable>> {
        self.queue.lock().unwrap().pop_front()
    }

    /// Removes every queued task.
    pub(crate) fn drain(&self) -> Vec<Arc<dyn Runnable>> {
        self.queue.lock().unwrap().drain(..).collect()
    }

    /// Removes every unfinished task. Only called after shutdown.
    pub(crate) fn drain_live(&self) -> Vec<Arc<dyn Runnable>> {
        self.live.lock().unwrap().drain().map(|(_, task)| task).collect()
    }
}
