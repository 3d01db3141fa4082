use super::JoinHandle;
use super::state::{COMPLETED, IDLE, NOTIFIED, PANICKED, QUEUED, RUNNING};
use super::waker::make_waker;
use crate::error::panic_message;
use crate::runtime::context::{CURRENT_LOCALS, CURRENT_WORKER_ID, current_injector};
use crate::runtime::work_stealing::injector::InjectorHandle;

use std::cell::UnsafeCell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use tracing::error;

/// A runnable unit of work that can be executed by the scheduler.
///
/// Erases the output type so queues can hold `Arc<dyn Runnable>`.
pub(crate) trait Runnable: Send + Sync {
    /// Polls the task once. Called by a worker thread.
    fn run(self: Arc<Self>);
}

/// A spawned asynchronous task managed by the runtime.
///
/// Holds the future, its eventual result, the lifecycle state and the
/// wakers of the `JoinHandle` awaiting it. The injector's live set owns
/// the task until it finishes.
pub(crate) struct Task<T> {
    /// Key of this task in the injector's live set.
    id: u64,

    /// The future. Cleared once it completes or panics, so that anything
    /// it owns is dropped right away.
    future: UnsafeCell<Option<Pin<Box<dyn Future<Output = T> + Send>>>>,

    /// Result produced by the future upon completion.
    pub(crate) result: UnsafeCell<Option<T>>,

    /// Lifecycle state, one of the constants in [`super::state`].
    pub(crate) state: AtomicUsize,

    /// Global injector used for rescheduling.
    injector: InjectorHandle,

    /// Wakers of the handle awaiting this task.
    pub(crate) waiters: Mutex<Vec<Waker>>,
}

// Safety: the `UnsafeCell`s are only touched by the thread that moved the
// state to RUNNING, or by the JoinHandle after observing COMPLETED.
unsafe impl<T> Send for Task<T> {}
unsafe impl<T> Sync for Task<T> {}

impl<T: Send + 'static> Task<T> {
    /// Creates a task in the `QUEUED` state.
    pub(crate) fn new<F>(future: F, injector: InjectorHandle) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            id: injector.next_task_id(),
            future: UnsafeCell::new(Some(Box::pin(future))),
            result: UnsafeCell::new(None),
            state: AtomicUsize::new(QUEUED),
            injector,
            waiters: Mutex::new(Vec::new()),
        }
    }

    /// Polls the future once.
    ///
    /// - `Poll::Pending`: back to `IDLE`, or re-queued if woken meanwhile.
    /// - `Poll::Ready`: stores the result and wakes the join handle.
    /// - panic: logged, the task becomes `PANICKED` and the join handle
    ///   is woken so it can re-raise it.
    pub(crate) fn run(self: Arc<Self>) {
        let current = self.state.load(Ordering::Acquire);

        if current != QUEUED && current != NOTIFIED {
            return;
        }

        // RUNNING grants exclusive access to the UnsafeCells.
        if self
            .state
            .compare_exchange(current, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let waker = make_waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        // Safety: the RUNNING state guarantees no other thread polls this future.
        let slot = unsafe { &mut *self.future.get() };
        let Some(future) = slot.as_mut() else {
            return;
        };

        let poll = panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(&mut cx)));

        match poll {
            Ok(Poll::Pending) => {
                if self
                    .state
                    .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // Woken while running.
                    self.state.store(QUEUED, Ordering::Release);
                    self.injector.push(self.clone());
                }
            }
            Ok(Poll::Ready(value)) => {
                *slot = None;
                unsafe {
                    *self.result.get() = Some(value);
                }
                self.finish(COMPLETED);
            }
            Err(payload) => {
                *slot = None;
                error!(panic = %panic_message(payload.as_ref()), "spawned task panicked");
                self.finish(PANICKED);
            }
        }
    }

    /// Publishes a terminal state, wakes the join handle and leaves the
    /// live set.
    fn finish(&self, state: usize) {
        self.state.store(state, Ordering::Release);

        let waiters: Vec<_> = self.waiters.lock().unwrap().drain(..).collect();
        for waker in waiters {
            waker.wake();
        }

        self.injector.release(self.id);
    }

    /// Reschedules the task after a wake-up.
    ///
    /// `IDLE` tasks are queued; `RUNNING` tasks are marked `NOTIFIED` so
    /// they are re-polled right after the current poll.
    pub(crate) fn schedule(self: Arc<Self>) {
        loop {
            match self.state.load(Ordering::Acquire) {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, QUEUED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.injector.push(self.clone());
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                // Already queued, notified, or finished.
                _ => return,
            }
        }
    }
}

impl<T: Send + 'static> Runnable for Task<T> {
    fn run(self: Arc<Self>) {
        Task::run(self)
    }
}

/// Spawns a future as a task onto the current runtime.
///
/// On a worker thread the task goes to that worker's local queue;
/// elsewhere (e.g. a main thread) it goes to the global injector.
///
/// Dropping the returned [`JoinHandle`] detaches the task; it keeps
/// running.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
pub fn spawn<F, T>(future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let injector =
        current_injector().expect("spawn must be called within the context of a runtime");

    spawn_with(&injector, future)
}

/// Spawns onto the runtime owning `injector`, from any thread.
///
/// Once the runtime has begun shutting down the task is not run; its
/// future is dropped with the last handle.
pub(crate) fn spawn_with<F, T>(injector: &InjectorHandle, future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let task = Arc::new(Task::new(future, injector.clone()));

    if !injector.track(task.id, task.clone()) {
        return JoinHandle { task };
    }

    // Local queues only belong to the worker's own runtime.
    let same_runtime = current_injector().is_some_and(|current| Arc::ptr_eq(&current, injector));

    let pushed_locally = same_runtime
        && CURRENT_WORKER_ID.with(|id_cell| {
            let Some(id) = *id_cell.borrow() else {
                return false;
            };

            CURRENT_LOCALS.with(|locals_cell| match locals_cell.borrow().as_ref() {
                Some(locals) => {
                    locals[id].push(task.clone());
                    true
                }
                None => false,
            })
        });

    if !pushed_locally {
        injector.push(task.clone());
    }

    JoinHandle { task }
}
