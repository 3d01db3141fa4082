//! Marshaling work onto a single "main" thread.
//!
//! A UI toolkit usually owns one thread that must perform every UI update.
//! [`Runtime::main_thread`](crate::Runtime::main_thread) binds the calling
//! thread as such a thread: other threads post closures to it through a
//! [`MainThreadHandle`], and the owner runs them whenever it calls
//! [`MainThread::run_pending`] or waits inside [`MainThread::block_on`].

mod dispatcher;
mod invoke;

use self::dispatcher::{Dispatcher, Job};
use crate::driver::DriverHandle;
use crate::error::{BoxError, TaskError, panic_message};
use crate::runner::RunnableTask;
use crate::runtime::InjectorHandle;
use crate::runtime::context::enter_context;
use crate::runtime::task::spawn_with;
use crate::sync::StateCell;

pub use self::invoke::Invoke;

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use tracing::{debug, error, trace};

/// The event loop of a thread bound as main thread.
///
/// Not `Send`: jobs posted through its handles only ever run on the thread
/// that created it. Dropping it refuses further jobs and resolves the
/// pending [`Invoke`]s with [`TaskError::Abandoned`].
pub struct MainThread {
    dispatcher: Arc<Dispatcher>,
    driver: DriverHandle,
    injector: InjectorHandle,
    _not_send: PhantomData<*const ()>,
}

impl MainThread {
    pub(crate) fn new(driver: DriverHandle, injector: InjectorHandle) -> Self {
        debug!("main thread bound");

        Self {
            dispatcher: Arc::new(Dispatcher::new()),
            driver,
            injector,
            _not_send: PhantomData,
        }
    }

    /// Returns a handle for posting work to this thread.
    pub fn handle(&self) -> MainThreadHandle {
        MainThreadHandle {
            dispatcher: self.dispatcher.clone(),
            injector: self.injector.clone(),
        }
    }

    /// Runs every job posted so far and returns how many ran.
    ///
    /// Jobs posted by the jobs themselves wait for the next call.
    pub fn run_pending(&self) -> usize {
        enter_context(self.driver.clone(), self.injector.clone(), || self.drain())
    }

    /// Drives `future` to completion on this thread.
    ///
    /// Posted jobs keep running between polls, so the thread stays
    /// responsive while it waits. `future` need not be `Send`; it may use
    /// [`sleep`](crate::time::sleep) and [`spawn`](crate::task::spawn).
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let main = runtime.main_thread();
    /// let outcome = main.block_on(run_and_wait(load_layout(), WaitOptions::new()));
    /// ```
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        enter_context(self.driver.clone(), self.injector.clone(), || {
            let mut future = pin!(future);
            let waker = Waker::from(self.dispatcher.clone());
            let mut cx = Context::from_waker(&waker);

            self.dispatcher.wake_by_ref();

            loop {
                if self.dispatcher.take_woken()
                    && let Poll::Ready(output) = future.as_mut().poll(&mut cx)
                {
                    return output;
                }

                self.drain();
                self.dispatcher.park();
            }
        })
    }

    fn drain(&self) -> usize {
        let jobs = self.dispatcher.take_jobs();
        let count = jobs.len();

        for job in jobs {
            job();
        }

        if count > 0 {
            trace!(jobs = count, "ran main thread jobs");
        }

        count
    }
}

impl Drop for MainThread {
    fn drop(&mut self) {
        let abandoned = self.dispatcher.close();

        if !abandoned.is_empty() {
            debug!(jobs = abandoned.len(), "main thread dropped with pending jobs");
        }
    }
}

impl fmt::Debug for MainThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainThread").finish_non_exhaustive()
    }
}

/// Posts work to a [`MainThread`] from any thread.
#[derive(Clone)]
pub struct MainThreadHandle {
    dispatcher: Arc<Dispatcher>,
    injector: InjectorHandle,
}

impl MainThreadHandle {
    /// Whether the calling thread is the main thread.
    pub fn is_main_thread(&self) -> bool {
        self.dispatcher.is_owner()
    }

    /// Posts `f` to run on the main thread.
    ///
    /// A panic in `f` is logged and does not reach the main thread's loop.
    /// If the main thread is gone, `f` is dropped unrun.
    pub fn invoke<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.post(Box::new(move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
                error!(panic = %panic_message(payload.as_ref()), "main thread job panicked");
            }
        }));
    }

    /// Posts `f` to run on the main thread and returns a future of its
    /// result.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let title = handle.invoke_async(|| window.title()).await?;
    /// ```
    pub fn invoke_async<F, T>(&self, f: F) -> Invoke<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (completer, invoke) = invoke::slot();

        self.post(Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f)).map_err(TaskError::from_panic);
            completer.complete(result);
        }));

        invoke
    }

    /// Runs `work` on the worker pool, then posts `callback` to the main
    /// thread.
    ///
    /// The callback runs whether the work succeeded or not; failures go to
    /// the default error handler first. Returns the work's running-state
    /// cell.
    pub fn run_parallel<W, E, C>(&self, work: W, callback: C) -> Arc<StateCell>
    where
        W: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
        C: FnOnce() + Send + 'static,
    {
        let task = RunnableTask::new(work);
        let state = task.state();
        let handle = self.clone();

        drop(spawn_with(&self.injector, async move {
            task.run().await;
            handle.invoke(callback);
        }));

        state
    }

    fn post(&self, job: Job) {
        if let Err(job) = self.dispatcher.post(job) {
            debug!("main thread is gone, dropping job");
            drop(job);
        }
    }
}

impl fmt::Debug for MainThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainThreadHandle")
            .field("is_main_thread", &self.is_main_thread())
            .finish_non_exhaustive()
    }
}
