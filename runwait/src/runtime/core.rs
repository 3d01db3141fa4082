use super::executor::core::Executor;
use super::task::unwind::CatchUnwind;
use crate::driver::command::Command;
use crate::driver::{Driver, DriverHandle};
use crate::main_thread::MainThread;

use std::future::Future;
use std::io;
use std::panic;
use std::sync::mpsc;
use std::thread::JoinHandle;

use tracing::debug;

/// The main runtime handle.
///
/// `Runtime` owns the worker pool and the timer driver. It is the
/// synchronous entry point into async code via [`block_on`](Self::block_on)
/// and the factory for [`MainThread`] loops.
///
/// Dropping the runtime shuts down all internal components in an orderly
/// fashion. Detached tasks that have not finished are dropped.
pub struct Runtime {
    /// Task executor responsible for scheduling and running futures.
    executor: Executor,

    /// Handle to the timer driver thread.
    driver: DriverHandle,

    /// Join handle of the driver thread.
    driver_thread: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Starts the driver and `worker_threads` workers.
    pub(crate) fn new(worker_threads: usize, thread_name: &str) -> io::Result<Self> {
        let (driver, driver_thread) = Driver::start(thread_name)?;
        let executor = Executor::new(driver.clone(), worker_threads, thread_name)?;

        debug!(worker_threads, thread_name, "runtime started");

        Ok(Self {
            executor,
            driver,
            driver_thread: Some(driver_thread),
        })
    }

    /// Spawns a detached future onto the runtime.
    ///
    /// The future runs to completion on a worker thread; its output is
    /// discarded. Use [`task::spawn`](crate::task::spawn) from inside the
    /// runtime to get a [`JoinHandle`](crate::task::JoinHandle).
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.executor.spawn(future);
    }

    /// Runs a future to completion on the worker pool, blocking the
    /// current thread until it finishes.
    ///
    /// A panic inside `future` is resumed on the calling thread.
    ///
    /// # Panics
    ///
    /// Panics if the runtime shuts down before the future completes.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let result = runtime.block_on(async { 42 });
    /// assert_eq!(result, 42);
    /// ```
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (transmitter, receiver) = mpsc::channel();

        self.spawn(async move {
            let result = CatchUnwind::new(future).await;
            let _ = transmitter.send(result);
        });

        match receiver.recv() {
            Ok(Ok(value)) => value,
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => panic!("runtime shut down before block_on completed"),
        }
    }

    /// Binds the calling thread as a main (UI) thread of this runtime.
    ///
    /// The returned [`MainThread`] runs jobs posted through its
    /// [`MainThreadHandle`](crate::main_thread::MainThreadHandle) whenever
    /// the owning thread drives it.
    pub fn main_thread(&self) -> MainThread {
        MainThread::new(self.driver.clone(), self.executor.injector())
    }
}

impl Drop for Runtime {
    /// Shuts down the runtime.
    ///
    /// 1. Stops task submission and wakes parked workers
    /// 2. Stops the timer driver
    /// 3. Joins all threads
    fn drop(&mut self) {
        self.executor.shutdown();

        let _ = self.driver.send(Command::Shutdown);

        self.executor.join();

        if let Some(thread) = self.driver_thread.take() {
            let _ = thread.join();
        }

        debug!("runtime shut down");
    }
}
