use crate::driver::DriverHandle;
use crate::runtime::executor::worker::Worker;
use crate::runtime::task::spawn_with;
use crate::runtime::work_stealing::injector::{Injector, InjectorHandle};
use crate::runtime::work_stealing::queue::LocalQueue;

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::debug;

/// Multi-threaded task executor.
///
/// Owns the global injector, one local queue per worker and the worker
/// threads themselves.
pub(crate) struct Executor {
    /// Global injector queue shared by all workers.
    injector: InjectorHandle,

    /// Local queues, kept so leftover tasks can be released on shutdown.
    locals: Arc<Vec<Arc<LocalQueue>>>,

    /// Join handles for worker threads.
    handles: Vec<JoinHandle<()>>,

    /// Shutdown flag shared with all workers.
    shutdown: Arc<AtomicBool>,
}

impl Executor {
    /// Creates the queues and spawns `threads` workers.
    pub(crate) fn new(driver: DriverHandle, threads: usize, name: &str) -> io::Result<Self> {
        let injector = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let locals: Arc<Vec<_>> = Arc::new((0..threads).map(|_| Arc::new(LocalQueue::new())).collect());

        let mut executor = Self {
            injector,
            locals,
            handles: Vec::with_capacity(threads),
            shutdown,
        };

        for id in 0..threads {
            let worker = Worker::new(id, executor.locals.clone(), executor.injector.clone());

            let driver = driver.clone();
            let shutdown = executor.shutdown.clone();

            let spawned = thread::Builder::new()
                .name(format!("{name}-worker-{id}"))
                .spawn(move || worker.run(shutdown, driver));

            match spawned {
                Ok(handle) => executor.handles.push(handle),
                Err(err) => {
                    executor.shutdown();
                    executor.join();
                    return Err(err);
                }
            }
        }

        Ok(executor)
    }

    /// Returns a handle to the global injector.
    pub(crate) fn injector(&self) -> InjectorHandle {
        self.injector.clone()
    }

    /// Signals all workers to shut down and wakes the parked ones.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.injector.shutdown();
    }

    /// Spawns a new detached task.
    ///
    /// Tasks spawned after shutdown has begun are dropped without running.
    pub(crate) fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }

        drop(spawn_with(&self.injector, future));
    }

    /// Waits for all workers to exit, then drops every unfinished task.
    ///
    /// Tasks hold the injector alive, so they are released explicitly to
    /// break the cycle.
    pub(crate) fn join(&mut self) {
        for h in self.handles.drain(..) {
            let _ = h.join();
        }

        drop(self.injector.drain());
        for local in self.locals.iter() {
            drop(local.drain());
        }

        let unfinished = self.injector.drain_live();
        if !unfinished.is_empty() {
            debug!(tasks = unfinished.len(), "dropping unfinished tasks");
        }
        drop(unfinished);
    }
}
