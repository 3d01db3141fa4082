use super::core::Runtime;

use std::io;
use std::thread;

/// Default prefix for the names of runtime threads.
const DEFAULT_THREAD_NAME: &str = "runwait";

/// Builder for configuring and creating a runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .worker_threads(4)
///     .thread_name("ui-pool")
///     .build();
/// ```
pub struct RuntimeBuilder {
    /// Number of worker threads in the executor.
    worker_threads: usize,

    /// Prefix used to name worker and driver threads.
    thread_name: String,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    ///
    /// By default, the number of worker threads is set to the number
    /// of available logical CPUs, falling back to `1` if unavailable.
    pub fn new() -> Self {
        let worker_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            worker_threads,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    /// Sets the number of worker threads used by the runtime.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn worker_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "worker_threads must be > 0");

        self.worker_threads = n;
        self
    }

    /// Sets the prefix used to name the runtime's threads.
    ///
    /// Workers are named `{prefix}-worker-{id}` and the timer thread
    /// `{prefix}-driver`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Builds the runtime, spawning the driver and worker threads.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to spawn a thread. Use
    /// [`try_build`](Self::try_build) to handle that case.
    pub fn build(self) -> Runtime {
        self.try_build().expect("failed to spawn runtime threads")
    }

    /// Builds the runtime, returning an error if a thread cannot be spawned.
    pub fn try_build(self) -> io::Result<Runtime> {
        Runtime::new(self.worker_threads, &self.thread_name)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
