use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::task::Wake;
use std::thread::{self, ThreadId};

/// A closure posted to the main thread.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

struct Queue {
    /// Jobs waiting to run, oldest first.
    jobs: VecDeque<Job>,

    /// Set by the waker of the future driven by `block_on`.
    woken: bool,

    /// Set once the owning `MainThread` is gone.
    closed: bool,
}

/// Job queue and parking spot of one main thread.
///
/// Any thread may post jobs; only the owning thread drains them. The
/// dispatcher is also the waker of the future driven by
/// `MainThread::block_on`, so a wake-up and a posted job both unpark the
/// owner.
pub(crate) struct Dispatcher {
    queue: Mutex<Queue>,
    condvar: Condvar,
    owner: ThreadId,
}

impl Dispatcher {
    /// Creates a dispatcher owned by the calling thread.
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(Queue {
                jobs: VecDeque::new(),
                woken: false,
                closed: false,
            }),
            condvar: Condvar::new(),
            owner: thread::current().id(),
        }
    }

    /// Whether the calling thread owns this dispatcher.
    pub(crate) fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Queues `job`. Hands it back if the main thread is gone.
    pub(crate) fn post(&self, job: Job) -> Result<(), Job> {
        let mut queue = self.queue.lock().unwrap();

        if queue.closed {
            return Err(job);
        }

        queue.jobs.push_back(job);
        self.condvar.notify_one();
        Ok(())
    }

    /// Removes every queued job.
    pub(crate) fn take_jobs(&self) -> VecDeque<Job> {
        std::mem::take(&mut self.queue.lock().unwrap().jobs)
    }

    /// Returns and clears the wake-up flag.
    pub(crate) fn take_woken(&self) -> bool {
        std::mem::replace(&mut self.queue.lock().unwrap().woken, false)
    }

    /// Blocks the owner until a job is posted or a wake-up arrives.
    pub(crate) fn park(&self) {
        let queue = self.queue.lock().unwrap();

        let _queue = self
            .condvar
            .wait_while(queue, |q| q.jobs.is_empty() && !q.woken)
            .unwrap();
    }

    /// Refuses further jobs and returns the ones never run.
    pub(crate) fn close(&self) -> VecDeque<Job> {
        let mut queue = self.queue.lock().unwrap();
        queue.closed = true;
        std::mem::take(&mut queue.jobs)
    }
}

impl Wake for Dispatcher {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.queue.lock().unwrap().woken = true;
        self.condvar.notify_one();
    }
}
