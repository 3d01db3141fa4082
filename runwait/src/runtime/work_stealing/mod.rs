//! Work-stealing scheduler components.
//!
//! - [`injector`]: the global queue new tasks and woken tasks land in,
//! - [`queue`]: per-worker local queues, popped LIFO by their owner and
//!   stolen FIFO by the others.

pub(crate) mod injector;
pub(crate) mod queue;
