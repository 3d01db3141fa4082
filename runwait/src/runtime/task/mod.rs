//! Asynchronous task primitives.
//!
//! Spawning ([`spawn`]), awaiting ([`JoinHandle`]), and the internal
//! task/waker machinery used by the executor.

pub(crate) mod state;
pub(crate) mod unwind;

mod core;
mod handle;
mod waker;

pub(crate) use self::core::{Runnable, Task, spawn_with};

pub use self::core::spawn;
pub use handle::JoinHandle;
