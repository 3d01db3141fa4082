//! # runwait
//!
//! **runwait** runs background work from a UI-style main thread and lets
//! that thread wait for it without freezing its event loop.
//!
//! The building blocks:
//!
//! - [`sync::StateCell`], an atomic tri-state (`Unset`/`False`/`True`)
//!   cell that any thread can read and write with sequentially consistent
//!   ordering
//! - [`runner::RunnableTask`], a unit of fallible async work whose
//!   running state lives in a `StateCell`
//! - [`runner::run_and_wait`], which starts such a task and polls its cell
//!   until it finishes, a maximum wait elapses, or the wait is cancelled
//! - [`main_thread::MainThread`], a single-threaded job loop that other
//!   threads post closures to
//!
//! Underneath sits a small work-stealing runtime with a timer thread,
//! providing [`task::spawn`], [`time::sleep`] and [`time::timeout`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use runwait::runner::{WaitOptions, run_and_wait};
//! use runwait::time::sleep;
//! use std::time::Duration;
//!
//! #[runwait::main]
//! async fn main() {
//!     let options = WaitOptions::new().max_wait(Duration::from_secs(1));
//!
//!     let outcome = run_and_wait(
//!         async {
//!             sleep(Duration::from_millis(10)).await;
//!             Ok::<_, runwait::BoxError>(())
//!         },
//!         options,
//!     )
//!     .await;
//!
//!     assert!(outcome.is_completed());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`sync`]: tri-state and value cells, cancellation tokens
//! - [`runner`]: running work in the background and waiting on it
//! - [`main_thread`]: posting work to the main thread
//! - [`time`]: sleep, timeout and elapsed-time instrumentation
//! - [`task`]: spawning and joining tasks

mod driver;
mod error;
mod runtime;

pub mod main_thread;
pub mod runner;
pub mod sync;
pub mod time;

pub use error::{BoxError, Elapsed, TaskError};
pub use runtime::builder::RuntimeBuilder;
pub use runtime::core::Runtime;
pub use runtime::task;
pub use runtime::yield_now::yield_now;

pub use runwait_macros::*;
