//! Fire-and-wait helpers.
//!
//! A [`RunnableTask`] pairs background work with a
//! [`StateCell`](crate::sync::StateCell) that reads `True` while the work
//! runs and flips to `False` once it ends, whatever the outcome.
//!
//! On top of it:
//! - [`run_and_wait`] spawns the work and waits for it cooperatively,
//!   bounded by a deadline or a cancellation token,
//! - [`fire_and_forget`] spawns the work without waiting,
//! - [`wait_for`] waits on any cell flipped by other code.
//!
//! Background failures are never returned to the caller. They are
//! handed to an [`ErrorHandler`] instead.

mod handler;
mod runnable;
mod wait;

pub use handler::{DefaultErrorHandler, ErrorHandler, SharedErrorHandler};
pub use runnable::{CanRun, RunnableTask};
pub use wait::{
    DEFAULT_POLL_INTERVAL, WaitOptions, WaitOutcome, fire_and_forget, run_and_wait, wait_for,
};
