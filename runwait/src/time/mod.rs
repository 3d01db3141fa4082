//! Time utilities backed by the runtime's timer driver.
//!
//! - [`sleep`] suspends the current task for a duration,
//! - [`timeout`] bounds how long a future may take,
//! - [`instrumented`] measures how long a future took.

mod instrumented;
mod sleep;
mod timeout;

#[doc(inline)]
pub use instrumented::{Instrumented, instrumented};

#[doc(inline)]
pub use sleep::{Sleep, sleep};

#[doc(inline)]
pub use timeout::{Timeout, timeout};
