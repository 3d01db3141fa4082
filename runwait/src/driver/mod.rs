//! Timer driver.
//!
//! The driver runs on its own thread and owns every pending timer of a
//! runtime. Async primitives talk to it through [`Command`]s sent over a
//! channel; it wakes the registered task once a deadline is reached.
//!
//! Runtime users never touch the driver directly; [`sleep`] and
//! [`timeout`] are built on it.
//!
//! [`sleep`]: crate::time::sleep
//! [`timeout`]: crate::time::timeout

mod core;
mod timer;

pub(crate) mod command;

pub(crate) use self::core::{Driver, DriverHandle};
