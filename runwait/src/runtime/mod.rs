//! Core runtime components.
//!
//! This module contains the worker pool that executes tasks, the
//! work-stealing queues that feed it, and the thread-local context that
//! lets nested code reach the pool and the timer driver.
//!
//! Most users only touch [`RuntimeBuilder`], [`Runtime`] and
//! [`task::spawn`]; the rest is internal.
//!
//! [`RuntimeBuilder`]: builder::RuntimeBuilder

mod executor;
mod work_stealing;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod core;
pub(crate) mod yield_now;

pub mod task;

pub(crate) use work_stealing::injector::InjectorHandle;
