//! Task executor implementation.
//!
//! - [`core`]: executor lifecycle (spawning workers, shutdown, joining),
//! - [`worker`]: the per-thread work-stealing loop.

pub(crate) mod core;
pub(crate) mod worker;
