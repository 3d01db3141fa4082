//! Thread-safe state primitives.
//!
//! - [`StateCell`]: a lock-free tri-state flag used to signal task
//!   completion across threads,
//! - [`ValueCell`]: an atomically swapped optional shared value,
//! - [`CancellationToken`]: a cooperative "stop waiting" signal.
//!
//! None of these block, and none can fail.

mod cancel;
mod state_cell;
mod value_cell;

pub use cancel::CancellationToken;
pub use state_cell::{StateCell, TriState, UNSET_VALUE};
pub use value_cell::ValueCell;
