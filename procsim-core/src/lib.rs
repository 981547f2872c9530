//! # procsim-core
//!
//! Foundation layer for the process simulator: the typed operation model,
//! the simulated hardware (device registry and its allocators), the live
//! operation queue shared with the arrival feed, and the countdown timer.
//!
//! ### Key Submodules:
//! - `operation`: operation kinds, labels and the validated `Operation` record
//! - `devices/`: cycle-time table, memory bump allocator, round-robin cursors
//! - `queue/`: lock-guarded operation deque with wake-up notification
//! - `time/`: deadline-driven countdown timer running on its own task
//!
//! ### Expectations:
//! - Operations are validated once at construction and never mutated
//! - Device state is only touched by the single dispatcher task
//! - All waiting uses `tokio::time`, so paused-clock tests are deterministic

pub mod devices;
pub mod error;
pub mod operation;
pub mod queue;
pub mod time;

pub mod prelude {
    pub use crate::devices::*;
    pub use crate::error::*;
    pub use crate::operation::*;
    pub use crate::queue::*;
    pub use crate::time::*;
}

pub use error::{OperationError, QueueError, TimerError};
pub use operation::{DeviceClass, OpKind, OpLabel, Operation};
