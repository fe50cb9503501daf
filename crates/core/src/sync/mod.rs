//! Waiting primitives shared by the caches
//!
//! Both primitives serve blocking threads (through `parking_lot::Condvar`)
//! and async tasks (through `tokio::sync::Notify`) from the same state, so
//! the blocking and suspending APIs of the caches have identical ordering.

mod deadline;
mod gate;
mod latch;

pub(crate) use deadline::Deadline;
pub use gate::{GatePermit, SingleFlightGate};
pub use latch::{InitLatch, LatchOutcome};
