//! Synchronization primitives for worker-dispatched task execution.

pub mod completion;
