//! The completion barrier.
//!
//! Every render task carries exactly one [`CompletionHandle`], whether or not
//! it is ever dispatched to a worker. At rest the handle is completed; the
//! scheduler resets it right before dispatching an execution and completes it
//! when that execution finishes. Readers (`resize`, `destroy`, data accessors,
//! predecessor lookups) block on [`wait`](CompletionHandle::wait). For tasks
//! that always run inline the wait trivially falls through, which keeps the
//! single-threaded and multithreaded paths identical.

use std::sync::{Condvar, Mutex};

/// A resettable completion barrier built on a mutex and condition variable.
#[derive(Debug)]
pub struct CompletionHandle {
    complete: Mutex<bool>,
    condvar: Condvar,
}

impl CompletionHandle {
    /// Create a handle in the completed state.
    pub fn new() -> Self {
        Self {
            complete: Mutex::new(true),
            condvar: Condvar::new(),
        }
    }

    /// Mark an execution as in flight. Must only be called after any previous
    /// execution was waited on.
    pub fn reset(&self) {
        *self.complete.lock().unwrap() = false;
    }

    /// Mark the in-flight execution as finished and wake all waiters.
    pub fn complete(&self) {
        *self.complete.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    /// Block until the in-flight execution (if any) has finished.
    pub fn wait(&self) {
        let mut complete = self.complete.lock().unwrap();
        while !*complete {
            complete = self.condvar.wait(complete).unwrap();
        }
    }

    /// Whether no execution is currently in flight.
    pub fn is_complete(&self) -> bool {
        *self.complete.lock().unwrap()
    }
}

impl Default for CompletionHandle {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(CompletionHandle: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn new_handle_is_complete() {
        let handle = CompletionHandle::new();
        assert!(handle.is_complete());
        // Waiting on a completed handle must not block.
        handle.wait();
    }

    #[test]
    fn wait_blocks_until_complete() {
        let handle = Arc::new(CompletionHandle::new());
        handle.reset();
        assert!(!handle.is_complete());

        let worker = {
            let handle = handle.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                handle.complete();
            })
        };

        handle.wait();
        assert!(handle.is_complete());
        worker.join().unwrap();
    }
}
