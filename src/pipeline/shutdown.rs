//! Shared shutdown signal
//!
//! [`ShutdownSignal`] is a monotonic flag: once set it stays set. Polling it is
//! a lock-free atomic load. Sleeping workers wait on a condition variable so
//! that setting the flag wakes them immediately instead of after their full
//! sleep interval.
//!
//! [`ShutdownHandle`] bundles the signal with the message queue and performs
//! the full shutdown sequence: set the flag, then push a sentinel so a
//! consumer blocked on an empty queue wakes up.

use crate::pipeline::queue::MessageQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// How long [`ShutdownHandle::trigger`] waits for room to push the sentinel
pub const SENTINEL_PUSH_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct SignalInner {
    flag: AtomicBool,
    lock: Mutex<()>,
    wakeup: Condvar,
}

/// Cooperative cancellation flag shared by the supervisor and both workers
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<SignalInner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal and wake every waiter. Idempotent.
    pub fn set(&self) {
        if self.inner.flag.swap(true, Ordering::SeqCst) {
            return;
        }
        // Holding the lock while notifying closes the window between a
        // waiter's flag check and its wait.
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.inner.wakeup.notify_all();
    }

    pub fn is_set(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Block for at most `timeout` or until the signal is set
    ///
    /// Returns whether the signal is set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_set() || timeout.is_zero() {
            return self.is_set();
        }

        let deadline = Instant::now() + timeout;
        let mut guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        while !self.is_set() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            guard = match self.inner.wakeup.wait_timeout(guard, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }

        self.is_set()
    }
}

/// Triggers the signal-and-sentinel shutdown sequence from any thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    signal: ShutdownSignal,
    queue: MessageQueue,
}

impl ShutdownHandle {
    pub fn new(signal: ShutdownSignal, queue: MessageQueue) -> Self {
        Self { signal, queue }
    }

    /// Set the signal and try to unblock the consumer with a sentinel
    ///
    /// If the queue is full the sentinel is skipped; the consumer is busy
    /// and will observe the signal at the top of its next iteration.
    pub fn trigger(&self) {
        let first = !self.signal.is_set();
        self.signal.set();
        if first {
            tracing::info!("Shutdown requested");
        }
        if !self.queue.push_sentinel(SENTINEL_PUSH_TIMEOUT) {
            tracing::debug!("Queue full, speech worker will observe shutdown signal directly");
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.signal.is_set()
    }

    pub fn signal(&self) -> &ShutdownSignal {
        &self.signal
    }
}
