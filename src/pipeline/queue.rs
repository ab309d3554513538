//! Bounded message queue between the printer and the speech worker
//!
//! A thin wrapper over a crossbeam bounded channel. Both ends live in the
//! same handle so the supervisor, the workers and the signal listener can
//! each hold a clone. Every blocking operation takes an explicit timeout:
//! a full queue drops the line instead of stalling the printer, and an empty
//! queue returns control to the consumer so it can recheck the shutdown
//! signal.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// An item travelling through the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    /// A line to speak
    Line(String),
    /// No more work; the consumer should exit
    Sentinel,
}

/// Result of a bounded push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The item is in the queue
    Enqueued,
    /// The queue stayed full for the whole timeout; the item was discarded
    Dropped,
    /// Every receiver is gone
    Closed,
}

/// Result of a bounded pop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome {
    /// A line was received
    Line(String),
    /// The sentinel was received
    Sentinel,
    /// Nothing arrived within the timeout
    Empty,
    /// Every sender is gone and the queue is empty
    Closed,
}

/// Fixed-capacity FIFO of [`QueueItem`]s
#[derive(Debug, Clone)]
pub struct MessageQueue {
    sender: Sender<QueueItem>,
    receiver: Receiver<QueueItem>,
    capacity: usize,
}

impl MessageQueue {
    /// Create a queue holding at most `capacity` items
    ///
    /// A capacity of zero is raised to one; a rendezvous channel would make
    /// every push wait for the consumer.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Push a line, waiting at most `timeout` for space
    ///
    /// A zero timeout makes a single non-blocking attempt. Dropped lines are
    /// logged here so callers only need to count them.
    pub fn push(&self, line: impl Into<String>, timeout: Duration) -> PushOutcome {
        let outcome = self.push_item(QueueItem::Line(line.into()), timeout);
        if outcome == PushOutcome::Dropped {
            tracing::warn!(
                capacity = self.capacity,
                "Speech queue full after {:?}, dropping line",
                timeout
            );
        }
        outcome
    }

    /// Push the sentinel, waiting at most `timeout` for space
    ///
    /// Returns `true` if the sentinel is in the queue.
    pub fn push_sentinel(&self, timeout: Duration) -> bool {
        self.push_item(QueueItem::Sentinel, timeout) == PushOutcome::Enqueued
    }

    fn push_item(&self, item: QueueItem, timeout: Duration) -> PushOutcome {
        // Err(true) means disconnected, Err(false) means still full
        let result = if timeout.is_zero() {
            self.sender.try_send(item).map_err(|e| e.is_disconnected())
        } else {
            self.sender
                .send_timeout(item, timeout)
                .map_err(|e| e.is_disconnected())
        };

        match result {
            Ok(()) => PushOutcome::Enqueued,
            Err(false) => PushOutcome::Dropped,
            Err(true) => PushOutcome::Closed,
        }
    }

    /// Pop the next item, waiting at most `timeout`
    pub fn pop(&self, timeout: Duration) -> PopOutcome {
        match self.receiver.recv_timeout(timeout) {
            Ok(QueueItem::Line(line)) => PopOutcome::Line(line),
            Ok(QueueItem::Sentinel) => PopOutcome::Sentinel,
            Err(RecvTimeoutError::Timeout) => PopOutcome::Empty,
            Err(RecvTimeoutError::Disconnected) => PopOutcome::Closed,
        }
    }

    /// Remove everything currently queued without blocking
    pub fn drain(&self) -> Vec<QueueItem> {
        let mut items = Vec::with_capacity(self.len());
        while let Ok(item) = self.receiver.try_recv() {
            items.push(item);
        }
        items
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
