//! Observable worker lifecycle
//!
//! Each worker thread owns a [`WorkerStatus`] that the supervisor polls. The
//! thread moves it forward through [`WorkerState`]; an [`ExitGuard`] held for
//! the whole thread body marks it `Exited` on every return path, including a
//! panic unwinding out of the worker.

use crate::types::WorkerState;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Shared, forward-only worker state
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    state: Arc<AtomicU8>,
}

impl WorkerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Advance to `state`; moving backwards is ignored
    pub fn advance(&self, state: WorkerState) {
        self.state.fetch_max(state as u8, Ordering::SeqCst);
    }

    pub fn is_exited(&self) -> bool {
        self.get() == WorkerState::Exited
    }

    /// Guard that marks the worker `Exited` when dropped
    pub fn exit_guard(&self) -> ExitGuard {
        ExitGuard {
            status: self.clone(),
        }
    }
}

/// Marks a worker `Exited` on drop
#[derive(Debug)]
pub struct ExitGuard {
    status: WorkerStatus,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.status.advance(WorkerState::Exited);
    }
}
