//! Core data types for speakline
//!
//! This module contains the small value types shared between the workers
//! and the supervisor.
//!
//! # Main Types
//!
//! - [`WorkerState`] - Lifecycle of a worker thread
//! - [`PrinterReport`] - What the printer did during a run
//! - [`SpeakerReport`] - What the speech worker did during a run
//! - [`RunSummary`] - Combined outcome of one supervisor run

/// Lifecycle state of a worker thread
///
/// States only move forward: `Starting -> Running -> Draining -> Exited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum WorkerState {
    /// Spawned but not yet executing its loop
    #[default]
    Starting = 0,
    /// Executing its main loop
    Running = 1,
    /// Loop finished, running teardown
    Draining = 2,
    /// Thread body has returned (or unwound)
    Exited = 3,
}

impl WorkerState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Starting,
            1 => WorkerState::Running,
            2 => WorkerState::Draining,
            _ => WorkerState::Exited,
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Starting => write!(f, "Starting"),
            WorkerState::Running => write!(f, "Running"),
            WorkerState::Draining => write!(f, "Draining"),
            WorkerState::Exited => write!(f, "Exited"),
        }
    }
}

/// Outcome of a printer worker run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrinterReport {
    /// Lines written to the output
    pub printed: u64,
    /// Lines accepted by the queue
    pub enqueued: u64,
    /// Lines dropped because the queue stayed full
    pub dropped: u64,
    /// Whether the loop ended because the shutdown signal was set
    pub interrupted: bool,
    /// Error that ended the worker early, if any
    pub error: Option<String>,
}

/// Outcome of a speech worker run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerReport {
    /// Whether the engine could be created at all
    pub engine_available: bool,
    /// Lines spoken without error
    pub spoken: u64,
    /// Lines whose speak call failed
    pub failed: u64,
    /// Whether the loop ended on a sentinel
    pub received_sentinel: bool,
}

impl SpeakerReport {
    /// Lines taken off the queue, successful or not
    pub fn processed(&self) -> u64 {
        self.spoken + self.failed
    }
}

/// Combined outcome of one supervisor run
///
/// A report is `None` when the worker was never started or overran its
/// bounded join and was left detached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub printer: Option<PrinterReport>,
    pub speaker: Option<SpeakerReport>,
    /// Whether the shutdown signal was set during the run
    pub interrupted: bool,
}
